//! DID Checks
//!
//! Registration binds a fresh symbol to an address that must prove control
//! of itself through an input; transfer re-binds an existing symbol through
//! exactly two inputs (the prior DID output plus an etp output at the new
//! address). Every output's DID envelope is also checked against the chain's
//! address-to-DID index.

use tracing::debug;

use lib_blockchain::constants::DID_ATTACH_VERIFY_VERSION;
use lib_blockchain::transaction::{AttachmentPayload, DidDetail, DidStatus, Transaction, TxOutput};
use lib_types::Address;

use crate::chain::ChainReader;
use crate::errors::{ValidateError, ValidateResult};

pub fn check_did(tx: &Transaction, chain: &dyn ChainReader) -> ValidateResult<()> {
    let mut seen_did_op: Option<DidStatus> = None;

    for output in &tx.outputs {
        check_attachment_address(output, chain)?;

        // to_did binding (strong check)
        check_attachment_did_match_address(output, chain)?;

        // from_did binding (weak check)
        if !connect_input_address_match_did(tx, chain, output) {
            return Err(ValidateError::DidAddressNotMatch);
        }

        if let Some(did) = output.did() {
            match did.status {
                DidStatus::Detail => {
                    if chain.is_valid_address(&did.symbol) {
                        return Err(ValidateError::DidSymbolInvalid);
                    }
                    if chain.is_did_exist(&did.symbol) {
                        return Err(ValidateError::DidExist);
                    }
                    if chain.is_address_registered_did(&did.address) {
                        return Err(ValidateError::AddressRegisteredDid);
                    }
                }
                DidStatus::Transferable => {
                    // transfer only re-binds an existing DID
                    if !chain.is_did_exist(&did.symbol) {
                        return Err(ValidateError::DidNotExist);
                    }
                    if chain.is_address_registered_did(&did.address) {
                        return Err(ValidateError::AddressRegisteredDid);
                    }
                }
            }

            if seen_did_op.is_some() {
                return Err(ValidateError::DidMultiTypeExist);
            }
            seen_did_op = Some(did.status);

            if !connect_did_input(tx, chain, did) {
                return Err(ValidateError::DidInputError);
            }
        } else if output.is_asset_issue() || output.is_asset_secondaryissue() {
            if output.attachment.version == DID_ATTACH_VERIFY_VERSION {
                let issuer = output
                    .asset_detail()
                    .map(|detail| detail.issuer.as_str())
                    .unwrap_or_default();
                if issuer != output.attachment.to_did {
                    debug!(
                        %issuer,
                        to_did = %output.attachment.to_did,
                        "asset issuer does not match attachment did"
                    );
                    return Err(ValidateError::AssetDidRegisterrNotMatch);
                }
            }
        } else if let Some(cert_info) = output.asset_cert() {
            if output.attachment.version == DID_ATTACH_VERIFY_VERSION
                && cert_info.owner != output.attachment.to_did
            {
                debug!(
                    owner = %cert_info.owner,
                    to_did = %output.attachment.to_did,
                    "cert owner does not match attachment did"
                );
                return Err(ValidateError::AssetDidRegisterrNotMatch);
            }
        }
    }

    Ok(())
}

/// Input shape of a DID operation.
///
/// Registration needs an etp input spending from the address being bound.
/// Transfer needs exactly two inputs: the prior DID output of the symbol and
/// an etp output at the new address.
fn connect_did_input(tx: &Transaction, chain: &dyn ChainReader, did: &DidDetail) -> bool {
    let is_transfer = did.status == DidStatus::Transferable;

    if is_transfer && tx.inputs.len() != 2 {
        return false;
    }

    let mut found_did_info = false;
    let mut found_address_info = false;

    for input in &tx.inputs {
        let Some((prev_tx, _)) = chain.get_transaction(&input.previous_output.tx_hash) else {
            return false;
        };
        let Some(prev_output) = prev_tx.outputs.get(input.previous_output.index as usize) else {
            return false;
        };

        if prev_output.is_did() {
            if is_transfer && prev_output.did_symbol() == Some(did.symbol.as_str()) {
                found_did_info = true;
            }
        } else if prev_output.is_etp()
            && prev_output.script_address() == Some(&did.address)
        {
            found_address_info = true;
        }
    }

    (is_transfer && found_did_info && found_address_info)
        || (!is_transfer && found_address_info)
}

/// Weak from_did check: some input must spend from an address bound to the
/// declared sender DID.
fn connect_input_address_match_did(
    tx: &Transaction,
    chain: &dyn ChainReader,
    output: &TxOutput,
) -> bool {
    let from_did = &output.attachment.from_did;
    if from_did.is_empty() {
        return true;
    }

    for input in &tx.inputs {
        let Some((prev_tx, _)) = chain.get_transaction(&input.previous_output.tx_hash) else {
            return false;
        };
        let Some(prev_output) = prev_tx.outputs.get(input.previous_output.index as usize) else {
            return false;
        };

        if let Some(address) = prev_output.script_address() {
            if chain.get_did_from_address(address).as_deref() == Some(from_did.as_str()) {
                return true;
            }
        }
    }

    false
}

/// The address a payload declares, for the kinds that declare one
fn attachment_address(output: &TxOutput) -> Option<&Address> {
    match &output.attachment.payload {
        AttachmentPayload::AssetIssue(detail)
        | AttachmentPayload::AssetSecondaryIssue(detail) => Some(&detail.address),
        AttachmentPayload::AssetCert(cert_info) => Some(&cert_info.address),
        AttachmentPayload::Mit(mit) => Some(&mit.address),
        AttachmentPayload::Did(did) => Some(&did.address),
        _ => None,
    }
}

/// The payload's declared address must decode and agree with the locking
/// script's destination.
fn check_attachment_address(output: &TxOutput, chain: &dyn ChainReader) -> ValidateResult<()> {
    let Some(attached) = attachment_address(output) else {
        return Ok(());
    };

    if !chain.is_valid_address(attached.as_str()) {
        return Err(ValidateError::DidAddressNotMatch);
    }
    if let Some(script_address) = output.script_address() {
        if script_address != attached {
            return Err(ValidateError::DidAddressNotMatch);
        }
    }

    Ok(())
}

/// A declared receiver DID must already resolve to the output's address.
/// DID outputs are exempt: they are the operation that (re)creates the
/// binding being looked up.
fn check_attachment_did_match_address(
    output: &TxOutput,
    chain: &dyn ChainReader,
) -> ValidateResult<()> {
    let to_did = &output.attachment.to_did;
    if to_did.is_empty() || output.is_did() {
        return Ok(());
    }

    let Some(address) = output.script_address() else {
        return Err(ValidateError::DidAddressNotMatch);
    };
    if chain.get_did_from_address(address).as_deref() != Some(to_did.as_str()) {
        return Err(ValidateError::DidAddressNotMatch);
    }

    Ok(())
}
