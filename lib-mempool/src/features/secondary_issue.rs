//! Secondary Issuance Check
//!
//! Secondary issuance mints additional volume of an existing asset. The
//! issuer must move enough of the circulating volume through the transaction
//! to clear the asset's declared threshold, and (from the nova format on)
//! must present the asset's issue certificate.

use tracing::debug;

use lib_blockchain::constants::tx_version;
use lib_blockchain::transaction::{cert, is_secondary_issue_owns_enough, CertType, Transaction, TxOutput};
use lib_types::{Address, Amount};

use crate::chain::ChainReader;
use crate::errors::{ValidateError, ValidateResult};
use crate::features::{check_same, is_allowed_companion};

pub fn check_secondary_issue(tx: &Transaction, chain: &dyn ChainReader) -> ValidateResult<()> {
    if !tx.outputs.iter().any(TxOutput::is_asset_secondaryissue) {
        return Ok(());
    }

    let mut num_secondary_issue = 0usize;
    let mut num_asset_cert = 0usize;
    let mut asset_symbol: Option<&str> = None;
    let mut asset_address: Option<&Address> = None;
    let mut cert_owner: Option<&str> = None;
    let mut secondary_issue_threshold = 0u8;
    let mut secondary_issue_amount: Amount = 0;
    let mut asset_transfer_volume: Amount = 0;
    let mut certs_out: Vec<CertType> = Vec::new();

    for output in &tx.outputs {
        if let Some(detail) = output.asset_secondaryissue_detail() {
            num_secondary_issue += 1;
            if num_secondary_issue > 1 {
                debug!(symbol = ?asset_symbol, "secondaryissue: more than one issue output");
                return Err(ValidateError::AssetSecondaryIssueError);
            }

            if !detail.is_secondary_issue_allowed() {
                debug!(symbol = %detail.symbol, "secondaryissue: threshold value invalid");
                return Err(ValidateError::AssetSecondaryIssueThresholdInvalid);
            }
            if !check_same(&mut asset_symbol, detail.symbol.as_str()) {
                return Err(ValidateError::AssetSecondaryIssueError);
            }
            if !check_same(&mut asset_address, &detail.address) {
                return Err(ValidateError::AssetSecondaryIssueError);
            }
            if let Some(model) = output.script.attenuation_model() {
                if !model.check_model_param(detail.maximum_supply) {
                    debug!(symbol = %detail.symbol, "secondaryissue: model param invalid");
                    return Err(ValidateError::AttenuationModelParamError);
                }
            }

            secondary_issue_threshold = detail.secondary_issue_threshold;
            secondary_issue_amount = detail.maximum_supply;
        } else if let Some(transfer) = output.asset_transfer() {
            if !check_same(&mut asset_symbol, transfer.symbol.as_str()) {
                return Err(ValidateError::AssetSecondaryIssueError);
            }
            let Some(script_address) = output.script_address() else {
                return Err(ValidateError::AssetSecondaryIssueError);
            };
            if !check_same(&mut asset_address, script_address) {
                return Err(ValidateError::AssetSecondaryIssueError);
            }
            asset_transfer_volume = asset_transfer_volume.saturating_add(transfer.quantity);
        } else if let Some(cert_info) = output.asset_cert() {
            num_asset_cert += 1;
            if num_asset_cert > 1 {
                debug!(symbol = ?asset_symbol, "secondaryissue: more than one cert output");
                return Err(ValidateError::AssetSecondaryIssueError);
            }
            if cert_info.cert_type != CertType::Issue {
                debug!(symbol = %cert_info.symbol, "secondaryissue: invalid cert output");
                return Err(ValidateError::AssetSecondaryIssueError);
            }
            if !check_same(&mut asset_symbol, cert_info.symbol.as_str()) {
                return Err(ValidateError::AssetSecondaryIssueError);
            }
            if !check_same(&mut cert_owner, cert_info.owner.as_str()) {
                return Err(ValidateError::AssetSecondaryIssueError);
            }
            certs_out.push(cert_info.cert_type);
        } else if !is_allowed_companion(output) {
            debug!(symbol = ?asset_symbol, "secondaryissue: illegal companion output");
            return Err(ValidateError::AssetSecondaryIssueError);
        }
    }

    if tx.version >= tx_version::CHECK_NOVA_FEATURE
        && !cert::test_certs(&certs_out, &[CertType::Issue])
    {
        debug!(symbol = ?asset_symbol, "secondaryissue: no issue cert");
        return Err(ValidateError::AssetCertError);
    }

    let symbol = asset_symbol.unwrap_or_default();
    let total_volume = chain.get_asset_volume(symbol);
    if total_volume > Amount::MAX - secondary_issue_amount {
        debug!(%symbol, "secondaryissue: total volume would overflow");
        return Err(ValidateError::AssetSecondaryIssueError);
    }

    if !is_secondary_issue_owns_enough(asset_transfer_volume, total_volume, secondary_issue_threshold)
    {
        debug!(%symbol, "secondaryissue: not enough volume held");
        return Err(ValidateError::AssetSecondaryIssueShareNotEnough);
    }

    // Asset and cert inputs must come from the issuing address.
    for input in &tx.inputs {
        let Some((prev_tx, _)) = chain.get_transaction(&input.previous_output.tx_hash) else {
            debug!(hash = %input.previous_output.tx_hash, "secondaryissue: input not found");
            return Err(ValidateError::InputNotFound);
        };
        let Some(prev_output) = prev_tx.outputs.get(input.previous_output.index as usize) else {
            return Err(ValidateError::ValidateInputsFailed);
        };

        if let Some(prev_cert) = prev_output.asset_cert() {
            if prev_cert.symbol != symbol || prev_cert.cert_type != CertType::Issue {
                debug!(%symbol, "secondaryissue: invalid cert input");
                return Err(ValidateError::ValidateInputsFailed);
            }
        } else if prev_output.is_asset() {
            if asset_address != prev_output.script_address() {
                debug!(%symbol, "secondaryissue: invalid asset input");
                return Err(ValidateError::ValidateInputsFailed);
            }
        }
    }

    Ok(())
}
