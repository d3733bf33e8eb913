//! Basic Transaction Checks
//!
//! Stateless-or-chain-read-only checks every candidate passes before the
//! per-feature rules run. Fails with the specific error of the first
//! violation.

use tracing::debug;

use lib_blockchain::constants::{
    self, tx_version, MAX_COINBASE_SCRIPT_SIZE, MAX_TRANSACTION_SIZE, MIN_COINBASE_SCRIPT_SIZE,
    NOVA_ACTIVATION_HEIGHT,
};
use lib_blockchain::symbol;
use lib_blockchain::transaction::Transaction;
use lib_blockchain::ScriptPattern;
use lib_types::Amount;

use crate::chain::ChainReader;
use crate::errors::{ValidateError, ValidateResult};

/// Whether the nova rule bundle is active: always on testnet, strictly above
/// the activation height on mainnet.
pub fn is_nova_feature_activated(chain: &dyn ChainReader) -> bool {
    if chain.chain_settings().use_testnet_rules {
        return true;
    }
    chain.get_last_height() > NOVA_ACTIVATION_HEIGHT
}

/// Run the basic check battery against a candidate transaction.
pub fn check_transaction_basic(tx: &Transaction, chain: &dyn ChainReader) -> ValidateResult<()> {
    if tx.version >= tx_version::MAX_VERSION {
        return Err(ValidateError::TransactionVersionError);
    }

    if tx.version == tx_version::CHECK_NOVA_FEATURE && !is_nova_feature_activated(chain) {
        return Err(ValidateError::NovaFeatureNotActivated);
    }

    if tx.version == tx_version::CHECK_NOVA_TESTNET && !chain.chain_settings().use_testnet_rules {
        return Err(ValidateError::TransactionVersionError);
    }

    if tx.version >= tx_version::CHECK_OUTPUT_SCRIPT {
        for output in &tx.outputs {
            if output.script.pattern() == ScriptPattern::NonStandard {
                return Err(ValidateError::ScriptNotStandard);
            }
        }
    }

    if tx.inputs.is_empty() || tx.outputs.is_empty() {
        return Err(ValidateError::EmptyTransaction);
    }

    if tx.serialized_size() > MAX_TRANSACTION_SIZE {
        return Err(ValidateError::SizeLimits);
    }

    // Check for overflowing output values
    let mut total_output_value: Amount = 0;
    for output in &tx.outputs {
        if output.value > constants::max_money() {
            return Err(ValidateError::OutputValueOverflow);
        }

        total_output_value = total_output_value
            .checked_add(output.value)
            .ok_or(ValidateError::OutputValueOverflow)?;

        if total_output_value > constants::max_money() {
            return Err(ValidateError::OutputValueOverflow);
        }
    }

    for output in &tx.outputs {
        if let Some(detail) = output.asset_issue_detail() {
            if !symbol::is_valid_asset_symbol(&detail.symbol, tx.version) {
                return Err(ValidateError::AssetSymbolInvalid);
            }
        } else if let Some(cert) = output.asset_cert() {
            if !chain.is_did_exist(&cert.owner) {
                return Err(ValidateError::DidAddressNeeded);
            }
        } else if output.is_did_register() {
            let is_test = chain.chain_settings().use_testnet_rules;
            let did_symbol = output.did_symbol().unwrap_or_default();
            if !symbol::is_valid_did_symbol(did_symbol, !is_test) {
                return Err(ValidateError::DidSymbolInvalid);
            }
        } else if output.is_asset_mit_register() {
            let mit_symbol = output.asset_symbol().unwrap_or_default();
            if !symbol::is_valid_mit_symbol(mit_symbol) {
                return Err(ValidateError::MitSymbolInvalid);
            }
        }

        // check attachment, from nova version.
        if tx.version >= tx_version::CHECK_NOVA_FEATURE && !output.attachment.is_valid() {
            debug!(?output.attachment, "invalid attachment");
            return Err(ValidateError::AttachmentInvalid);
        }
    }

    if tx.is_coinbase() {
        let coinbase_size = tx.inputs[0].script.serialized_size();
        if !(MIN_COINBASE_SCRIPT_SIZE..=MAX_COINBASE_SCRIPT_SIZE).contains(&coinbase_size) {
            return Err(ValidateError::InvalidCoinbaseScriptSize);
        }
    } else {
        for input in &tx.inputs {
            if input.previous_output.is_null() {
                return Err(ValidateError::PreviousOutputNull);
            }

            if input.script.pattern() == ScriptPattern::SignKeyHashWithLockHeight {
                let lock_height = input.script.lock_height().unwrap_or_default();
                let current_height = chain.get_last_height();

                let Some((_, prev_height)) = chain.get_transaction(&input.previous_output.tx_hash)
                else {
                    return Err(ValidateError::InputNotFound);
                };

                if lock_height > current_height.saturating_sub(prev_height) {
                    return Err(ValidateError::InvalidInputScriptLockHeight);
                }
            }
        }

        for output in &tx.outputs {
            if output.script.pattern() == ScriptPattern::PayKeyHashWithLockHeight {
                let lock_height = output.script.lock_height().unwrap_or_default();
                if constants::lock_heights_index(lock_height).is_none() {
                    return Err(ValidateError::InvalidOutputScriptLockHeight);
                }
            }
        }

        if tx.version >= tx_version::CHECK_NOVA_FEATURE {
            for output in &tx.outputs {
                if let Some(model) = output.script.attenuation_model() {
                    if !model.is_well_formed() {
                        debug!("attenuation model param check failed");
                        return Err(ValidateError::AttenuationModelParamError);
                    }
                }
            }
        }
    }

    Ok(())
}
