//! Asset Issuance Check
//!
//! A transaction may create at most one new asset. The issuance may carry an
//! issue certificate for the new symbol and, when the symbol lives under a
//! domain, exactly one domain or naming certificate authorizing it.

use tracing::debug;

use lib_blockchain::constants::tx_version;
use lib_blockchain::symbol;
use lib_blockchain::transaction::{cert, CertType, Transaction, TxOutput};
use lib_types::Address;

use crate::chain::ChainReader;
use crate::errors::{ValidateError, ValidateResult};
use crate::features::{check_same, is_allowed_companion};

pub fn check_asset_issue(tx: &Transaction, chain: &dyn ChainReader) -> ValidateResult<()> {
    if !tx.outputs.iter().any(TxOutput::is_asset_issue) {
        return Ok(());
    }

    let mut seen_issue = false;
    let mut num_cert_issue = 0usize;
    let mut num_cert_domain_or_naming = 0usize;
    let mut cert_mask: &[CertType] = &[];
    let mut cert_types: Vec<CertType> = Vec::new();
    let mut asset_symbol: Option<&str> = None;
    let mut asset_address: Option<&Address> = None;
    let mut cert_owner: Option<&str> = None;

    for output in &tx.outputs {
        if let Some(detail) = output.asset_issue_detail() {
            if seen_issue {
                // can not issue multiple assets in the same transaction
                return Err(ValidateError::AssetIssueError);
            }
            seen_issue = true;

            if !detail.is_threshold_valid() {
                return Err(ValidateError::AssetSecondaryIssueThresholdInvalid);
            }
            if !check_same(&mut asset_symbol, detail.symbol.as_str()) {
                return Err(ValidateError::AssetIssueError);
            }
            if !check_same(&mut asset_address, &detail.address) {
                return Err(ValidateError::AssetIssueError);
            }
            if chain.is_asset_exist(&detail.symbol) {
                return Err(ValidateError::AssetExist);
            }
            if let Some(model) = output.script.attenuation_model() {
                if !model.check_model_param(detail.maximum_supply) {
                    debug!(symbol = %detail.symbol, "issue: model param invalid");
                    return Err(ValidateError::AttenuationModelParamError);
                }
            }
            cert_mask = &detail.cert_mask;
        } else if let Some(cert_info) = output.asset_cert() {
            match cert_info.cert_type {
                CertType::Issue => {
                    num_cert_issue += 1;
                    if num_cert_issue > 1 {
                        return Err(ValidateError::AssetIssueError);
                    }
                    if !check_same(&mut asset_symbol, cert_info.symbol.as_str()) {
                        return Err(ValidateError::AssetIssueError);
                    }
                    let Some(script_address) = output.script_address() else {
                        return Err(ValidateError::AssetIssueError);
                    };
                    if !check_same(&mut asset_address, script_address) {
                        return Err(ValidateError::AssetIssueError);
                    }
                }
                CertType::Domain => {
                    num_cert_domain_or_naming += 1;
                    if num_cert_domain_or_naming > 1 {
                        return Err(ValidateError::AssetIssueError);
                    }
                    if let Some(issue_symbol) = asset_symbol {
                        if symbol::domain_of(issue_symbol) != Some(cert_info.symbol.as_str()) {
                            return Err(ValidateError::AssetIssueError);
                        }
                    }
                    if !check_same(&mut cert_owner, cert_info.owner.as_str()) {
                        return Err(ValidateError::AssetIssueError);
                    }
                }
                CertType::Naming => {
                    num_cert_domain_or_naming += 1;
                    if num_cert_domain_or_naming > 1 {
                        return Err(ValidateError::AssetIssueError);
                    }
                    if !check_same(&mut asset_symbol, cert_info.symbol.as_str()) {
                        return Err(ValidateError::AssetIssueError);
                    }
                    if !check_same(&mut cert_owner, cert_info.owner.as_str()) {
                        return Err(ValidateError::AssetIssueError);
                    }
                }
            }

            cert_types.push(cert_info.cert_type);
        } else if !is_allowed_companion(output) {
            debug!(symbol = ?asset_symbol, "issue: illegal companion output");
            return Err(ValidateError::AssetIssueError);
        }
    }

    // Cert requirements apply from the nova format on.
    if tx.version >= tx_version::CHECK_NOVA_FEATURE {
        if !cert::test_certs(&cert_types, cert_mask) {
            debug!("issue asset: not enough certs for the declared mask");
            return Err(ValidateError::AssetIssueError);
        }

        let issue_symbol = asset_symbol.unwrap_or_default();
        if let Some(domain) = symbol::domain_of(issue_symbol) {
            if symbol::is_valid_domain(domain) {
                if cert_owner.map_or(true, str::is_empty) {
                    debug!(symbol = %issue_symbol, "issue asset: cert owner is empty");
                    return Err(ValidateError::AssetCertError);
                }
                if num_cert_domain_or_naming < 1 {
                    debug!(symbol = %issue_symbol, "issue asset: no cert provided");
                    return Err(ValidateError::AssetCertNotProvided);
                }
            }
        }
    }

    Ok(())
}
