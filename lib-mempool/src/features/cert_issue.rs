//! Certificate Issuance Check
//!
//! A transaction may create exactly one new certificate. Naming certificates
//! additionally require the authorizing domain certificate to travel in the
//! same transaction, owned by a registered DID at its current address.

use tracing::debug;

use lib_blockchain::symbol;
use lib_blockchain::transaction::{cert, CertType, Transaction, TxOutput};

use crate::chain::ChainReader;
use crate::errors::{ValidateError, ValidateResult};
use crate::features::{check_same, is_allowed_companion};

pub fn check_asset_cert_issue(tx: &Transaction, chain: &dyn ChainReader) -> ValidateResult<()> {
    if !tx.outputs.iter().any(TxOutput::is_asset_cert_issue) {
        return Ok(());
    }

    let mut num_cert_issue = 0usize;
    let mut num_cert_domain = 0usize;
    let mut issue_cert_type: Option<CertType> = None;
    let mut cert_types: Vec<CertType> = Vec::new();
    let mut cert_symbol: Option<&str> = None;
    let mut cert_owner: Option<&str> = None;

    for output in &tx.outputs {
        if output.is_asset_cert_issue() {
            num_cert_issue += 1;
            if num_cert_issue > 1 {
                // can not issue multiple certs in the same transaction
                return Err(ValidateError::AssetCertIssueError);
            }

            let Some(cert_info) = output.asset_cert() else {
                return Err(ValidateError::AssetCertIssueError);
            };

            if !check_same(&mut cert_symbol, cert_info.symbol.as_str()) {
                debug!(symbol = %cert_info.symbol, "issue cert: symbol does not match");
                return Err(ValidateError::AssetCertIssueError);
            }

            if chain.is_asset_cert_exist(&cert_info.symbol, cert_info.cert_type) {
                debug!(symbol = %cert_info.symbol, "issue cert: already exists");
                return Err(ValidateError::AssetCertExist);
            }

            issue_cert_type = Some(cert_info.cert_type);
        } else if let Some(cert_info) = output.asset_cert() {
            if cert_info.cert_type != CertType::Domain {
                debug!(symbol = %cert_info.symbol, "issue cert: invalid companion cert");
                return Err(ValidateError::AssetCertIssueError);
            }

            if issue_cert_type != Some(CertType::Naming) {
                debug!("issue cert: redundant domain cert");
                return Err(ValidateError::AssetCertIssueError);
            }

            num_cert_domain += 1;
            if num_cert_domain > 1 {
                return Err(ValidateError::AssetCertIssueError);
            }

            if let Some(naming_symbol) = cert_symbol {
                if symbol::domain_of(naming_symbol) != Some(cert_info.symbol.as_str()) {
                    return Err(ValidateError::AssetCertIssueError);
                }
            }

            cert_owner = Some(cert_info.owner.as_str());
            let Some(did_detail) = chain.get_registered_did(&cert_info.owner) else {
                debug!(owner = %cert_info.owner, "issue cert: cert owner is not registered");
                return Err(ValidateError::AssetCertIssueError);
            };
            if cert_info.address != did_detail.address {
                debug!(owner = %cert_info.owner, "issue cert: cert address does not track owner");
                return Err(ValidateError::AssetCertIssueError);
            }

            cert_types.push(cert_info.cert_type);
        } else if !is_allowed_companion(output) {
            debug!(symbol = ?cert_symbol, "issue cert: illegal companion output");
            return Err(ValidateError::AssetCertIssueError);
        }
    }

    let Some(issued_type) = issue_cert_type else {
        return Err(ValidateError::AssetCertIssueError);
    };

    if issued_type == CertType::Naming {
        if !cert::test_certs(&cert_types, &[CertType::Domain])
            || cert_owner.map_or(true, str::is_empty)
        {
            debug!("issue cert: no domain cert provided to issue naming cert");
            return Err(ValidateError::AssetCertIssueError);
        }

        // the naming cert reserves the asset symbol it will issue
        let naming_symbol = cert_symbol.unwrap_or_default();
        if chain.is_asset_exist(naming_symbol) {
            debug!(symbol = %naming_symbol, "issue cert: asset symbol already exists");
            return Err(ValidateError::AssetExist);
        }
    }

    Ok(())
}
