//! Asset Certificates
//!
//! A certificate is a non-fungible authority token over a symbol. It is
//! owned by a DID; its address must track the DID's current address. At most
//! one certificate of a given (symbol, type) exists on the confirmed chain.

use lib_types::Address;
use serde::{Deserialize, Serialize};

use crate::symbol;

/// Authority granted by a certificate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CertType {
    /// Right to secondary-issue the asset of the same symbol
    Issue,
    /// Right over a whole domain: authorizes naming certs beneath it
    Domain,
    /// Right to issue the asset of exactly this dotted symbol
    Naming,
}

/// Lifecycle state a certificate output is in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CertStatus {
    /// Plain carry-over of an existing certificate
    Normal,
    /// Fresh issuance of a certificate that did not exist before
    Issue,
    /// Ownership hand-over to a different DID
    Transfer,
    /// Certificate minted implicitly alongside an asset issuance
    AutoIssue,
}

/// A certificate as carried by an output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetCert {
    /// Symbol the authority applies to
    pub symbol: String,
    /// Owning DID symbol
    pub owner: String,
    /// Address of the owning DID at the time of the operation
    pub address: Address,
    pub cert_type: CertType,
    pub status: CertStatus,
}

impl AssetCert {
    /// Domain of the certificate's symbol, when it has one
    pub fn domain(&self) -> Option<&str> {
        symbol::domain_of(&self.symbol)
    }
}

/// Whether every certificate type in `required` is present in `certs`.
pub fn test_certs(certs: &[CertType], required: &[CertType]) -> bool {
    required.iter().all(|needed| certs.contains(needed))
}

/// Whether `certs` contains the single type `required`.
pub fn has_cert(certs: &[CertType], required: CertType) -> bool {
    certs.contains(&required)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cert_multiset_containment() {
        let held = vec![CertType::Issue, CertType::Domain];
        assert!(test_certs(&held, &[CertType::Issue]));
        assert!(test_certs(&held, &[CertType::Issue, CertType::Domain]));
        assert!(!test_certs(&held, &[CertType::Naming]));
        assert!(test_certs(&held, &[]));
    }

    #[test]
    fn test_has_cert() {
        let held = vec![CertType::Domain];
        assert!(has_cert(&held, CertType::Domain));
        assert!(!has_cert(&held, CertType::Issue));
    }

    #[test]
    fn test_cert_domain() {
        let cert = AssetCert {
            symbol: "FOO.BAR".to_string(),
            owner: "alice".to_string(),
            address: Address::new("MAhmHtMoLM4GTDBmqqqvRjLPCGCpMgEUDE"),
            cert_type: CertType::Naming,
            status: CertStatus::Normal,
        };
        assert_eq!(cert.domain(), Some("FOO"));
    }
}
