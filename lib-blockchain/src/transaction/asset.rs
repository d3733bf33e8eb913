//! Fungible Asset Records
//!
//! An asset is identified by its uppercase symbol, globally unique on the
//! confirmed chain. The detail record is embedded in issue and
//! secondary-issue outputs; transfers carry only (symbol, quantity).

use lib_types::{Address, Amount};
use serde::{Deserialize, Serialize};

use crate::transaction::cert::CertType;

/// Secondary issuance disabled for this asset
pub const THRESHOLD_FORBIDDEN: u8 = 0;
/// Any holder may secondary-issue regardless of share
pub const THRESHOLD_FREELY_ISSUABLE: u8 = 127;

/// Full asset record, embedded in issue and secondary-issue outputs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetDetail {
    /// Uppercase-normalized symbol
    pub symbol: String,
    /// Quantity created by this issuance
    pub maximum_supply: Amount,
    /// Share (percent of circulating volume) a holder must control to
    /// secondary-issue, or one of the sentinel values
    pub secondary_issue_threshold: u8,
    /// DID symbol of the issuer
    pub issuer: String,
    /// Address the issuance pays to
    pub address: Address,
    /// Certificate types that must accompany the issuance
    pub cert_mask: Vec<CertType>,
    /// Free-form issuer description
    pub description: String,
}

impl AssetDetail {
    /// Whether the threshold byte is one of the allowed encodings:
    /// a percentage in 0..=100 or the freely-issuable sentinel.
    pub fn is_threshold_valid(&self) -> bool {
        let threshold = self.secondary_issue_threshold;
        threshold == THRESHOLD_FREELY_ISSUABLE || threshold <= 100
    }

    /// Whether this asset admits secondary issuance at all
    pub fn is_secondary_issue_allowed(&self) -> bool {
        self.is_threshold_valid() && self.secondary_issue_threshold != THRESHOLD_FORBIDDEN
    }
}

/// Whether a holder controlling `held` units out of `total` circulating
/// volume clears the secondary-issue `threshold`.
pub fn is_secondary_issue_owns_enough(held: Amount, total: Amount, threshold: u8) -> bool {
    if threshold == THRESHOLD_FREELY_ISSUABLE {
        return true;
    }
    if threshold == THRESHOLD_FORBIDDEN || threshold > 100 {
        return false;
    }
    // u128 to avoid overflow on total * threshold
    (held as u128) * 100 >= (total as u128) * (threshold as u128)
}

/// Asset movement: (symbol, quantity)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetTransfer {
    pub symbol: String,
    pub quantity: Amount,
}
