//! Consensus Constants
//!
//! Tuning values that are consensus-visible. These are bit-exact: changing
//! any of them is a hard fork.

use lib_types::{Amount, BlockHeight};

/// Minimum fee for a mempool transaction, in base units
pub const MIN_TX_FEE: Amount = 10_000;

/// Max transaction size is set to max block size (1,000,000).
pub const MAX_TRANSACTION_SIZE: u64 = 1_000_000;

/// Minimum height gap between a coinbase output's confirmation and a
/// transaction spending it
pub const COINBASE_MATURITY: BlockHeight = 1_000;

/// Mainnet height strictly above which the nova feature set is active
pub const NOVA_ACTIVATION_HEIGHT: BlockHeight = 1_270_000;

/// Coinbase input script serialized size bounds, inclusive
pub const MIN_COINBASE_SCRIPT_SIZE: u64 = 2;
pub const MAX_COINBASE_SCRIPT_SIZE: u64 = 100;

/// Attachment version that requires DID binding verification
pub const DID_ATTACH_VERIFY_VERSION: u32 = 207;

/// Initial attachment version
pub const ATTACH_INIT_VERSION: u32 = 1;

/// Total money supply cap: 100 million coins at 10^8 base units each
pub const fn max_money() -> Amount {
    100_000_000 * 100_000_000
}

/// The lock heights a pay-key-hash-with-lock-height output may carry.
/// Outputs locked this way earn a deposit premium tied to the table index.
pub const LOCK_HEIGHTS: [u64; 5] = [25_200, 108_000, 331_200, 655_200, 1_314_000];

/// Index of `lock_height` in [`LOCK_HEIGHTS`], if it is an allowed value
pub fn lock_heights_index(lock_height: u64) -> Option<usize> {
    LOCK_HEIGHTS.iter().position(|&h| h == lock_height)
}

/// Transaction format versions.
///
/// Versions are ordered: a rule gated on `version >= X` applies to every
/// later format as well.
pub mod tx_version {
    /// Original transaction format
    pub const FIRST: u32 = 1;
    /// Output script patterns must be standard from this version
    pub const CHECK_OUTPUT_SCRIPT: u32 = 2;
    /// Nova rule bundle: attachment validity, cert masks, attenuation
    pub const CHECK_NOVA_FEATURE: u32 = 3;
    /// Nova testnet-only trial format
    pub const CHECK_NOVA_TESTNET: u32 = 4;
    /// First unassigned version; anything at or above is invalid
    pub const MAX_VERSION: u32 = 5;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lock_heights_index() {
        assert_eq!(lock_heights_index(25_200), Some(0));
        assert_eq!(lock_heights_index(1_314_000), Some(4));
        assert_eq!(lock_heights_index(0), None);
        assert_eq!(lock_heights_index(25_201), None);
    }

    #[test]
    fn test_max_money() {
        assert_eq!(max_money(), 10_000_000_000_000_000);
    }
}
