//! Script Patterns & Verification Flags
//!
//! The script interpreter itself lives outside this workspace; the chain
//! model only needs to recognize the handful of script patterns the
//! validator keys its rules on, and to carry the verification flag set the
//! interpreter is invoked with.

use std::ops::BitOr;

use lib_types::Address;
use serde::{Deserialize, Serialize};

use crate::attenuation::AttenuationModel;
use crate::transaction::Transaction;

/// A locking or unlocking script, carried in its recognized pattern form.
///
/// Pattern recognition happens at decode time; the validator never inspects
/// raw operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Script {
    /// Standard pay-to-key-hash lock
    PayKeyHash { address: Address },
    /// Pay-to-key-hash locked until a height gap has passed
    PayKeyHashWithLockHeight { address: Address, lock_height: u64 },
    /// Pay-to-key-hash with a gradual asset release schedule
    PayKeyHashWithAttenuationModel {
        address: Address,
        model: AttenuationModel,
    },
    /// Unlock script revealing a signature over a lock-height commitment
    SignKeyHashWithLockHeight { lock_height: u64 },
    /// Ordinary unlock script (signature + public key)
    Input,
    /// Coinbase input script: arbitrary miner data
    Coinbase { data: Vec<u8> },
    /// Anything the decoder did not recognize
    NonStandard,
}

/// The recognized pattern of a script
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScriptPattern {
    PayKeyHash,
    PayKeyHashWithLockHeight,
    PayKeyHashWithAttenuationModel,
    SignKeyHashWithLockHeight,
    Input,
    Coinbase,
    NonStandard,
}

impl Script {
    /// The recognized pattern of this script
    pub fn pattern(&self) -> ScriptPattern {
        match self {
            Script::PayKeyHash { .. } => ScriptPattern::PayKeyHash,
            Script::PayKeyHashWithLockHeight { .. } => ScriptPattern::PayKeyHashWithLockHeight,
            Script::PayKeyHashWithAttenuationModel { .. } => {
                ScriptPattern::PayKeyHashWithAttenuationModel
            }
            Script::SignKeyHashWithLockHeight { .. } => ScriptPattern::SignKeyHashWithLockHeight,
            Script::Input => ScriptPattern::Input,
            Script::Coinbase { .. } => ScriptPattern::Coinbase,
            Script::NonStandard => ScriptPattern::NonStandard,
        }
    }

    /// Destination address, for the locking patterns that have one
    pub fn address(&self) -> Option<&Address> {
        match self {
            Script::PayKeyHash { address }
            | Script::PayKeyHashWithLockHeight { address, .. }
            | Script::PayKeyHashWithAttenuationModel { address, .. } => Some(address),
            _ => None,
        }
    }

    /// Lock height, for the lock-height patterns
    pub fn lock_height(&self) -> Option<u64> {
        match self {
            Script::PayKeyHashWithLockHeight { lock_height, .. }
            | Script::SignKeyHashWithLockHeight { lock_height } => Some(*lock_height),
            _ => None,
        }
    }

    /// Attenuation model parameters, when this is an attenuation lock
    pub fn attenuation_model(&self) -> Option<&AttenuationModel> {
        match self {
            Script::PayKeyHashWithAttenuationModel { model, .. } => Some(model),
            _ => None,
        }
    }

    /// Canonical encoded size in bytes
    pub fn serialized_size(&self) -> u64 {
        bincode::serialized_size(self).unwrap_or(0)
    }
}

// ============================================================================
// VERIFICATION FLAGS
// ============================================================================

/// Bitset of script verification rules to enforce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScriptFlags(u32);

impl ScriptFlags {
    /// No optional rules
    pub const NONE: ScriptFlags = ScriptFlags(0);
    /// Pay-to-script-hash evaluation (BIP16)
    pub const BIP16: ScriptFlags = ScriptFlags(1);
    /// CHECKLOCKTIMEVERIFY (BIP65)
    pub const BIP65: ScriptFlags = ScriptFlags(1 << 1);
    /// Strict DER signatures (BIP66)
    pub const BIP66: ScriptFlags = ScriptFlags(1 << 2);
    /// CHECKATTENUATIONVERIFY
    pub const ATTENUATION: ScriptFlags = ScriptFlags(1 << 3);

    /// Every rule enabled; what mempool admission always uses
    pub const fn all_enabled() -> ScriptFlags {
        ScriptFlags(
            Self::BIP16.0 | Self::BIP65.0 | Self::BIP66.0 | Self::ATTENUATION.0,
        )
    }

    /// Whether every bit of `other` is set in `self`
    pub const fn contains(&self, other: ScriptFlags) -> bool {
        self.0 & other.0 == other.0
    }

    /// Raw bits
    pub const fn bits(&self) -> u32 {
        self.0
    }
}

impl BitOr for ScriptFlags {
    type Output = ScriptFlags;

    fn bitor(self, rhs: ScriptFlags) -> ScriptFlags {
        ScriptFlags(self.0 | rhs.0)
    }
}

/// Script interpreter entry point, consumed by the validator.
///
/// Implementations run the unlocking script of `tx.inputs[input_index]`
/// against `prev_script` under `flags` and report whether evaluation
/// succeeded.
pub trait ScriptVerifier: Send + Sync {
    fn verify(
        &self,
        prev_script: &Script,
        tx: &Transaction,
        input_index: u32,
        flags: ScriptFlags,
    ) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_classification() {
        let script = Script::PayKeyHash {
            address: Address::new("MAhmHtMoLM4GTDBmqqqvRjLPCGCpMgEUDE"),
        };
        assert_eq!(script.pattern(), ScriptPattern::PayKeyHash);
        assert!(script.address().is_some());
        assert!(script.lock_height().is_none());

        assert_eq!(Script::NonStandard.pattern(), ScriptPattern::NonStandard);
        assert!(Script::NonStandard.address().is_none());
    }

    #[test]
    fn test_lock_height_accessor() {
        let script = Script::PayKeyHashWithLockHeight {
            address: Address::new("MAhmHtMoLM4GTDBmqqqvRjLPCGCpMgEUDE"),
            lock_height: 25_200,
        };
        assert_eq!(script.lock_height(), Some(25_200));
    }

    #[test]
    fn test_flags() {
        let flags = ScriptFlags::all_enabled();
        assert!(flags.contains(ScriptFlags::BIP16));
        assert!(flags.contains(ScriptFlags::BIP65));
        assert!(flags.contains(ScriptFlags::BIP66));
        assert!(flags.contains(ScriptFlags::ATTENUATION));

        let partial = ScriptFlags::BIP16 | ScriptFlags::BIP66;
        assert!(partial.contains(ScriptFlags::BIP16));
        assert!(!partial.contains(ScriptFlags::BIP65));
    }

    #[test]
    fn test_coinbase_script_size_tracks_data() {
        let small = Script::Coinbase { data: vec![0u8; 4] };
        let large = Script::Coinbase { data: vec![0u8; 200] };
        assert!(small.serialized_size() < large.serialized_size());
    }
}
