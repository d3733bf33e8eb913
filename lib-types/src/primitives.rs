//! Canonical Primitive Types
//!
//! Foundational building blocks for all consensus-critical data structures.
//! They are designed to be:
//! - Deterministically serializable
//! - Efficient to copy and compare

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// TYPE ALIASES
// ============================================================================

/// Block height in the chain (0-indexed)
pub type BlockHeight = u64;

/// Coin amounts in base units (10^8 base units per coin)
pub type Amount = u64;

// ============================================================================
// TRANSACTION HASH
// ============================================================================

/// Transaction identifier: the double SHA-256 of a transaction's canonical
/// encoding.
///
/// The all-zero hash never identifies a real transaction; paired with a
/// sentinel index it marks the null outpoint a coinbase input carries.
#[derive(Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize, Default)]
pub struct TxHash([u8; 32]);

impl TxHash {
    pub const fn new(digest: [u8; 32]) -> Self {
        Self(digest)
    }

    /// The all-zero sentinel hash
    pub const fn zero() -> Self {
        Self::new([0u8; 32])
    }

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|&byte| byte == 0)
    }

    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

// Log lines only need enough of the digest to correlate by eye.
impl fmt::Debug for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TxHash({}..)", hex::encode(&self.0[..6]))
    }
}

impl From<[u8; 32]> for TxHash {
    fn from(digest: [u8; 32]) -> Self {
        Self(digest)
    }
}

impl AsRef<[u8]> for TxHash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

// ============================================================================
// ADDRESS
// ============================================================================

/// Encoded payment address.
///
/// Addresses are compared by their canonical string encoding; decoding and
/// checksum validation live at the wallet boundary, not here.
#[derive(Clone, Eq, PartialEq, Hash, Serialize, Deserialize, Default, PartialOrd, Ord)]
pub struct Address(String);

impl Address {
    /// Create an address from its canonical encoding
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    /// The canonical string encoding
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check if this is the empty (unset) address
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.0)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Address {
    fn from(encoded: &str) -> Self {
        Self(encoded.to_string())
    }
}

impl From<String> for Address {
    fn from(encoded: String) -> Self {
        Self(encoded)
    }
}

impl AsRef<str> for Address {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// ============================================================================
// TESTS
// ============================================================================
