//! Decentralized Identifiers
//!
//! A DID binds a symbol 1:1 to an address: the symbol is globally unique and
//! an address holds at most one DID.

use lib_types::Address;
use serde::{Deserialize, Serialize};

/// Lifecycle state of a DID output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DidStatus {
    /// Initial registration
    Detail,
    /// Re-binding to a new address
    Transferable,
}

/// A DID record as carried by an output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DidDetail {
    /// Globally unique symbol
    pub symbol: String,
    /// Address the DID is bound to
    pub address: Address,
    pub status: DidStatus,
}
