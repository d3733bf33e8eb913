//! MIT Identifier Tokens
//!
//! A MIT is a symbol-unique, non-fungible record bound to an address.

use lib_types::Address;
use serde::{Deserialize, Serialize};

/// Lifecycle state of a MIT output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MitStatus {
    Register,
    Transfer,
}

/// A MIT token as carried by an output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mit {
    /// Globally unique symbol
    pub symbol: String,
    /// Holding address
    pub address: Address,
    /// Free-form registration content; empty on transfers
    pub content: String,
    pub status: MitStatus,
}
