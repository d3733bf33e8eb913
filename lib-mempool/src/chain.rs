//! Confirmed Chain Interface
//!
//! Read-only view of the confirmed chain the validator runs against. The
//! fetch methods are asynchronous: each is a suspension point of the
//! admission pipeline. The query methods are synchronous index lookups.

use async_trait::async_trait;

use lib_blockchain::transaction::{CertType, DidDetail, Mit, OutPoint, Transaction};
use lib_types::{Address, Amount, BlockHeight, TxHash};

use crate::errors::ChainResult;

/// Whether an outpoint has been consumed on the confirmed chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpendState {
    Unspent,
    Spent,
}

/// Chain-wide settings the validator keys rules on
#[derive(Debug, Clone, Copy, Default)]
pub struct ChainSettings {
    pub use_testnet_rules: bool,
}

/// Read-only access to the confirmed chain and its indices.
///
/// Implemented by the chain store; the validator never writes.
#[async_trait]
pub trait ChainReader: Send + Sync {
    /// Fetch a confirmed transaction by hash
    async fn fetch_transaction(&self, hash: &TxHash) -> ChainResult<Option<Transaction>>;

    /// Fetch the confirmed height of a transaction by hash
    async fn fetch_transaction_index(&self, hash: &TxHash) -> ChainResult<Option<BlockHeight>>;

    /// Fetch the current chain tip height
    async fn fetch_last_height(&self) -> ChainResult<BlockHeight>;

    /// Whether a confirmed spend of `outpoint` exists
    async fn fetch_spend(&self, outpoint: &OutPoint) -> ChainResult<SpendState>;

    /// Synchronous lookup of a confirmed transaction and its height
    fn get_transaction(&self, hash: &TxHash) -> Option<(Transaction, BlockHeight)>;

    /// Synchronous chain tip height
    fn get_last_height(&self) -> BlockHeight;

    /// Whether an asset with this symbol is registered
    fn is_asset_exist(&self, symbol: &str) -> bool;

    /// Whether a certificate of this (symbol, type) is registered
    fn is_asset_cert_exist(&self, symbol: &str, cert_type: CertType) -> bool;

    /// Whether a DID with this symbol is registered
    fn is_did_exist(&self, symbol: &str) -> bool;

    /// The registered MIT for a symbol, if any
    fn get_registered_mit(&self, symbol: &str) -> Option<Mit>;

    /// The registered DID record for a symbol, if any
    fn get_registered_did(&self, symbol: &str) -> Option<DidDetail>;

    /// The DID symbol an address is bound to, if any
    fn get_did_from_address(&self, address: &Address) -> Option<String>;

    /// Accumulated issued volume of an asset symbol
    fn get_asset_volume(&self, symbol: &str) -> Amount;

    /// Whether `candidate` parses as a payment address
    fn is_valid_address(&self, candidate: &str) -> bool;

    /// Chain-wide settings
    fn chain_settings(&self) -> ChainSettings;

    /// Whether an address already carries a DID
    fn is_address_registered_did(&self, address: &Address) -> bool {
        self.get_did_from_address(address).is_some()
    }
}
