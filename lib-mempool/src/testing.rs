//! Test Support
//!
//! In-memory chain and pool stores plus transaction builders, shared by the
//! crate's unit tests and the integration suite. Not for production use.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;

use lib_blockchain::constants::tx_version;
use lib_blockchain::transaction::{
    Attachment, AttachmentPayload, CertType, DidDetail, DidStatus, Mit, MitStatus, OutPoint,
    Transaction, TxInput, TxOutput,
};
use lib_blockchain::{Script, ScriptFlags, ScriptVerifier};
use lib_types::{Address, Amount, BlockHeight, TxHash};

use crate::chain::{ChainReader, ChainSettings, SpendState};
use crate::errors::ChainResult;
use crate::pool::PoolReader;

// ============================================================================
// STORES
// ============================================================================

/// In-memory confirmed chain
#[derive(Debug, Clone, Default)]
pub struct MemoryChain {
    pub transactions: HashMap<TxHash, (Transaction, BlockHeight)>,
    pub spent: HashSet<OutPoint>,
    pub assets: HashSet<String>,
    pub asset_volumes: HashMap<String, Amount>,
    pub certs: HashSet<(String, CertType)>,
    pub mits: HashMap<String, Mit>,
    pub dids: HashMap<String, DidDetail>,
    pub last_height: BlockHeight,
    pub testnet: bool,
}

impl MemoryChain {
    pub fn new(last_height: BlockHeight) -> Self {
        Self {
            last_height,
            testnet: true,
            ..Self::default()
        }
    }

    /// Confirm a transaction at `height`, returning its hash
    pub fn insert_transaction(&mut self, tx: Transaction, height: BlockHeight) -> TxHash {
        let hash = tx.hash();
        self.transactions.insert(hash, (tx, height));
        hash
    }

    pub fn register_asset(&mut self, symbol: &str, volume: Amount) {
        self.assets.insert(symbol.to_string());
        self.asset_volumes.insert(symbol.to_string(), volume);
    }

    pub fn register_cert(&mut self, symbol: &str, cert_type: CertType) {
        self.certs.insert((symbol.to_string(), cert_type));
    }

    pub fn register_mit(&mut self, symbol: &str, address: Address) {
        self.mits.insert(
            symbol.to_string(),
            Mit {
                symbol: symbol.to_string(),
                address,
                content: String::new(),
                status: MitStatus::Register,
            },
        );
    }

    pub fn register_did(&mut self, symbol: &str, address: Address) {
        self.dids.insert(
            symbol.to_string(),
            DidDetail {
                symbol: symbol.to_string(),
                address,
                status: DidStatus::Detail,
            },
        );
    }

    pub fn mark_spent(&mut self, outpoint: OutPoint) {
        self.spent.insert(outpoint);
    }
}

#[async_trait]
impl ChainReader for MemoryChain {
    async fn fetch_transaction(&self, hash: &TxHash) -> ChainResult<Option<Transaction>> {
        Ok(self.transactions.get(hash).map(|(tx, _)| tx.clone()))
    }

    async fn fetch_transaction_index(&self, hash: &TxHash) -> ChainResult<Option<BlockHeight>> {
        Ok(self.transactions.get(hash).map(|(_, height)| *height))
    }

    async fn fetch_last_height(&self) -> ChainResult<BlockHeight> {
        Ok(self.last_height)
    }

    async fn fetch_spend(&self, outpoint: &OutPoint) -> ChainResult<SpendState> {
        if self.spent.contains(outpoint) {
            Ok(SpendState::Spent)
        } else {
            Ok(SpendState::Unspent)
        }
    }

    fn get_transaction(&self, hash: &TxHash) -> Option<(Transaction, BlockHeight)> {
        self.transactions.get(hash).cloned()
    }

    fn get_last_height(&self) -> BlockHeight {
        self.last_height
    }

    fn is_asset_exist(&self, symbol: &str) -> bool {
        self.assets.contains(symbol)
    }

    fn is_asset_cert_exist(&self, symbol: &str, cert_type: CertType) -> bool {
        self.certs.contains(&(symbol.to_string(), cert_type))
    }

    fn is_did_exist(&self, symbol: &str) -> bool {
        self.dids.contains_key(symbol)
    }

    fn get_registered_mit(&self, symbol: &str) -> Option<Mit> {
        self.mits.get(symbol).cloned()
    }

    fn get_registered_did(&self, symbol: &str) -> Option<DidDetail> {
        self.dids.get(symbol).cloned()
    }

    fn get_did_from_address(&self, address: &Address) -> Option<String> {
        self.dids
            .values()
            .find(|did| &did.address == address)
            .map(|did| did.symbol.clone())
    }

    fn get_asset_volume(&self, symbol: &str) -> Amount {
        self.asset_volumes.get(symbol).copied().unwrap_or(0)
    }

    fn is_valid_address(&self, candidate: &str) -> bool {
        candidate.len() >= 25
            && candidate.len() <= 40
            && candidate.chars().all(|c| c.is_ascii_alphanumeric())
    }

    fn chain_settings(&self) -> ChainSettings {
        ChainSettings {
            use_testnet_rules: self.testnet,
        }
    }
}

/// In-memory unconfirmed pool
#[derive(Debug, Clone, Default)]
pub struct MemoryPool {
    pub transactions: HashMap<TxHash, Transaction>,
}

impl MemoryPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, tx: Transaction) -> TxHash {
        let hash = tx.hash();
        self.transactions.insert(hash, tx);
        hash
    }
}

impl PoolReader for MemoryPool {
    fn is_in_pool(&self, hash: &TxHash) -> bool {
        self.transactions.contains_key(hash)
    }

    fn find(&self, hash: &TxHash) -> Option<Transaction> {
        self.transactions.get(hash).cloned()
    }

    fn is_spent_in_pool(&self, tx: &Transaction) -> bool {
        self.transactions.values().any(|pooled| {
            pooled.inputs.iter().any(|pooled_input| {
                tx.inputs
                    .iter()
                    .any(|input| input.previous_output == pooled_input.previous_output)
            })
        })
    }
}

/// Script verifier that accepts everything
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAllScripts;

impl ScriptVerifier for AllowAllScripts {
    fn verify(&self, _: &Script, _: &Transaction, _: u32, _: ScriptFlags) -> bool {
        true
    }
}

/// Script verifier that rejects everything
#[derive(Debug, Clone, Copy, Default)]
pub struct DenyAllScripts;

impl ScriptVerifier for DenyAllScripts {
    fn verify(&self, _: &Script, _: &Transaction, _: u32, _: ScriptFlags) -> bool {
        false
    }
}

// ============================================================================
// BUILDERS
// ============================================================================

/// Deterministic, distinct test addresses
pub fn address(tag: u8) -> Address {
    Address::new(format!("M{tag:0>33}"))
}

pub fn etp_output_to(value: Amount, addr: &Address) -> TxOutput {
    TxOutput {
        value,
        script: Script::PayKeyHash {
            address: addr.clone(),
        },
        attachment: Attachment::new(AttachmentPayload::Etp),
    }
}

pub fn etp_output(value: Amount) -> TxOutput {
    etp_output_to(value, &address(0))
}

pub fn input_spending(prev_hash: TxHash, index: u32) -> TxInput {
    TxInput {
        previous_output: OutPoint::new(prev_hash, index),
        script: Script::Input,
    }
}

/// Plain etp transaction spending output 0 of each previous hash
pub fn etp_transaction(prev_hashes: Vec<TxHash>, output_values: Vec<Amount>) -> Transaction {
    Transaction {
        version: tx_version::FIRST,
        inputs: prev_hashes
            .into_iter()
            .map(|hash| input_spending(hash, 0))
            .collect(),
        outputs: output_values.into_iter().map(etp_output).collect(),
        lock_time: 0,
    }
}

pub fn coinbase_transaction(value: Amount) -> Transaction {
    Transaction {
        version: tx_version::FIRST,
        inputs: vec![TxInput {
            previous_output: OutPoint::null(),
            script: Script::Coinbase {
                data: vec![7u8; 16],
            },
        }],
        outputs: vec![etp_output(value)],
        lock_time: 0,
    }
}
