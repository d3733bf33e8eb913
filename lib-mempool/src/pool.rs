//! Mempool Interface
//!
//! Read-only view of the unconfirmed pool. Unlike the chain interface this
//! one is synchronous: the pool index lives in memory.

use lib_blockchain::transaction::Transaction;
use lib_types::TxHash;

/// Read-only access to the unconfirmed transaction pool
pub trait PoolReader: Send + Sync {
    /// Whether a transaction with this hash is already pooled
    fn is_in_pool(&self, hash: &TxHash) -> bool;

    /// Fetch a pooled transaction by hash
    fn find(&self, hash: &TxHash) -> Option<Transaction>;

    /// Whether any pooled transaction already spends one of `tx`'s inputs
    fn is_spent_in_pool(&self, tx: &Transaction) -> bool;
}
