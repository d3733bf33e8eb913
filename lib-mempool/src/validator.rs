//! Admission Validator
//!
//! Decides whether a candidate transaction may enter the pool, relative to
//! the confirmed chain plus the current pool state. One validator instance
//! is created per transaction, mutated only by its own pipeline and
//! discarded on verdict.
//!
//! # Pipeline
//!
//! 1. Chain-read-only battery: basic checks, then each asset feature.
//! 2. Duplicate checks against pool and chain.
//! 3. Pool double-spend check.
//! 4. Per-input resolution in index order: previous transaction from the
//!    confirmed chain, falling back to the pool; `connect_input`; confirmed
//!    double-spend check.
//! 5. Fee tally and per-business conservation checks.
//!
//! Every chain fetch is a suspension point; between them the aggregates are
//! exclusively owned by the in-flight run. Distinct transactions validate
//! concurrently, sharing only the read-only store handles.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use lib_blockchain::constants::{self, COINBASE_MATURITY, MIN_TX_FEE};
use lib_blockchain::symbol;
use lib_blockchain::transaction::{cert, BusinessKind, CertStatus, CertType, Transaction};
use lib_blockchain::{ScriptFlags, ScriptVerifier};
use lib_types::{Amount, BlockHeight, TxHash};

use crate::chain::{ChainReader, SpendState};
use crate::consensus::check_consensus;
use crate::errors::{Rejection, ValidateError};
use crate::features::{check_same, check_transaction};
use crate::pool::PoolReader;

/// Positive verdict: admitted, carrying the indices of inputs whose previous
/// transaction was found only in the pool. Callers use the list to decide
/// staging policy.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Accepted {
    pub unconfirmed_inputs: Vec<u32>,
}

/// Running aggregates, scoped to one validation run
#[derive(Debug, Default)]
struct Aggregates {
    value_in: Amount,
    asset_amount_in: Amount,
    asset_certs_in: Vec<CertType>,
    old_symbol_in: String,
    business_kind_in: BusinessKind,
}

/// Per-transaction admission validator.
///
/// Construct with [`TxValidator::new`] (or [`TxValidator::with_shared`] for
/// an already-shared transaction handle), then either await
/// [`TxValidator::validate`] directly or hand a callback to
/// [`TxValidator::start`].
pub struct TxValidator {
    chain: Arc<dyn ChainReader>,
    pool: Arc<dyn PoolReader>,
    verifier: Arc<dyn ScriptVerifier>,
    tx: Arc<Transaction>,
    tx_hash: TxHash,
}

impl TxValidator {
    pub fn new(
        chain: Arc<dyn ChainReader>,
        pool: Arc<dyn PoolReader>,
        verifier: Arc<dyn ScriptVerifier>,
        tx: Transaction,
    ) -> Self {
        Self::with_shared(chain, pool, verifier, Arc::new(tx))
    }

    pub fn with_shared(
        chain: Arc<dyn ChainReader>,
        pool: Arc<dyn PoolReader>,
        verifier: Arc<dyn ScriptVerifier>,
        tx: Arc<Transaction>,
    ) -> Self {
        let tx_hash = tx.hash();
        Self {
            chain,
            pool,
            verifier,
            tx,
            tx_hash,
        }
    }

    /// Spawn the run and invoke `handler` exactly once with the verdict.
    pub fn start<H>(self, handler: H) -> JoinHandle<()>
    where
        H: FnOnce(Result<Accepted, Rejection>, Arc<Transaction>) + Send + 'static,
    {
        tokio::spawn(async move {
            let tx = Arc::clone(&self.tx);
            let verdict = self.validate().await;
            handler(verdict, tx);
        })
    }

    fn is_standard(&self) -> bool {
        true
    }

    /// Run the full admission pipeline to a verdict.
    pub async fn validate(self) -> Result<Accepted, Rejection> {
        let tx = Arc::clone(&self.tx);

        check_transaction(&tx, self.chain.as_ref()).map_err(Rejection::new)?;

        // This should probably precede check_transaction.
        if tx.is_coinbase() {
            return Err(Rejection::new(ValidateError::CoinbaseTransaction));
        }

        if !self.is_standard() {
            return Err(Rejection::new(ValidateError::IsNotStandard));
        }

        if self.pool.is_in_pool(&self.tx_hash) {
            return Err(Rejection::new(ValidateError::Duplicate));
        }

        // TODO: relax to unspent-duplicates-only once the store can answer
        // fetch_unspent_transaction (BIP30). Until then any prior occurrence
        // of the hash is a duplicate, store errors included.
        if !matches!(self.chain.fetch_transaction(&self.tx_hash).await, Ok(None)) {
            return Err(Rejection::new(ValidateError::Duplicate));
        }

        if self.pool.is_spent_in_pool(&tx) {
            return Err(Rejection::new(ValidateError::DoubleSpend));
        }

        // Used for checking coinbase maturity
        let last_block_height = self
            .chain
            .fetch_last_height()
            .await
            .map_err(|err| Rejection::new(err.into()))?;

        let mut aggregates = Aggregates::default();
        let mut unconfirmed = Vec::new();

        for (index, input) in tx.inputs.iter().enumerate() {
            let input_index = index as u32;
            let prev_hash = &input.previous_output.tx_hash;

            // The confirmed chain first, the pool as fallback.
            let (previous_tx, parent_height, from_pool) =
                match self.chain.fetch_transaction_index(prev_hash).await {
                    Ok(Some(parent_height)) => {
                        match self.chain.fetch_transaction(prev_hash).await {
                            Ok(Some(previous_tx)) => (previous_tx, parent_height, false),
                            _ => {
                                return Err(Rejection::at_input(
                                    ValidateError::InputNotFound,
                                    input_index,
                                ))
                            }
                        }
                    }
                    _ => match self.pool.find(prev_hash) {
                        // pool transactions cannot be coinbase, so the parent
                        // height never reaches the maturity check
                        Some(previous_tx) => (previous_tx, 0, true),
                        None => {
                            return Err(Rejection::at_input(
                                ValidateError::InputNotFound,
                                input_index,
                            ))
                        }
                    },
                };

            if !self.connect_input(
                &tx,
                index,
                &previous_tx,
                parent_height,
                last_block_height,
                &mut aggregates,
            ) {
                info!(input_index, "connect_input failed");
                return Err(Rejection::at_input(
                    ValidateError::ValidateInputsFailed,
                    input_index,
                ));
            }

            match self.chain.fetch_spend(&input.previous_output).await {
                Ok(SpendState::Unspent) => {}
                _ => return Err(Rejection::new(ValidateError::DoubleSpend)),
            }

            if from_pool {
                unconfirmed.push(input_index);
            }
        }

        self.check_fees(&tx, &aggregates)?;

        Ok(Accepted {
            unconfirmed_inputs: unconfirmed,
        })
    }

    /// Connect one input against its resolved previous output, updating the
    /// aggregates. Any violation fails the whole input.
    fn connect_input(
        &self,
        tx: &Transaction,
        current_input: usize,
        previous_tx: &Transaction,
        parent_height: BlockHeight,
        last_block_height: BlockHeight,
        aggregates: &mut Aggregates,
    ) -> bool {
        let previous_outpoint = &tx.inputs[current_input].previous_output;

        let Some(previous_output) = previous_tx.outputs.get(previous_outpoint.index as usize)
        else {
            debug!("output point index out of bounds");
            return false;
        };

        let output_value = previous_output.value;
        if output_value > constants::max_money() {
            debug!("output etp value exceeds max amount");
            return false;
        }

        let mut asset_cert_in: Option<CertType> = None;
        let mut asset_transfer_amount: Amount = 0;
        let mut new_symbol_in = "";

        if previous_output.is_asset() {
            asset_transfer_amount = previous_output.asset_amount();

            new_symbol_in = previous_output.asset_symbol().unwrap_or_default();
            if !new_symbol_in.is_empty() {
                if aggregates.old_symbol_in.is_empty() {
                    aggregates.old_symbol_in = new_symbol_in.to_string();
                } else if aggregates.old_symbol_in != new_symbol_in {
                    // different asset symbols in one transaction
                    return false;
                }
            }

            if previous_output.is_asset_issue() || previous_output.is_asset_secondaryissue() {
                aggregates.business_kind_in = BusinessKind::AssetIssue;
            } else if previous_output.is_asset_transfer() {
                aggregates.business_kind_in = BusinessKind::DidTransfer;
            }
        } else if let Some(cert_info) = previous_output.asset_cert() {
            aggregates.business_kind_in = BusinessKind::AssetCert;
            new_symbol_in = cert_info.symbol.as_str();

            if aggregates.old_symbol_in.is_empty() {
                aggregates.old_symbol_in = new_symbol_in.to_string();
            } else if cert::has_cert(&aggregates.asset_certs_in, CertType::Domain) {
                // a domain cert in hand authorizes cert operations on the
                // sub-symbols of its domain
                if symbol::domain_of(&aggregates.old_symbol_in) != Some(cert_info.symbol.as_str())
                {
                    return false;
                }
            } else if aggregates.old_symbol_in != new_symbol_in {
                return false;
            }

            if cert::has_cert(&aggregates.asset_certs_in, cert_info.cert_type) {
                // double certs exist
                return false;
            }
            asset_cert_in = Some(cert_info.cert_type);
        } else if previous_output.is_asset_mit() {
            aggregates.business_kind_in = BusinessKind::AssetMit;

            new_symbol_in = previous_output.asset_symbol().unwrap_or_default();
            if aggregates.old_symbol_in.is_empty() {
                aggregates.old_symbol_in = new_symbol_in.to_string();
            } else if aggregates.old_symbol_in != new_symbol_in {
                return false;
            }
        } else if previous_output.is_did() {
            new_symbol_in = previous_output.did_symbol().unwrap_or_default();
            if !new_symbol_in.is_empty() {
                if aggregates.old_symbol_in.is_empty() {
                    aggregates.old_symbol_in = new_symbol_in.to_string();
                } else if aggregates.old_symbol_in != new_symbol_in {
                    // different did symbols in one transaction
                    return false;
                }
            }

            if previous_output.is_did_register() {
                aggregates.business_kind_in = BusinessKind::DidRegister;
            } else if previous_output.is_did_transfer() {
                aggregates.business_kind_in = BusinessKind::DidTransfer;
            }
        }

        if previous_tx.is_coinbase() {
            let height_difference = last_block_height.saturating_sub(parent_height);
            if height_difference < COINBASE_MATURITY {
                return false;
            }
        }

        // check forbidden symbol
        if previous_output.is_asset() && symbol::is_forbidden(new_symbol_in) {
            return false;
        }

        if !check_consensus(
            self.verifier.as_ref(),
            &previous_output.script,
            tx,
            current_input as u32,
            ScriptFlags::all_enabled(),
        ) {
            debug!("check_consensus failed");
            return false;
        }

        aggregates.value_in = aggregates.value_in.saturating_add(output_value);
        aggregates.asset_amount_in = aggregates
            .asset_amount_in
            .saturating_add(asset_transfer_amount);
        if let Some(cert_type) = asset_cert_in {
            aggregates.asset_certs_in.push(cert_type);
        }
        aggregates.value_in <= constants::max_money()
    }

    /// Fee tally plus the conservation checks keyed on the latched business
    /// kind.
    fn check_fees(&self, tx: &Transaction, aggregates: &Aggregates) -> Result<(), Rejection> {
        if !tally_fees(tx, aggregates.value_in) {
            return Err(Rejection::new(ValidateError::FeesOutOfRange));
        }

        let is_asset_kind = matches!(
            aggregates.business_kind_in,
            BusinessKind::AssetIssue | BusinessKind::AssetTransfer
        );
        if is_asset_kind {
            if tx.has_asset_transfer() {
                if !check_asset_amount(tx, aggregates) {
                    return Err(Rejection::new(ValidateError::AssetAmountNotEqual));
                }
                if !check_asset_symbol(tx, aggregates) {
                    return Err(Rejection::new(ValidateError::AssetSymbolNotMatch));
                }
            }
        } else if aggregates.business_kind_in == BusinessKind::AssetCert {
            if !check_asset_certs(tx, aggregates) {
                debug!("failed to check asset cert");
                return Err(Rejection::new(ValidateError::AssetCertError));
            }
        } else if aggregates.business_kind_in == BusinessKind::AssetMit {
            if !check_asset_mit(tx, aggregates) {
                debug!("failed to check MIT token");
                return Err(Rejection::new(ValidateError::MitError));
            }
        }

        let is_did_kind = matches!(
            aggregates.business_kind_in,
            BusinessKind::DidRegister | BusinessKind::DidTransfer
        );
        if is_did_kind && tx.has_did_transfer() && !check_did_symbol_match(tx, aggregates) {
            return Err(Rejection::new(ValidateError::DidSymbolNotMatch));
        }

        Ok(())
    }
}

/// Fee rule: `value_in - value_out` must be at least the minimum fee and
/// within the money range.
fn tally_fees(tx: &Transaction, value_in: Amount) -> bool {
    let value_out = tx.total_output_value();

    if value_in < value_out {
        return false;
    }

    let fee = value_in - value_out;
    if fee < MIN_TX_FEE {
        return false;
    }
    fee <= constants::max_money()
}

/// Asset amounts of inputs and outputs must be equal.
fn check_asset_amount(tx: &Transaction, aggregates: &Aggregates) -> bool {
    aggregates.asset_amount_in == tx.total_output_transfer_amount()
}

/// All output asset symbols must agree with each other and with the inputs.
fn check_asset_symbol(tx: &Transaction, aggregates: &Aggregates) -> bool {
    let mut old_symbol: Option<&str> = None;
    for output in &tx.outputs {
        if let Some(new_symbol) = output.asset_symbol() {
            if !new_symbol.is_empty() && !check_same(&mut old_symbol, new_symbol) {
                // different assets in outputs
                return false;
            }
        }
    }
    old_symbol.unwrap_or_default() == aggregates.old_symbol_in
}

/// Output certs must reproduce the input cert multiset, under the
/// domain-cert relaxation, with no duplicates; a cert hand-over moves
/// exactly one cert.
fn check_asset_certs(tx: &Transaction, aggregates: &Aggregates) -> bool {
    let mut is_cert_transfer = false;
    let mut certs_out: Vec<CertType> = Vec::new();

    for output in &tx.outputs {
        if let Some(cert_info) = output.asset_cert() {
            if cert_info.status == CertStatus::Transfer {
                is_cert_transfer = true;
            }

            if cert::has_cert(&certs_out, cert_info.cert_type) {
                // double certs exist
                return false;
            }

            if cert::has_cert(&aggregates.asset_certs_in, CertType::Domain) {
                match symbol::domain_of(&cert_info.symbol) {
                    Some(domain) if domain == aggregates.old_symbol_in => {}
                    _ => return false,
                }
            } else if aggregates.old_symbol_in != cert_info.symbol {
                return false;
            }

            certs_out.push(cert_info.cert_type);
        } else if output.asset_symbol().is_some() {
            // asset outputs may travel alongside their certs
            continue;
        } else if !output.is_etp() && !output.is_message() {
            return false;
        }
    }

    if is_cert_transfer {
        if aggregates.asset_certs_in.len() != 1 {
            debug!(
                count = aggregates.asset_certs_in.len(),
                "transfer cert: invalid number of certs in inputs"
            );
            return false;
        }
        if certs_out.len() != 1 {
            debug!(
                count = certs_out.len(),
                "transfer cert: invalid number of certs in outputs"
            );
            return false;
        }
    }

    cert::test_certs(&certs_out, &aggregates.asset_certs_in)
}

/// Exactly one MIT moves, and its symbol must match the inputs.
fn check_asset_mit(tx: &Transaction, aggregates: &Aggregates) -> bool {
    let mut num_mit = 0usize;
    for output in &tx.outputs {
        if output.is_asset_mit_transfer() {
            num_mit += 1;
            if num_mit > 1 {
                return false;
            }

            let Some(mit) = output.mit() else {
                return false;
            };
            if aggregates.old_symbol_in != mit.symbol {
                return false;
            }
        } else if !output.is_etp() && !output.is_message() {
            return false;
        }
    }

    num_mit == 1
}

/// All output DID symbols must agree with each other and with the inputs.
fn check_did_symbol_match(tx: &Transaction, aggregates: &Aggregates) -> bool {
    let mut old_symbol: Option<&str> = None;
    for output in &tx.outputs {
        if let Some(new_symbol) = output.did_symbol() {
            if !new_symbol.is_empty() && !check_same(&mut old_symbol, new_symbol) {
                // different dids in outputs
                return false;
            }
        }
    }
    old_symbol.unwrap_or_default() == aggregates.old_symbol_in
}
