//! Admission pipeline scenarios
//!
//! End-to-end runs of the validator against in-memory chain and pool state.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc};

use lib_blockchain::constants::{tx_version, COINBASE_MATURITY, NOVA_ACTIVATION_HEIGHT};
use lib_blockchain::transaction::{
    AssetDetail, AssetTransfer, Attachment, AttachmentPayload, DidDetail, DidStatus, OutPoint,
    Transaction, TxOutput,
};
use lib_blockchain::Script;
use lib_mempool::testing::{
    address, coinbase_transaction, etp_output_to, etp_transaction, input_spending,
    AllowAllScripts, DenyAllScripts, MemoryChain, MemoryPool,
};
use lib_mempool::{Accepted, Rejection, TxValidator, ValidateError};
use lib_types::{Address, Amount, TxHash};

fn run(
    chain: MemoryChain,
    pool: MemoryPool,
    tx: Transaction,
) -> Result<Accepted, Rejection> {
    run_with_verifier(chain, pool, tx, true)
}

fn run_with_verifier(
    chain: MemoryChain,
    pool: MemoryPool,
    tx: Transaction,
    allow_scripts: bool,
) -> Result<Accepted, Rejection> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("runtime");
    let validator = if allow_scripts {
        TxValidator::new(Arc::new(chain), Arc::new(pool), Arc::new(AllowAllScripts), tx)
    } else {
        TxValidator::new(Arc::new(chain), Arc::new(pool), Arc::new(DenyAllScripts), tx)
    };
    runtime.block_on(validator.validate())
}

/// Chain with one confirmed etp output of `value` at `addr`, spendable as
/// (hash, 0)
fn chain_with_utxo(value: Amount, addr: Address, height: u64) -> (MemoryChain, TxHash) {
    let mut chain = MemoryChain::new(height + 50);
    let funding = Transaction {
        version: tx_version::FIRST,
        inputs: vec![input_spending(TxHash::new([0xAAu8; 32]), 0)],
        outputs: vec![etp_output_to(value, &addr)],
        lock_time: 0,
    };
    let hash = chain.insert_transaction(funding, height);
    (chain, hash)
}

// ============================================================================
// FEE BOUNDARY (S1)
// ============================================================================

#[test]
fn accepts_fee_exactly_at_minimum() {
    let (chain, funding) = chain_with_utxo(20_000, address(0), 10);
    let tx = etp_transaction(vec![funding], vec![10_000]);

    let accepted = run(chain, MemoryPool::new(), tx).expect("admitted");
    assert!(accepted.unconfirmed_inputs.is_empty());
}

#[test]
fn rejects_fee_one_unit_short() {
    let (chain, funding) = chain_with_utxo(20_000, address(0), 10);
    let tx = etp_transaction(vec![funding], vec![10_001]);

    let rejection = run(chain, MemoryPool::new(), tx).unwrap_err();
    assert_eq!(rejection.error, ValidateError::FeesOutOfRange);
    assert!(rejection.input_indices.is_empty());
}

// ============================================================================
// DOUBLE SPENDS (S2)
// ============================================================================

#[test]
fn rejects_outpoint_spent_on_chain() {
    let (mut chain, funding) = chain_with_utxo(20_000, address(0), 10);
    chain.mark_spent(OutPoint::new(funding, 0));
    let tx = etp_transaction(vec![funding], vec![10_000]);

    let rejection = run(chain, MemoryPool::new(), tx).unwrap_err();
    assert_eq!(rejection.error, ValidateError::DoubleSpend);
    assert!(rejection.input_indices.is_empty());
}

#[test]
fn rejects_outpoint_spent_in_pool() {
    let (chain, funding) = chain_with_utxo(30_000, address(0), 10);

    let mut pool = MemoryPool::new();
    pool.insert(etp_transaction(vec![funding], vec![15_000]));

    let tx = etp_transaction(vec![funding], vec![10_000]);
    let rejection = run(chain, pool, tx).unwrap_err();
    assert_eq!(rejection.error, ValidateError::DoubleSpend);
}

// ============================================================================
// INPUT RESOLUTION (S3)
// ============================================================================

#[test]
fn rejects_unknown_input_with_its_index() {
    let (chain, funding) = chain_with_utxo(20_000, address(0), 10);
    let tx = etp_transaction(vec![funding, TxHash::new([0xEEu8; 32])], vec![10_000]);

    let rejection = run(chain, MemoryPool::new(), tx).unwrap_err();
    assert_eq!(rejection.error, ValidateError::InputNotFound);
    assert_eq!(rejection.input_indices, vec![1]);
}

#[test]
fn accepts_parent_from_pool_and_reports_it_unconfirmed() {
    let (chain, funding) = chain_with_utxo(40_000, address(0), 10);

    let mut pool = MemoryPool::new();
    let pooled = etp_transaction(vec![funding], vec![25_000]);
    let pooled_hash = pool.insert(pooled);

    let tx = etp_transaction(vec![pooled_hash], vec![15_000]);
    let accepted = run(chain, pool, tx).expect("admitted");
    assert_eq!(accepted.unconfirmed_inputs, vec![0]);
}

// ============================================================================
// DUPLICATES
// ============================================================================

#[test]
fn rejects_transaction_already_in_pool() {
    let (chain, funding) = chain_with_utxo(20_000, address(0), 10);
    let tx = etp_transaction(vec![funding], vec![10_000]);

    let mut pool = MemoryPool::new();
    pool.insert(tx.clone());

    let rejection = run(chain, pool, tx).unwrap_err();
    assert_eq!(rejection.error, ValidateError::Duplicate);
}

#[test]
fn rejects_transaction_already_confirmed() {
    let (mut chain, funding) = chain_with_utxo(20_000, address(0), 10);
    let tx = etp_transaction(vec![funding], vec![10_000]);
    chain.insert_transaction(tx.clone(), 42);

    let rejection = run(chain, MemoryPool::new(), tx).unwrap_err();
    assert_eq!(rejection.error, ValidateError::Duplicate);
}

#[test]
fn rejects_coinbase_candidate() {
    let chain = MemoryChain::new(100);
    let rejection = run(chain, MemoryPool::new(), coinbase_transaction(5_000_000)).unwrap_err();
    assert_eq!(rejection.error, ValidateError::CoinbaseTransaction);
}

// ============================================================================
// SCRIPT CONSENSUS
// ============================================================================

#[test]
fn rejects_when_script_verification_fails() {
    let (chain, funding) = chain_with_utxo(20_000, address(0), 10);
    let tx = etp_transaction(vec![funding], vec![10_000]);

    let rejection = run_with_verifier(chain, MemoryPool::new(), tx, false).unwrap_err();
    assert_eq!(rejection.error, ValidateError::ValidateInputsFailed);
    assert_eq!(rejection.input_indices, vec![0]);
}

// ============================================================================
// CALLBACK ENTRY POINT
// ============================================================================

#[test]
fn start_invokes_handler_exactly_once_with_the_verdict() {
    let (chain, funding) = chain_with_utxo(20_000, address(0), 10);
    let tx = etp_transaction(vec![funding], vec![10_000]);

    // what a direct validate() run produces against the same state
    let expected = run(chain.clone(), MemoryPool::new(), tx.clone());

    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("runtime");
    let calls = Arc::new(AtomicUsize::new(0));
    let (sender, receiver) = mpsc::channel();

    runtime.block_on(async {
        let validator = TxValidator::new(
            Arc::new(chain),
            Arc::new(MemoryPool::new()),
            Arc::new(AllowAllScripts),
            tx.clone(),
        );
        let calls = Arc::clone(&calls);
        let handle = validator.start(move |verdict, handled_tx| {
            calls.fetch_add(1, Ordering::SeqCst);
            sender.send((verdict, handled_tx)).expect("deliver verdict");
        });
        handle.await.expect("join spawned run");
    });

    let (verdict, handled_tx) = receiver.recv().expect("handler ran");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(verdict, expected);
    assert_eq!(*handled_tx, tx);
    assert!(receiver.try_recv().is_err(), "handler must fire only once");
}

#[test]
fn start_reports_rejections_through_the_handler() {
    let (chain, funding) = chain_with_utxo(20_000, address(0), 10);
    let tx = etp_transaction(vec![funding], vec![10_001]);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("runtime");
    let (sender, receiver) = mpsc::channel();

    runtime.block_on(async {
        let validator = TxValidator::new(
            Arc::new(chain),
            Arc::new(MemoryPool::new()),
            Arc::new(AllowAllScripts),
            tx,
        );
        let handle =
            validator.start(move |verdict, _| sender.send(verdict).expect("deliver verdict"));
        handle.await.expect("join spawned run");
    });

    let rejection = receiver.recv().expect("handler ran").unwrap_err();
    assert_eq!(rejection.error, ValidateError::FeesOutOfRange);
}

// ============================================================================
// COINBASE MATURITY (S7)
// ============================================================================

fn coinbase_spend_at(tip_gap: u64) -> Result<Accepted, Rejection> {
    let parent_height = 100;
    let mut chain = MemoryChain::new(parent_height + tip_gap);
    let coinbase = coinbase_transaction(1_000_000);
    let coinbase_hash = chain.insert_transaction(coinbase, parent_height);

    let tx = etp_transaction(vec![coinbase_hash], vec![990_000]);
    run(chain, MemoryPool::new(), tx)
}

#[test]
fn rejects_immature_coinbase_spend() {
    let rejection = coinbase_spend_at(COINBASE_MATURITY - 1).unwrap_err();
    assert_eq!(rejection.error, ValidateError::ValidateInputsFailed);
    assert_eq!(rejection.input_indices, vec![0]);
}

#[test]
fn accepts_mature_coinbase_spend() {
    assert!(coinbase_spend_at(COINBASE_MATURITY).is_ok());
}

// ============================================================================
// NOVA VERSION GATE (S8)
// ============================================================================

fn nova_tx_at_height(height: u64) -> Result<Accepted, Rejection> {
    let (mut chain, funding) = chain_with_utxo(20_000, address(0), 10);
    chain.testnet = false;
    chain.last_height = height;

    let mut tx = etp_transaction(vec![funding], vec![10_000]);
    tx.version = tx_version::CHECK_NOVA_FEATURE;
    run(chain, MemoryPool::new(), tx)
}

#[test]
fn rejects_nova_version_at_activation_height() {
    let rejection = nova_tx_at_height(NOVA_ACTIVATION_HEIGHT).unwrap_err();
    assert_eq!(rejection.error, ValidateError::NovaFeatureNotActivated);
}

#[test]
fn accepts_nova_version_above_activation_height() {
    assert!(nova_tx_at_height(NOVA_ACTIVATION_HEIGHT + 1).is_ok());
}

// ============================================================================
// ASSET SCENARIOS (S4, S5)
// ============================================================================

fn asset_issue_tx(symbol: &str, issuer_address: Address, funding: TxHash) -> Transaction {
    let detail = AssetDetail {
        symbol: symbol.to_string(),
        maximum_supply: 1_000_000,
        secondary_issue_threshold: 50,
        issuer: "issuer.did".to_string(),
        address: issuer_address.clone(),
        cert_mask: vec![],
        description: String::new(),
    };
    Transaction {
        version: tx_version::FIRST,
        inputs: vec![input_spending(funding, 0)],
        outputs: vec![
            TxOutput {
                value: 0,
                script: Script::PayKeyHash {
                    address: issuer_address.clone(),
                },
                attachment: Attachment::new(AttachmentPayload::AssetIssue(detail)),
            },
            etp_output_to(990_000, &issuer_address),
        ],
        lock_time: 0,
    }
}

#[test]
fn rejects_issuing_existing_symbol() {
    let issuer = address(1);
    let (mut chain, funding) = chain_with_utxo(1_000_000, issuer.clone(), 10);
    chain.register_asset("ABC", 1_000_000);

    let tx = asset_issue_tx("ABC", issuer, funding);
    let rejection = run(chain, MemoryPool::new(), tx).unwrap_err();
    assert_eq!(rejection.error, ValidateError::AssetExist);
}

#[test]
fn accepts_issuing_fresh_symbol() {
    let issuer = address(1);
    let (chain, funding) = chain_with_utxo(1_000_000, issuer.clone(), 10);

    let tx = asset_issue_tx("ABC", issuer, funding);
    assert!(run(chain, MemoryPool::new(), tx).is_ok());
}

fn secondary_issue_scenario(transfer_volume: Amount) -> Result<Accepted, Rejection> {
    let holder = address(2);
    let mut chain = MemoryChain::new(200);
    chain.register_asset("ABC", 1_000_000);

    // confirmed holding of the asset at the issuing address
    let holding = Transaction {
        version: tx_version::FIRST,
        inputs: vec![input_spending(TxHash::new([0xB0u8; 32]), 0)],
        outputs: vec![TxOutput {
            value: 0,
            script: Script::PayKeyHash {
                address: holder.clone(),
            },
            attachment: Attachment::new(AttachmentPayload::AssetTransfer(AssetTransfer {
                symbol: "ABC".to_string(),
                quantity: transfer_volume,
            })),
        }],
        lock_time: 0,
    };
    let holding_hash = chain.insert_transaction(holding, 20);

    // separate etp output pays the fee
    let fee_funding = Transaction {
        version: tx_version::FIRST,
        inputs: vec![input_spending(TxHash::new([0xB1u8; 32]), 0)],
        outputs: vec![etp_output_to(20_000, &address(3))],
        lock_time: 0,
    };
    let fee_hash = chain.insert_transaction(fee_funding, 21);

    let detail = AssetDetail {
        symbol: "ABC".to_string(),
        maximum_supply: 100_000,
        secondary_issue_threshold: 50,
        issuer: "issuer.did".to_string(),
        address: holder.clone(),
        cert_mask: vec![],
        description: String::new(),
    };

    let tx = Transaction {
        version: tx_version::FIRST,
        inputs: vec![
            input_spending(holding_hash, 0),
            input_spending(fee_hash, 0),
        ],
        outputs: vec![
            TxOutput {
                value: 0,
                script: Script::PayKeyHash {
                    address: holder.clone(),
                },
                attachment: Attachment::new(AttachmentPayload::AssetSecondaryIssue(detail)),
            },
            TxOutput {
                value: 0,
                script: Script::PayKeyHash {
                    address: holder.clone(),
                },
                attachment: Attachment::new(AttachmentPayload::AssetTransfer(AssetTransfer {
                    symbol: "ABC".to_string(),
                    quantity: transfer_volume,
                })),
            },
            etp_output_to(10_000, &holder),
        ],
        lock_time: 0,
    };

    run(chain, MemoryPool::new(), tx)
}

#[test]
fn rejects_secondary_issue_below_threshold() {
    // 40% of the circulating volume against a 50% threshold
    let rejection = secondary_issue_scenario(400_000).unwrap_err();
    assert_eq!(
        rejection.error,
        ValidateError::AssetSecondaryIssueShareNotEnough
    );
}

#[test]
fn accepts_secondary_issue_above_threshold() {
    assert!(secondary_issue_scenario(600_000).is_ok());
}

// ============================================================================
// DID TRANSFER SHAPE (S6)
// ============================================================================

#[test]
fn rejects_did_transfer_with_three_inputs() {
    let old_address = address(4);
    let new_address = address(5);

    let mut chain = MemoryChain::new(300);
    chain.register_did("aliceid", old_address.clone());

    // prior did output for the symbol
    let did_funding = Transaction {
        version: tx_version::FIRST,
        inputs: vec![input_spending(TxHash::new([0xC0u8; 32]), 0)],
        outputs: vec![TxOutput {
            value: 0,
            script: Script::PayKeyHash {
                address: old_address.clone(),
            },
            attachment: Attachment::new(AttachmentPayload::Did(DidDetail {
                symbol: "aliceid".to_string(),
                address: old_address.clone(),
                status: DidStatus::Detail,
            })),
        }],
        lock_time: 0,
    };
    let did_hash = chain.insert_transaction(did_funding, 30);

    let fee_a = Transaction {
        version: tx_version::FIRST,
        inputs: vec![input_spending(TxHash::new([0xC1u8; 32]), 0)],
        outputs: vec![etp_output_to(20_000, &new_address)],
        lock_time: 0,
    };
    let fee_a_hash = chain.insert_transaction(fee_a, 31);

    let fee_b = Transaction {
        version: tx_version::FIRST,
        inputs: vec![input_spending(TxHash::new([0xC2u8; 32]), 0)],
        outputs: vec![etp_output_to(20_000, &new_address)],
        lock_time: 0,
    };
    let fee_b_hash = chain.insert_transaction(fee_b, 32);

    let tx = Transaction {
        version: tx_version::FIRST,
        inputs: vec![
            input_spending(did_hash, 0),
            input_spending(fee_a_hash, 0),
            input_spending(fee_b_hash, 0),
        ],
        outputs: vec![
            TxOutput {
                value: 0,
                script: Script::PayKeyHash {
                    address: new_address.clone(),
                },
                attachment: Attachment::new(AttachmentPayload::Did(DidDetail {
                    symbol: "aliceid".to_string(),
                    address: new_address.clone(),
                    status: DidStatus::Transferable,
                })),
            },
            etp_output_to(20_000, &new_address),
        ],
        lock_time: 0,
    };

    let rejection = run(chain, MemoryPool::new(), tx).unwrap_err();
    assert_eq!(rejection.error, ValidateError::DidInputError);
}

// ============================================================================
// INVARIANTS
// ============================================================================

/// Validating the same tx twice against unchanged state yields the same
/// verdict, code and index list alike.
#[test]
fn invariant_idempotent_verdicts() {
    let (chain, funding) = chain_with_utxo(20_000, address(0), 10);
    let tx = etp_transaction(vec![funding, TxHash::new([0xEEu8; 32])], vec![10_000]);

    let first = run(chain.clone(), MemoryPool::new(), tx.clone()).unwrap_err();
    let second = run(chain, MemoryPool::new(), tx).unwrap_err();
    assert_eq!(first, second);
}

/// An accepted transaction always pays at least the minimum fee out of a
/// value-in within the money range.
#[test]
fn invariant_accepted_fee_is_within_bounds() {
    let (chain, funding) = chain_with_utxo(100_000, address(0), 10);
    let tx = etp_transaction(vec![funding], vec![60_000, 20_000]);

    assert!(run(chain, MemoryPool::new(), tx).is_ok());
    // fee = 100_000 - 80_000 = 20_000 >= MIN_TX_FEE; checked by admission
}

/// Value-in accumulation cannot wrap: a previous output above the money cap
/// fails its input instead of overflowing.
#[test]
fn invariant_overflowing_input_value_rejected() {
    let (chain, funding) = chain_with_utxo(u64::MAX, address(0), 10);
    let tx = etp_transaction(vec![funding], vec![10_000]);

    let rejection = run(chain, MemoryPool::new(), tx).unwrap_err();
    assert_eq!(rejection.error, ValidateError::ValidateInputsFailed);
    assert_eq!(rejection.input_indices, vec![0]);
}
