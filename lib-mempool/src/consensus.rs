//! Script Consensus Check
//!
//! Thin adapter over the injected script interpreter. Admission always runs
//! with every verification rule enabled; block validation may pass weaker
//! flag sets.

use tracing::warn;

use lib_blockchain::{Script, ScriptFlags, ScriptVerifier, Transaction};

/// Run the script interpreter for one input under the given flags.
pub fn check_consensus(
    verifier: &dyn ScriptVerifier,
    prev_script: &Script,
    tx: &Transaction,
    input_index: u32,
    flags: ScriptFlags,
) -> bool {
    let valid = verifier.verify(prev_script, tx, input_index, flags);
    if !valid {
        warn!(hash = %tx.hash(), input_index, "invalid transaction script");
    }
    valid
}
