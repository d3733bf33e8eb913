//! Per-Feature Checks
//!
//! One check per asset primitive, each a no-op when the transaction carries
//! no output of the relevant kind. All of them share the same two idioms:
//! a first-set-then-must-agree slot (`check_same`) and a whitelist of
//! companion output kinds every feature tolerates (plain etp and messages).

use std::fmt;

use tracing::debug;

use lib_blockchain::transaction::{Transaction, TxOutput};

use crate::basic::check_transaction_basic;
use crate::chain::ChainReader;
use crate::errors::ValidateResult;

mod asset_issue;
mod cert_issue;
mod did;
mod mit_register;
mod secondary_issue;

pub use asset_issue::check_asset_issue;
pub use cert_issue::check_asset_cert_issue;
pub use did::check_did;
pub use mit_register::check_mit_register;
pub use secondary_issue::check_secondary_issue;

/// Record `value` into an initially-empty slot; once set, every later value
/// must agree.
pub(crate) fn check_same<'a, T>(slot: &mut Option<&'a T>, value: &'a T) -> bool
where
    T: PartialEq + fmt::Display + ?Sized,
{
    match slot {
        None => {
            *slot = Some(value);
            true
        }
        Some(previous) => {
            if *previous == value {
                true
            } else {
                debug!(%previous, %value, "slot mismatch");
                false
            }
        }
    }
}

/// Outputs every feature check tolerates alongside its own kind.
pub(crate) fn is_allowed_companion(output: &TxOutput) -> bool {
    output.is_etp() || output.is_message()
}

/// Full chain-read-only battery: basic checks, then each feature in a fixed
/// order. The first violation wins.
pub fn check_transaction(tx: &Transaction, chain: &dyn ChainReader) -> ValidateResult<()> {
    check_transaction_basic(tx, chain)?;
    check_asset_issue(tx, chain)?;
    check_asset_cert_issue(tx, chain)?;
    check_secondary_issue(tx, chain)?;
    check_mit_register(tx, chain)?;
    check_did(tx, chain)?;
    Ok(())
}
