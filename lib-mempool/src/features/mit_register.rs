//! MIT Registration Check
//!
//! MIT symbols are globally unique. A registration transaction may mint
//! several MITs at once, but all of them must land on the same address and
//! the fee must be paid from that address.

use tracing::debug;

use lib_blockchain::transaction::{Transaction, TxOutput};
use lib_types::Address;

use crate::chain::ChainReader;
use crate::errors::{ValidateError, ValidateResult};
use crate::features::{check_same, is_allowed_companion};

pub fn check_mit_register(tx: &Transaction, chain: &dyn ChainReader) -> ValidateResult<()> {
    if !tx.outputs.iter().any(TxOutput::is_asset_mit_register) {
        return Ok(());
    }

    let mut register_address: Option<&Address> = None;

    for output in &tx.outputs {
        if output.is_asset_mit_register() {
            let Some(mit) = output.mit() else {
                return Err(ValidateError::MitRegisterError);
            };

            if !check_same(&mut register_address, &mit.address) {
                debug!(symbol = %mit.symbol, "register MIT: address is not same");
                return Err(ValidateError::MitExist);
            }

            if chain.get_registered_mit(&mit.symbol).is_some() {
                debug!(symbol = %mit.symbol, "register MIT: already exists");
                return Err(ValidateError::MitExist);
            }
        } else if !is_allowed_companion(output) {
            debug!("register MIT: illegal companion output");
            return Err(ValidateError::MitRegisterError);
        }
    }

    // The fee must come from the registering address.
    for input in &tx.inputs {
        let Some((prev_tx, _)) = chain.get_transaction(&input.previous_output.tx_hash) else {
            return Err(ValidateError::InputNotFound);
        };
        let Some(prev_output) = prev_tx.outputs.get(input.previous_output.index as usize) else {
            return Err(ValidateError::ValidateInputsFailed);
        };

        if prev_output.is_etp() && register_address != prev_output.script_address() {
            debug!("register MIT: invalid input address to pay fee");
            return Err(ValidateError::ValidateInputsFailed);
        }
    }

    Ok(())
}
