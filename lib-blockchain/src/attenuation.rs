//! Attenuation Model
//!
//! Parameters for outputs that release their asset quantity gradually over a
//! lock period instead of all at once. The script interpreter enforces the
//! release schedule; this module only carries the parameters and their
//! structural validity rules.

use lib_types::Amount;
use serde::{Deserialize, Serialize};

/// Parameters of an attenuation (gradual release) locked output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttenuationModel {
    /// Asset quantity locked under the model
    pub locked_quantity: Amount,
    /// Total lock period in blocks
    pub lock_period: u64,
    /// Number of unlock steps over the period
    pub unlock_number: u64,
}

impl AttenuationModel {
    /// Structural validity, independent of any asset context.
    ///
    /// Every unlock step must release at least one unit, and the period must
    /// be divisible into the declared number of steps.
    pub fn is_well_formed(&self) -> bool {
        self.locked_quantity > 0
            && self.lock_period > 0
            && self.unlock_number > 0
            && self.unlock_number <= self.lock_period
            && self.locked_quantity >= self.unlock_number
    }

    /// Validity against the issuance the model is attached to.
    pub fn check_model_param(&self, maximum_supply: Amount) -> bool {
        self.is_well_formed() && self.locked_quantity <= maximum_supply
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model(locked_quantity: Amount, lock_period: u64, unlock_number: u64) -> AttenuationModel {
        AttenuationModel {
            locked_quantity,
            lock_period,
            unlock_number,
        }
    }

    #[test]
    fn test_well_formed() {
        assert!(model(1000, 100, 10).is_well_formed());
        assert!(!model(0, 100, 10).is_well_formed());
        assert!(!model(1000, 0, 10).is_well_formed());
        assert!(!model(1000, 100, 0).is_well_formed());
        // more steps than blocks
        assert!(!model(1000, 10, 100).is_well_formed());
        // fewer units than steps
        assert!(!model(5, 100, 10).is_well_formed());
    }

    #[test]
    fn test_check_against_supply() {
        assert!(model(1000, 100, 10).check_model_param(1000));
        assert!(!model(1001, 100, 10).check_model_param(1000));
    }
}
