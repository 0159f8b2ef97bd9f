use cosmwasm_std::{Decimal256, Uint128};

use crate::errors::{HarnessError, Result};

/// Context threaded through every comparison of one action cycle, so each
/// mismatch error names the action and reserve it happened under.
pub(crate) struct CompareCtx<'a> {
    pub action: &'a str,
    pub denom: &'a str,
}

impl CompareCtx<'_> {
    pub fn decimals(&self, field: &str, expected: Decimal256, actual: Decimal256) -> Result<()> {
        if expected != actual {
            return Err(self.mismatch(field, expected.to_string(), actual.to_string()));
        }
        Ok(())
    }

    pub fn amounts(&self, field: &str, expected: Uint128, actual: Uint128) -> Result<()> {
        if expected != actual {
            return Err(self.mismatch(field, expected.to_string(), actual.to_string()));
        }
        Ok(())
    }

    pub fn amounts_within(
        &self,
        field: &str,
        expected: Uint128,
        actual: Uint128,
        tolerance: u128,
    ) -> Result<()> {
        if expected.u128().abs_diff(actual.u128()) > tolerance {
            return Err(self.mismatch(field, expected.to_string(), actual.to_string()));
        }
        Ok(())
    }

    pub fn seconds(&self, field: &str, expected: u64, actual: u64) -> Result<()> {
        if expected != actual {
            return Err(self.mismatch(field, expected.to_string(), actual.to_string()));
        }
        Ok(())
    }

    pub fn texts(&self, field: &str, expected: &str, actual: &str) -> Result<()> {
        if expected != actual {
            return Err(self.mismatch(field, expected.to_string(), actual.to_string()));
        }
        Ok(())
    }

    fn mismatch(&self, field: &str, expected: String, actual: String) -> HarnessError {
        HarnessError::StateMismatch {
            action: self.action.to_string(),
            denom: self.denom.to_string(),
            field: field.to_string(),
            expected,
            actual,
        }
    }
}
