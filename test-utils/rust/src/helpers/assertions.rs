use cosmwasm_std::{Decimal256, Uint128};

use crate::chain::ChainClient;
use crate::core::Reconciler;

/// Assert two amounts agree within an absolute tolerance in base units.
pub fn assert_close(actual: Uint128, expected: Uint128, tolerance: u128, label: &str) {
    let delta = actual.u128().abs_diff(expected.u128());
    assert!(
        delta <= tolerance,
        "{} is off by {} base units.\nExpected:  {}\nActual:    {}\nTolerance: {}",
        label,
        delta,
        expected,
        actual,
        tolerance
    );
}

/// Assert a decimal renders exactly as `expected`.
pub fn assert_dec_eq(actual: Decimal256, expected: &str, label: &str) {
    let rendered = actual.to_string();
    assert_eq!(
        rendered, expected,
        "{} mismatch.\nExpected: {}\nActual:   {}",
        label, expected, rendered
    );
}

/// Assertion surface over the engine's expected state
pub trait Assertions {
    /// Assert a user's native balance in the expected state
    fn assert_user_balance(&self, user: &str, denom: &str, expected: u128);

    /// Assert the pool's native balance in the expected state
    fn assert_contract_balance(&self, denom: &str, expected: u128);

    /// Assert a user's maToken balance in the expected state
    fn assert_receipt_balance(&self, user: &str, denom: &str, expected: u128);

    /// Assert a user's scaled debt in the expected state
    fn assert_debt_scaled(&self, user: &str, denom: &str, expected: u128);

    /// Assert both reserve rates by their canonical rendering
    fn assert_rates(&self, denom: &str, borrow_rate: &str, liquidity_rate: &str);

    /// Assert both reserve indices by their canonical rendering
    fn assert_indices(&self, denom: &str, liquidity_index: &str, borrow_index: &str);
}

impl<C: ChainClient> Assertions for Reconciler<C> {
    fn assert_user_balance(&self, user: &str, denom: &str, expected: u128) {
        let actual = self.expected().user_balance(user, denom);
        assert_eq!(
            actual,
            Uint128::new(expected),
            "{} balance mismatch for {}.\nExpected: {}\nActual:   {}",
            denom,
            user,
            expected,
            actual
        );
    }

    fn assert_contract_balance(&self, denom: &str, expected: u128) {
        let actual = self.expected().contract_balance(denom);
        assert_eq!(
            actual,
            Uint128::new(expected),
            "{} pool balance mismatch.\nExpected: {}\nActual:   {}",
            denom,
            expected,
            actual
        );
    }

    fn assert_receipt_balance(&self, user: &str, denom: &str, expected: u128) {
        let actual = self.expected().receipt_balance(user, denom);
        assert_eq!(
            actual,
            Uint128::new(expected),
            "{} receipt token balance mismatch for {}.\nExpected: {}\nActual:   {}",
            denom,
            user,
            expected,
            actual
        );
    }

    fn assert_debt_scaled(&self, user: &str, denom: &str, expected: u128) {
        let actual = self.expected().user_debt_scaled(user, denom);
        assert_eq!(
            actual,
            Uint128::new(expected),
            "{} scaled debt mismatch for {}.\nExpected: {}\nActual:   {}",
            denom,
            user,
            expected,
            actual
        );
    }

    fn assert_rates(&self, denom: &str, borrow_rate: &str, liquidity_rate: &str) {
        let reserve = self
            .expected()
            .reserve(denom)
            .unwrap_or_else(|err| panic!("no reserve to assert on: {}", err));
        assert_dec_eq(
            reserve.borrow_rate,
            borrow_rate,
            &format!("{} borrow rate", denom),
        );
        assert_dec_eq(
            reserve.liquidity_rate,
            liquidity_rate,
            &format!("{} liquidity rate", denom),
        );
    }

    fn assert_indices(&self, denom: &str, liquidity_index: &str, borrow_index: &str) {
        let reserve = self
            .expected()
            .reserve(denom)
            .unwrap_or_else(|err| panic!("no reserve to assert on: {}", err));
        assert_dec_eq(
            reserve.liquidity_index,
            liquidity_index,
            &format!("{} liquidity index", denom),
        );
        assert_dec_eq(
            reserve.borrow_index,
            borrow_index,
            &format!("{} borrow index", denom),
        );
    }
}
