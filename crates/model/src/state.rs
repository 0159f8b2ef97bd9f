use std::collections::BTreeMap;

use cosmwasm_std::{Coin, Uint128};

use crate::errors::{ModelError, Result};
use crate::math::decimal::{scaled_div, scaled_mul};
use crate::reserve::Reserve;

/// Owned snapshot of everything the protocol is expected to hold.
///
/// Every action method runs the same cycle: accrue the reserve to the
/// action's block time, apply the principal and balance movements, recompute
/// rates from the post-action contract balance, and return the reserve as it
/// should now read on chain. A regressed block time fails before any
/// mutation.
#[derive(Debug, Clone, Default)]
pub struct ExpectedState {
    contract_balances: BTreeMap<String, Uint128>,
    user_balances: BTreeMap<String, BTreeMap<String, Uint128>>,
    receipt_balances: BTreeMap<String, BTreeMap<String, Uint128>>,
    user_debts: BTreeMap<String, BTreeMap<String, Uint128>>,
    reserves: BTreeMap<String, Reserve>,
}

impl ExpectedState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_reserve(&mut self, reserve: Reserve) -> Result<()> {
        if self.reserves.contains_key(&reserve.denom) {
            return Err(ModelError::ReserveExists(reserve.denom));
        }
        self.reserves.insert(reserve.denom.clone(), reserve);
        Ok(())
    }

    pub fn reserve(&self, denom: &str) -> Result<&Reserve> {
        self.reserves
            .get(denom)
            .ok_or_else(|| ModelError::UnknownReserve(denom.to_string()))
    }

    pub fn reserves(&self) -> impl Iterator<Item = &Reserve> {
        self.reserves.values()
    }

    pub fn contract_balance(&self, denom: &str) -> Uint128 {
        self.contract_balances
            .get(denom)
            .copied()
            .unwrap_or_default()
    }

    pub fn user_balance(&self, user: &str, denom: &str) -> Uint128 {
        nested_get(&self.user_balances, user, denom)
    }

    /// Scaled receipt-token holdings of `user` in the reserve's maToken.
    pub fn receipt_balance(&self, user: &str, denom: &str) -> Uint128 {
        nested_get(&self.receipt_balances, user, denom)
    }

    /// Scaled debt of `user` against the reserve.
    pub fn user_debt_scaled(&self, user: &str, denom: &str) -> Uint128 {
        nested_get(&self.user_debts, user, denom)
    }

    pub fn set_contract_balance(&mut self, denom: impl Into<String>, amount: Uint128) {
        self.contract_balances.insert(denom.into(), amount);
    }

    pub fn set_user_balance(
        &mut self,
        user: impl Into<String>,
        denom: impl Into<String>,
        amount: Uint128,
    ) {
        nested_set(&mut self.user_balances, user, denom, amount);
    }

    pub fn set_receipt_balance(
        &mut self,
        user: impl Into<String>,
        denom: impl Into<String>,
        amount: Uint128,
    ) {
        nested_set(&mut self.receipt_balances, user, denom, amount);
    }

    pub fn set_user_debt(
        &mut self,
        user: impl Into<String>,
        denom: impl Into<String>,
        amount: Uint128,
    ) {
        nested_set(&mut self.user_debts, user, denom, amount);
    }

    /// Deposit `amount` of native coin, minting scaled receipt tokens at the
    /// post-accrual liquidity index.
    pub fn apply_deposit(
        &mut self,
        user: &str,
        denom: &str,
        amount: Uint128,
        block_time: u64,
    ) -> Result<Reserve> {
        self.reserve_mut(denom)?.accrue(block_time)?;
        let liquidity_index = self.reserve(denom)?.liquidity_index;
        let minted = scaled_div(amount, liquidity_index)?;
        self.debit_user(user, denom, amount)?;
        self.credit_contract(denom, amount)?;
        self.credit_receipt(user, denom, minted)?;
        self.finish(denom)
    }

    /// Burn `burn_scaled` receipt tokens for underlying at the post-accrual
    /// liquidity index.
    pub fn apply_redeem(
        &mut self,
        user: &str,
        denom: &str,
        burn_scaled: Uint128,
        block_time: u64,
    ) -> Result<Reserve> {
        self.reserve_mut(denom)?.accrue(block_time)?;
        let liquidity_index = self.reserve(denom)?.liquidity_index;
        let underlying = scaled_mul(burn_scaled, liquidity_index)?;
        self.debit_receipt(user, denom, burn_scaled)?;
        self.debit_contract(denom, underlying)?;
        self.credit_user(user, denom, underlying)?;
        self.finish(denom)
    }

    /// Borrow `amount`, growing the user's and the reserve's scaled debt at
    /// the post-accrual borrow index.
    pub fn apply_borrow(
        &mut self,
        user: &str,
        denom: &str,
        amount: Uint128,
        block_time: u64,
    ) -> Result<Reserve> {
        self.reserve_mut(denom)?.accrue(block_time)?;
        let borrow_index = self.reserve(denom)?.borrow_index;
        let scaled = scaled_div(amount, borrow_index)?;
        self.credit_debt(user, denom, scaled)?;
        {
            let reserve = self.reserve_mut(denom)?;
            reserve.debt_total_scaled = reserve.debt_total_scaled.checked_add(scaled)?;
        }
        self.debit_contract(denom, amount)?;
        self.credit_user(user, denom, amount)?;
        self.finish(denom)
    }

    /// Repay up to the user's outstanding debt. Payment beyond the debt is
    /// refunded at the post-accrual borrow index, so the scaled debt lands
    /// on exactly zero.
    pub fn apply_repay(
        &mut self,
        user: &str,
        denom: &str,
        amount: Uint128,
        block_time: u64,
    ) -> Result<Reserve> {
        self.reserve_mut(denom)?.accrue(block_time)?;
        let borrow_index = self.reserve(denom)?.borrow_index;
        let debt_scaled = self.user_debt_scaled(user, denom);
        let mut scaled_paid = scaled_div(amount, borrow_index)?;
        let mut refund = Uint128::zero();
        if scaled_paid > debt_scaled {
            let excess = scaled_paid.checked_sub(debt_scaled)?;
            refund = scaled_mul(excess, borrow_index)?;
            scaled_paid = debt_scaled;
        }
        let kept = amount.checked_sub(refund)?;
        self.debit_debt(user, denom, scaled_paid)?;
        {
            let reserve = self.reserve_mut(denom)?;
            reserve.debt_total_scaled = reserve.debt_total_scaled.checked_sub(scaled_paid)?;
        }
        self.debit_user(user, denom, kept)?;
        self.credit_contract(denom, kept)?;
        self.finish(denom)
    }

    /// Deduct a transaction fee from the payer. Fees are chain-level, not
    /// part of any reserve's books.
    pub fn charge_fee(&mut self, user: &str, fee: &Coin) -> Result<()> {
        if fee.amount.is_zero() {
            return Ok(());
        }
        self.debit_user(user, &fee.denom, fee.amount)
    }

    fn reserve_mut(&mut self, denom: &str) -> Result<&mut Reserve> {
        self.reserves
            .get_mut(denom)
            .ok_or_else(|| ModelError::UnknownReserve(denom.to_string()))
    }

    fn finish(&mut self, denom: &str) -> Result<Reserve> {
        let liquidity_total = self.contract_balance(denom);
        let reserve = self.reserve_mut(denom)?;
        reserve.update_rates(liquidity_total)?;
        Ok(reserve.clone())
    }

    fn credit_contract(&mut self, denom: &str, amount: Uint128) -> Result<()> {
        let have = self.contract_balance(denom);
        self.set_contract_balance(denom, have.checked_add(amount)?);
        Ok(())
    }

    fn debit_contract(&mut self, denom: &str, amount: Uint128) -> Result<()> {
        let have = self.contract_balance(denom);
        if have < amount {
            return Err(ModelError::InsufficientBalance {
                owner: "contract".to_string(),
                denom: denom.to_string(),
                have,
                need: amount,
            });
        }
        self.set_contract_balance(denom, have.checked_sub(amount)?);
        Ok(())
    }

    fn credit_user(&mut self, user: &str, denom: &str, amount: Uint128) -> Result<()> {
        let have = self.user_balance(user, denom);
        self.set_user_balance(user, denom, have.checked_add(amount)?);
        Ok(())
    }

    fn debit_user(&mut self, user: &str, denom: &str, amount: Uint128) -> Result<()> {
        let have = self.user_balance(user, denom);
        if have < amount {
            return Err(ModelError::InsufficientBalance {
                owner: user.to_string(),
                denom: denom.to_string(),
                have,
                need: amount,
            });
        }
        self.set_user_balance(user, denom, have.checked_sub(amount)?);
        Ok(())
    }

    fn credit_receipt(&mut self, user: &str, denom: &str, amount: Uint128) -> Result<()> {
        let have = self.receipt_balance(user, denom);
        self.set_receipt_balance(user, denom, have.checked_add(amount)?);
        Ok(())
    }

    fn debit_receipt(&mut self, user: &str, denom: &str, amount: Uint128) -> Result<()> {
        let have = self.receipt_balance(user, denom);
        if have < amount {
            return Err(ModelError::InsufficientBalance {
                owner: user.to_string(),
                denom: denom.to_string(),
                have,
                need: amount,
            });
        }
        self.set_receipt_balance(user, denom, have.checked_sub(amount)?);
        Ok(())
    }

    fn credit_debt(&mut self, user: &str, denom: &str, amount: Uint128) -> Result<()> {
        let have = self.user_debt_scaled(user, denom);
        self.set_user_debt(user, denom, have.checked_add(amount)?);
        Ok(())
    }

    fn debit_debt(&mut self, user: &str, denom: &str, amount: Uint128) -> Result<()> {
        let have = self.user_debt_scaled(user, denom);
        if have < amount {
            return Err(ModelError::InsufficientBalance {
                owner: user.to_string(),
                denom: denom.to_string(),
                have,
                need: amount,
            });
        }
        self.set_user_debt(user, denom, have.checked_sub(amount)?);
        Ok(())
    }
}

fn nested_get(
    map: &BTreeMap<String, BTreeMap<String, Uint128>>,
    outer: &str,
    inner: &str,
) -> Uint128 {
    map.get(outer)
        .and_then(|by_denom| by_denom.get(inner))
        .copied()
        .unwrap_or_default()
}

fn nested_set(
    map: &mut BTreeMap<String, BTreeMap<String, Uint128>>,
    outer: impl Into<String>,
    inner: impl Into<String>,
    amount: Uint128,
) {
    map.entry(outer.into())
        .or_default()
        .insert(inner.into(), amount);
}
