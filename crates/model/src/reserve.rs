use cosmwasm_std::{Decimal256, Uint128};
use serde::{Deserialize, Serialize};

use crate::errors::{ModelError, Result};
use crate::math::decimal::scaled_mul;
use crate::math::interest::applied_linear_interest;
use crate::rates::{self, RateModel};

/// Expected per-denom reserve state.
///
/// Both indices start at one and never decrease. Actual owed debt is
/// `debt_total_scaled * borrow_index`, truncated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reserve {
    /// Native denom of the reserve
    pub denom: String,
    /// Receipt-token contract backing deposits in this reserve
    pub ma_token_address: String,
    /// Cumulative deposit interest index
    pub liquidity_index: Decimal256,
    /// Cumulative borrow interest index
    pub borrow_index: Decimal256,
    /// Depositor rate, recomputed after every action
    pub liquidity_rate: Decimal256,
    /// Borrower rate, recomputed after every action
    pub borrow_rate: Decimal256,
    /// Total debt in scaled units
    pub debt_total_scaled: Uint128,
    /// Max borrowable value per unit of collateral value
    pub loan_to_value: Decimal256,
    /// Interest curve for this reserve
    pub rate_model: RateModel,
    /// Seconds timestamp of the last accrual, forward-only
    pub interests_last_updated: u64,
}

impl Reserve {
    pub fn new(
        denom: impl Into<String>,
        ma_token_address: impl Into<String>,
        rate_model: RateModel,
        loan_to_value: Decimal256,
        created_at: u64,
    ) -> Result<Self> {
        rate_model.validate()?;
        Ok(Self {
            denom: denom.into(),
            ma_token_address: ma_token_address.into(),
            liquidity_index: Decimal256::one(),
            borrow_index: Decimal256::one(),
            liquidity_rate: Decimal256::zero(),
            borrow_rate: Decimal256::zero(),
            debt_total_scaled: Uint128::zero(),
            loan_to_value,
            rate_model,
            interests_last_updated: created_at,
        })
    }

    /// Advance both indices to `block_time` using the rates in force before
    /// the action. A same-second action accrues nothing; a regressed
    /// timestamp fails before touching any state.
    pub fn accrue(&mut self, block_time: u64) -> Result<()> {
        if block_time < self.interests_last_updated {
            return Err(ModelError::OrderingViolation {
                denom: self.denom.clone(),
                last: self.interests_last_updated,
                attempted: block_time,
            });
        }
        let elapsed = block_time - self.interests_last_updated;
        if elapsed > 0 {
            self.liquidity_index =
                applied_linear_interest(self.liquidity_index, self.liquidity_rate, elapsed)?;
            self.borrow_index =
                applied_linear_interest(self.borrow_index, self.borrow_rate, elapsed)?;
            self.interests_last_updated = block_time;
        }
        Ok(())
    }

    /// Recompute both rates from current debt and the post-action contract
    /// balance.
    pub fn update_rates(&mut self, liquidity_total: Uint128) -> Result<()> {
        let debt_total = self.debt_total()?;
        let utilization = rates::utilization(debt_total, liquidity_total)?;
        self.borrow_rate = self.rate_model.borrow_rate(utilization)?;
        self.liquidity_rate = rates::liquidity_rate(self.borrow_rate, utilization)?;
        Ok(())
    }

    /// Owed debt in underlying units.
    pub fn debt_total(&self) -> Result<Uint128> {
        scaled_mul(self.debt_total_scaled, self.borrow_index)
    }

    /// Both indices as they would read at `block_time`, without mutating.
    /// Returns `(liquidity_index, borrow_index)`.
    pub fn projected_indices(&self, block_time: u64) -> Result<(Decimal256, Decimal256)> {
        if block_time < self.interests_last_updated {
            return Err(ModelError::OrderingViolation {
                denom: self.denom.clone(),
                last: self.interests_last_updated,
                attempted: block_time,
            });
        }
        let elapsed = block_time - self.interests_last_updated;
        Ok((
            applied_linear_interest(self.liquidity_index, self.liquidity_rate, elapsed)?,
            applied_linear_interest(self.borrow_index, self.borrow_rate, elapsed)?,
        ))
    }
}
