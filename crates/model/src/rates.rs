use cosmwasm_std::{Decimal256, Uint128};
use serde::{Deserialize, Serialize};

use crate::errors::{ModelError, Result};

/// Interest curve attached to a reserve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateModel {
    /// Borrow rate grows linearly with utilization: `u * slope`.
    Proportional { slope: Decimal256 },

    /// Two-slope curve with a kink at `optimal_utilization`.
    Kinked {
        base: Decimal256,
        slope_low: Decimal256,
        slope_high: Decimal256,
        optimal_utilization: Decimal256,
    },
}

impl RateModel {
    pub fn validate(&self) -> Result<()> {
        match self {
            RateModel::Proportional { .. } => Ok(()),
            RateModel::Kinked {
                optimal_utilization,
                ..
            } => {
                if optimal_utilization.is_zero() || *optimal_utilization > Decimal256::one() {
                    return Err(ModelError::InvalidRateModel(format!(
                        "optimal utilization {} outside (0, 1]",
                        optimal_utilization
                    )));
                }
                Ok(())
            }
        }
    }

    /// Borrow rate at the given utilization.
    pub fn borrow_rate(&self, utilization: Decimal256) -> Result<Decimal256> {
        match self {
            RateModel::Proportional { slope } => Ok(utilization.checked_mul(*slope)?),
            RateModel::Kinked {
                base,
                slope_low,
                slope_high,
                optimal_utilization,
            } => {
                if utilization <= *optimal_utilization {
                    let position = utilization
                        .checked_mul(*slope_low)?
                        .checked_div(*optimal_utilization)?;
                    Ok(base.checked_add(position)?)
                } else {
                    let excess = utilization.checked_sub(*optimal_utilization)?;
                    let span = Decimal256::one().checked_sub(*optimal_utilization)?;
                    let position = excess.checked_mul(*slope_high)?.checked_div(span)?;
                    Ok(base.checked_add(*slope_low)?.checked_add(position)?)
                }
            }
        }
    }
}

/// Share of locked liquidity that is lent out. Zero when nothing is locked.
pub fn utilization(debt_total: Uint128, liquidity_total: Uint128) -> Result<Decimal256> {
    let locked = debt_total.checked_add(liquidity_total)?;
    if locked.is_zero() {
        return Ok(Decimal256::zero());
    }
    Ok(Decimal256::from_ratio(debt_total, locked))
}

/// Depositor-side rate: the borrow rate weighted by utilization.
pub fn liquidity_rate(borrow_rate: Decimal256, utilization: Decimal256) -> Result<Decimal256> {
    Ok(borrow_rate.checked_mul(utilization)?)
}
