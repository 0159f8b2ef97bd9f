use cosmwasm_std::{Decimal256, Uint128, Uint256};

use crate::errors::{ModelError, Result};

/// Floor of `amount * dec`, widened through Uint256 so the product of a full
/// u128 and the 18-digit atomics cannot overflow.
pub fn scaled_mul(amount: Uint128, dec: Decimal256) -> Result<Uint128> {
    let raw = Uint256::from(amount)
        .checked_mul(dec.atomics())?
        .checked_div(fractional())?;
    Ok(raw.try_into()?)
}

/// Floor of `amount / dec`, computed as `amount * 10^18 / atomics(dec)` so
/// the truncation happens exactly once.
pub fn scaled_div(amount: Uint128, dec: Decimal256) -> Result<Uint128> {
    if dec.is_zero() {
        return Err(ModelError::Overflow(format!(
            "division of {} by a zero decimal",
            amount
        )));
    }
    let raw = Uint256::from(amount)
        .checked_mul(fractional())?
        .checked_div(dec.atomics())?;
    Ok(raw.try_into()?)
}

fn fractional() -> Uint256 {
    Decimal256::one().atomics()
}
