use cosmwasm_std::Decimal256;

use crate::errors::Result;
use crate::math::SECONDS_PER_YEAR;

/// Linear interest applied to a cumulative index:
/// `index * (1 + rate * elapsed / SECONDS_PER_YEAR)`.
///
/// Zero elapsed time or a zero rate leaves the index untouched.
pub fn applied_linear_interest(
    index: Decimal256,
    rate: Decimal256,
    elapsed: u64,
) -> Result<Decimal256> {
    if elapsed == 0 || rate.is_zero() {
        return Ok(index);
    }
    let time_factor = Decimal256::from_ratio(elapsed, SECONDS_PER_YEAR);
    let accumulated = rate.checked_mul(time_factor)?;
    Ok(index.checked_mul(Decimal256::one().checked_add(accumulated)?)?)
}
