pub mod decimal;
pub mod interest;

/// Accrual time base: seconds in a 365-day year.
pub const SECONDS_PER_YEAR: u64 = 31_536_000;
