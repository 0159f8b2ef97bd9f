pub mod errors;
pub mod math;
pub mod rates;
pub mod reserve;
pub mod state;

pub use errors::{ModelError, Result};
pub use rates::RateModel;
pub use reserve::Reserve;
pub use state::ExpectedState;

pub mod prelude {
    pub use crate::errors::{ModelError, Result};
    pub use crate::math::decimal::{scaled_div, scaled_mul};
    pub use crate::math::interest::applied_linear_interest;
    pub use crate::math::SECONDS_PER_YEAR;
    pub use crate::rates::{liquidity_rate, utilization, RateModel};
    pub use crate::reserve::Reserve;
    pub use crate::state::ExpectedState;
}
