pub mod builder;
pub mod chain;
pub mod core;
pub mod errors;
pub mod helpers;
pub mod sim;

pub mod prelude {
    pub use crate::builder::{ReconcilerBuilder, DEFAULT_DEBT_TOLERANCE};
    pub use crate::chain::{smart_query, Attribute, ChainClient, EventGroup, Receipt};
    pub use crate::core::{Action, ActionBuilder, Dispatch, Phase, Reconciler, RejectionInfo};
    pub use crate::errors::*;
    pub use crate::helpers::{assert_close, assert_dec_eq, Assertions};
    pub use crate::sim::{SimChain, SimChainBuilder, EXECUTE_FAILED_CODE};

    pub use cosmwasm_std::{Coin, Decimal256, Uint128};
    pub use model::{ExpectedState, ModelError, RateModel, Reserve};

    /// Time constants for convenience
    pub mod time {
        pub const SECOND: u64 = 1;
        pub const MINUTE: u64 = 60;
        pub const HOUR: u64 = 3600;
        pub const DAY: u64 = 86400;
        pub const WEEK: u64 = 604800;
        pub const YEAR: u64 = 31536000;
    }
}

pub use crate::chain::ChainClient;
pub use crate::core::{Action, Phase, Reconciler};
pub use crate::errors::{HarnessError, Result};
pub use crate::sim::SimChain;
