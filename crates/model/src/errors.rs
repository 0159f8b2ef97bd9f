use cosmwasm_std::{
    CheckedFromRatioError, ConversionOverflowError, DivideByZeroError, OverflowError, Uint128,
};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ModelError>;

/// Model error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("non-advancing timestamp for {denom}: last updated at {last}, got {attempted}")]
    OrderingViolation {
        denom: String,
        last: u64,
        attempted: u64,
    },

    #[error("unknown reserve: {0}")]
    UnknownReserve(String),

    #[error("reserve already exists: {0}")]
    ReserveExists(String),

    #[error("insufficient {denom} balance for {owner}: have {have}, need {need}")]
    InsufficientBalance {
        owner: String,
        denom: String,
        have: Uint128,
        need: Uint128,
    },

    #[error("invalid rate model: {0}")]
    InvalidRateModel(String),

    #[error("math overflow: {0}")]
    Overflow(String),
}

impl From<OverflowError> for ModelError {
    fn from(err: OverflowError) -> Self {
        ModelError::Overflow(err.to_string())
    }
}

impl From<DivideByZeroError> for ModelError {
    fn from(err: DivideByZeroError) -> Self {
        ModelError::Overflow(err.to_string())
    }
}

impl From<ConversionOverflowError> for ModelError {
    fn from(err: ConversionOverflowError) -> Self {
        ModelError::Overflow(err.to_string())
    }
}

impl From<CheckedFromRatioError> for ModelError {
    fn from(err: CheckedFromRatioError) -> Self {
        ModelError::Overflow(err.to_string())
    }
}
