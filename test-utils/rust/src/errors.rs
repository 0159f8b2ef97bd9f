use thiserror::Error;

pub type Result<T> = std::result::Result<T, HarnessError>;

/// Framework error types
#[derive(Error, Debug)]
pub enum HarnessError {
    #[error("Execution failed with code {code}: {raw_log}")]
    ExecuteFailed { code: u32, raw_log: String },

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Deserialization failed: {0}")]
    DeserializeFailed(String),

    #[error("Serialization failed: {0}")]
    SerializeFailed(String),

    #[error("Missing event attribute {key} from {source}")]
    MissingAttribute { source: String, key: String },

    #[error("State mismatch on {field} for {denom} after {action}: expected {expected}, actual {actual}")]
    StateMismatch {
        action: String,
        denom: String,
        field: String,
        expected: String,
        actual: String,
    },

    #[error("Unexpected rejection of {action} for {denom} with code {code}: {raw_log}")]
    UnexpectedRejection {
        action: String,
        denom: String,
        code: u32,
        raw_log: String,
    },

    #[error("Missing rejection of {action} for {denom}: expected log containing {fragment:?}")]
    MissingRejection {
        action: String,
        denom: String,
        fragment: String,
    },

    #[error("Reconciler halted by an earlier failure")]
    Halted,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Model error: {0}")]
    Model(#[from] model::ModelError),

    #[error("Custom error: {0}")]
    Custom(String),
}

impl From<serde_json::Error> for HarnessError {
    fn from(err: serde_json::Error) -> Self {
        HarnessError::DeserializeFailed(err.to_string())
    }
}

pub trait ResultExt<T> {
    fn context(self, msg: &str) -> Result<T>;
}

impl<T, E: std::fmt::Display> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, msg: &str) -> Result<T> {
        self.map_err(|e| HarnessError::Custom(format!("{}: {}", msg, e)))
    }
}
