use cosmwasm_std::{Coin, Decimal256};
use serde::{Deserialize, Serialize};

use crate::errors::{HarnessError, Result};

/// Single key/value pair emitted by a contract during execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    pub key: String,
    pub value: String,
}

impl Attribute {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Attributes grouped by the contract that emitted them, in emission order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventGroup {
    pub source: String,
    pub attributes: Vec<Attribute>,
}

/// Outcome of a committed execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Receipt {
    pub height: u64,
    /// Block time of the transaction, in seconds
    pub timestamp: u64,
    /// Fee paid by the sender
    pub fee: Coin,
    pub events: Vec<EventGroup>,
}

impl Receipt {
    /// Last value of `key` among the attributes emitted by `source`. The
    /// last value wins because contracts log post-action state last.
    pub fn attr(&self, source: &str, key: &str) -> Option<&str> {
        self.events
            .iter()
            .filter(|group| group.source == source)
            .flat_map(|group| group.attributes.iter())
            .filter(|attr| attr.key == key)
            .map(|attr| attr.value.as_str())
            .last()
    }

    pub fn required_attr(&self, source: &str, key: &str) -> Result<&str> {
        self.attr(source, key)
            .ok_or_else(|| HarnessError::MissingAttribute {
                source: source.to_string(),
                key: key.to_string(),
            })
    }

    /// Parse a decimal-string attribute such as an index or a rate.
    pub fn decimal_attr(&self, source: &str, key: &str) -> Result<Decimal256> {
        let raw = self.required_attr(source, key)?;
        raw.parse().map_err(|_| {
            HarnessError::DeserializeFailed(format!(
                "attribute {} from {} is not a decimal: {}",
                key, source, raw
            ))
        })
    }
}
