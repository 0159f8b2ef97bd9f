use cosmwasm_std::{Coin, Uint128};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::chain::receipt::Receipt;
use crate::errors::{HarnessError, Result};

/// Execution surface of a chain hosting the pool.
///
/// Implementations submit one message per transaction and either return the
/// receipt of a committed transaction or surface the failure code and raw
/// log. There is no retry at this layer.
pub trait ChainClient {
    /// Execute `msg` on `contract` as `sender`, attaching `funds`.
    fn execute(
        &mut self,
        sender: &str,
        contract: &str,
        msg: &Value,
        funds: &[Coin],
    ) -> Result<Receipt>;

    /// Run a smart query against `contract`.
    fn query(&self, contract: &str, msg: &Value) -> Result<Value>;

    /// Native bank balance of `address` in `denom`.
    fn native_balance(&self, address: &str, denom: &str) -> Result<Uint128>;
}

/// Serialize `msg`, query `contract` and deserialize the response.
pub fn smart_query<C, Q, R>(client: &C, contract: &str, msg: &Q) -> Result<R>
where
    C: ChainClient + ?Sized,
    Q: Serialize,
    R: DeserializeOwned,
{
    let raw = serde_json::to_value(msg).map_err(|e| HarnessError::SerializeFailed(e.to_string()))?;
    let response = client.query(contract, &raw)?;
    serde_json::from_value(response).map_err(|e| HarnessError::DeserializeFailed(e.to_string()))
}
