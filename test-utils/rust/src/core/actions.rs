use cosmwasm_std::{to_json_binary, Coin, Uint128};
use cw20::Cw20ExecuteMsg;
use serde_json::Value;
use tracing::debug;

use crate::chain::msgs::{ExecuteMsg, ReceiveMsg};
use crate::chain::{ChainClient, Receipt};
use crate::errors::{HarnessError, Result};

/// One protocol action, the unit the reconciler drives and checks.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Deposit { denom: String, amount: Uint128 },
    Redeem { denom: String, burn_scaled: Uint128 },
    Borrow { denom: String, amount: Uint128 },
    Repay { denom: String, amount: Uint128 },
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::Deposit { .. } => "deposit",
            Action::Redeem { .. } => "redeem",
            Action::Borrow { .. } => "borrow",
            Action::Repay { .. } => "repay",
        }
    }

    pub fn denom(&self) -> &str {
        match self {
            Action::Deposit { denom, .. }
            | Action::Redeem { denom, .. }
            | Action::Borrow { denom, .. }
            | Action::Repay { denom, .. } => denom,
        }
    }

    /// Resolve this action into an executable message. Deposits and repays
    /// attach the coins; redeems go through the maToken's cw20 `send` hook,
    /// so `ma_token` must name the reserve's receipt-token contract.
    pub fn dispatch(&self, pool: &str, ma_token: &str) -> Result<Dispatch> {
        match self {
            Action::Deposit { denom, amount } => Ok(Dispatch {
                contract: pool.to_string(),
                msg: serde_json::to_value(ExecuteMsg::DepositNative {
                    denom: denom.clone(),
                })?,
                funds: native_funds(denom, *amount),
            }),
            Action::Redeem { burn_scaled, .. } => {
                let hook = to_json_binary(&ReceiveMsg::Redeem {})
                    .map_err(|e| HarnessError::SerializeFailed(e.to_string()))?;
                Ok(Dispatch {
                    contract: ma_token.to_string(),
                    msg: serde_json::to_value(Cw20ExecuteMsg::Send {
                        contract: pool.to_string(),
                        amount: *burn_scaled,
                        msg: hook,
                    })?,
                    funds: vec![],
                })
            }
            Action::Borrow { denom, amount } => Ok(Dispatch {
                contract: pool.to_string(),
                msg: serde_json::to_value(ExecuteMsg::BorrowNative {
                    denom: denom.clone(),
                    amount: *amount,
                })?,
                funds: vec![],
            }),
            Action::Repay { denom, amount } => Ok(Dispatch {
                contract: pool.to_string(),
                msg: serde_json::to_value(ExecuteMsg::RepayNative {
                    denom: denom.clone(),
                })?,
                funds: native_funds(denom, *amount),
            }),
        }
    }
}

/// The SDK refuses zero coins, so a zero-amount action attaches nothing
/// and lets the contract report the zero.
fn native_funds(denom: &str, amount: Uint128) -> Vec<Coin> {
    if amount.is_zero() {
        vec![]
    } else {
        vec![Coin {
            denom: denom.to_string(),
            amount,
        }]
    }
}

/// Fully-resolved execute call.
#[derive(Debug, Clone, PartialEq)]
pub struct Dispatch {
    pub contract: String,
    pub msg: Value,
    pub funds: Vec<Coin>,
}

/// Details of a rejected execution.
#[derive(Debug, Clone)]
pub struct RejectionInfo {
    pub code: u32,
    pub raw_log: String,
}

impl RejectionInfo {
    /// Check if the raw log contains the expected fragment.
    pub fn contains(&self, fragment: &str) -> bool {
        self.raw_log.contains(fragment)
    }

    pub fn has_code(&self, code: u32) -> bool {
        self.code == code
    }
}

/// Thin executor that submits one dispatch as one transaction.
pub struct ActionBuilder<'c, C: ChainClient> {
    client: &'c mut C,
    sender: Option<String>,
    dispatch: Option<Dispatch>,
}

impl<'c, C: ChainClient> ActionBuilder<'c, C> {
    pub fn new(client: &'c mut C) -> Self {
        Self {
            client,
            sender: None,
            dispatch: None,
        }
    }

    pub fn sender(mut self, sender: impl Into<String>) -> Self {
        self.sender = Some(sender.into());
        self
    }

    pub fn dispatch(mut self, dispatch: Dispatch) -> Self {
        self.dispatch = Some(dispatch);
        self
    }

    pub fn execute(self) -> Result<Receipt> {
        let sender = self
            .sender
            .ok_or_else(|| HarnessError::InvalidConfig("no sender set".to_string()))?;
        let dispatch = self
            .dispatch
            .ok_or_else(|| HarnessError::InvalidConfig("no dispatch set".to_string()))?;
        debug!(%sender, contract = %dispatch.contract, "submitting transaction");
        self.client
            .execute(&sender, &dispatch.contract, &dispatch.msg, &dispatch.funds)
    }
}
