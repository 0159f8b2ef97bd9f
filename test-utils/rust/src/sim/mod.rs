//! In-process chain double.
//!
//! [`SimChain`] executes pool messages directly against an owned ledger,
//! charges a flat fee per committed transaction and produces wasmd-shaped
//! receipts and raw logs. Failed transactions roll back completely,
//! including their fee.

mod pool;

use std::collections::BTreeMap;

use chrono::Utc;
use cosmwasm_std::{Coin, Decimal256, Uint128};
use cw20::{BalanceResponse, Cw20ExecuteMsg, Cw20QueryMsg, Cw20ReceiveMsg};
use serde_json::Value;

use model::{RateModel, Reserve};

use crate::chain::msgs::{ExecuteMsg, QueryMsg};
use crate::chain::{Attribute, ChainClient, EventGroup, Receipt};
use crate::errors::{HarnessError, Result};

use pool::PoolContract;

/// ABCI code of x/wasm `ErrExecuteFailed`.
pub const EXECUTE_FAILED_CODE: u32 = 5;

/// Native token ledger.
#[derive(Debug, Clone, Default)]
pub(crate) struct Bank {
    balances: BTreeMap<String, BTreeMap<String, Uint128>>,
}

impl Bank {
    pub fn balance(&self, address: &str, denom: &str) -> Uint128 {
        self.balances
            .get(address)
            .and_then(|held| held.get(denom))
            .copied()
            .unwrap_or_default()
    }

    pub fn set(&mut self, address: &str, denom: &str, amount: Uint128) {
        self.balances
            .entry(address.to_string())
            .or_default()
            .insert(denom.to_string(), amount);
    }

    pub fn credit(
        &mut self,
        address: &str,
        denom: &str,
        amount: Uint128,
    ) -> std::result::Result<(), String> {
        let balance = self
            .balances
            .entry(address.to_string())
            .or_default()
            .entry(denom.to_string())
            .or_default();
        *balance = balance
            .checked_add(amount)
            .map_err(|err| err.to_string())?;
        Ok(())
    }

    pub fn debit(
        &mut self,
        address: &str,
        denom: &str,
        amount: Uint128,
    ) -> std::result::Result<(), String> {
        let have = self.balance(address, denom);
        let remaining = have.checked_sub(amount).map_err(|_| {
            format!(
                "spendable balance {}{} is smaller than {}{}: insufficient funds",
                have, denom, amount, denom
            )
        })?;
        self.set(address, denom, remaining);
        Ok(())
    }

    pub fn transfer(
        &mut self,
        from: &str,
        to: &str,
        denom: &str,
        amount: Uint128,
    ) -> std::result::Result<(), String> {
        self.debit(from, denom, amount)?;
        self.credit(to, denom, amount)
    }
}

/// Deterministic single-node chain stub hosting one pool contract and its
/// maTokens. Time only moves when told to.
#[derive(Debug, Clone)]
pub struct SimChain {
    bank: Bank,
    pool: PoolContract,
    time: u64,
    height: u64,
    fee: Coin,
}

impl SimChain {
    pub fn timestamp(&self) -> u64 {
        self.time
    }

    pub fn height(&self) -> u64 {
        self.height
    }

    pub fn fee(&self) -> &Coin {
        &self.fee
    }

    /// Advance block time by `seconds`.
    pub fn warp_time(&mut self, seconds: u64) {
        self.time = self.time.saturating_add(seconds);
    }

    /// Set block time to an absolute timestamp. May move backwards, which
    /// lets tests produce regressed-clock executions.
    pub fn set_time(&mut self, timestamp: u64) {
        self.time = timestamp;
    }

    pub fn set_price(&mut self, denom: &str, price: Decimal256) {
        self.pool.set_price(denom, price);
    }

    /// Overwrite a native balance behind the pool's back.
    pub fn tamper_native_balance(&mut self, address: &str, denom: &str, amount: Uint128) {
        self.bank.set(address, denom, amount);
    }

    /// Mutate reserve state behind the pool's back. Returns false when the
    /// denom has no reserve.
    pub fn tamper_reserve<F: FnOnce(&mut Reserve)>(&mut self, denom: &str, mutate: F) -> bool {
        match self.pool.reserve_mut(denom) {
            Some(reserve) => {
                mutate(reserve);
                true
            }
            None => false,
        }
    }

    fn route(
        bank: &mut Bank,
        pool: &mut PoolContract,
        sender: &str,
        contract: &str,
        msg: &Value,
        funds: &[Coin],
        time: u64,
    ) -> std::result::Result<Vec<EventGroup>, String> {
        if contract == pool.address {
            for coin in funds {
                bank.transfer(sender, contract, &coin.denom, coin.amount)?;
            }
            let parsed: ExecuteMsg = serde_json::from_value(msg.clone())
                .map_err(|err| format!("failed to parse execute msg: {}", err))?;
            let attributes = pool.execute(bank, sender, parsed, funds, time)?;
            Ok(vec![EventGroup {
                source: contract.to_string(),
                attributes,
            }])
        } else if pool.is_ma_token(contract) {
            if !funds.is_empty() {
                return Err("this contract does not accept funds".to_string());
            }
            let parsed: Cw20ExecuteMsg = serde_json::from_value(msg.clone())
                .map_err(|err| format!("failed to parse cw20 msg: {}", err))?;
            match parsed {
                Cw20ExecuteMsg::Send {
                    contract: recipient,
                    amount,
                    msg: hook,
                } => {
                    if amount.is_zero() {
                        return Err("Invalid zero amount".to_string());
                    }
                    if recipient != pool.address {
                        return Err(format!("contract not found: {}", recipient));
                    }
                    pool.burn(contract, sender, amount)?;
                    let send_attrs = vec![
                        Attribute::new("action", "send"),
                        Attribute::new("from", sender),
                        Attribute::new("to", recipient.as_str()),
                        Attribute::new("amount", amount.to_string()),
                    ];
                    let wrapper = Cw20ReceiveMsg {
                        sender: sender.to_string(),
                        amount,
                        msg: hook,
                    };
                    let pool_attrs =
                        pool.execute(bank, contract, ExecuteMsg::Receive(wrapper), &[], time)?;
                    Ok(vec![
                        EventGroup {
                            source: contract.to_string(),
                            attributes: send_attrs,
                        },
                        EventGroup {
                            source: recipient,
                            attributes: pool_attrs,
                        },
                    ])
                }
                _ => Err("unsupported cw20 message".to_string()),
            }
        } else {
            Err(format!("contract not found: {}", contract))
        }
    }
}

/// wasmd nests the contract error inside the dispatch chain.
fn wrap_log(log: &str) -> String {
    format!(
        "failed to execute message; message index: 0: {}: execute wasm contract failed",
        log
    )
}

impl ChainClient for SimChain {
    fn execute(
        &mut self,
        sender: &str,
        contract: &str,
        msg: &Value,
        funds: &[Coin],
    ) -> Result<Receipt> {
        let mut bank = self.bank.clone();
        let mut pool = self.pool.clone();
        bank.debit(sender, &self.fee.denom, self.fee.amount)
            .map_err(|log| HarnessError::ExecuteFailed {
                code: EXECUTE_FAILED_CODE,
                raw_log: log,
            })?;
        match Self::route(&mut bank, &mut pool, sender, contract, msg, funds, self.time) {
            Ok(events) => {
                self.bank = bank;
                self.pool = pool;
                self.height += 1;
                Ok(Receipt {
                    height: self.height,
                    timestamp: self.time,
                    fee: self.fee.clone(),
                    events,
                })
            }
            Err(log) => Err(HarnessError::ExecuteFailed {
                code: EXECUTE_FAILED_CODE,
                raw_log: wrap_log(&log),
            }),
        }
    }

    fn query(&self, contract: &str, msg: &Value) -> Result<Value> {
        if contract == self.pool.address {
            let parsed: QueryMsg = serde_json::from_value(msg.clone())
                .map_err(|err| HarnessError::QueryFailed(err.to_string()))?;
            self.pool.query(parsed).map_err(HarnessError::QueryFailed)
        } else if self.pool.is_ma_token(contract) {
            let parsed: Cw20QueryMsg = serde_json::from_value(msg.clone())
                .map_err(|err| HarnessError::QueryFailed(err.to_string()))?;
            match parsed {
                Cw20QueryMsg::Balance { address } => {
                    let response = BalanceResponse {
                        balance: self.pool.cw20_balance(contract, &address),
                    };
                    serde_json::to_value(response)
                        .map_err(|err| HarnessError::QueryFailed(err.to_string()))
                }
                _ => Err(HarnessError::QueryFailed(
                    "unsupported cw20 query".to_string(),
                )),
            }
        } else {
            Err(HarnessError::QueryFailed(format!(
                "contract not found: {}",
                contract
            )))
        }
    }

    fn native_balance(&self, address: &str, denom: &str) -> Result<Uint128> {
        Ok(self.bank.balance(address, denom))
    }
}

/// Builder for the sim chain
#[derive(Debug, Clone)]
pub struct SimChainBuilder {
    pool_address: String,
    fee: Coin,
    genesis_time: Option<u64>,
    reserves: Vec<(String, String, RateModel, Decimal256)>,
    balances: Vec<(String, Coin)>,
    prices: Vec<(String, Decimal256)>,
}

impl SimChainBuilder {
    pub fn new(pool_address: impl Into<String>) -> Self {
        Self {
            pool_address: pool_address.into(),
            fee: Coin::new(0, "uluna"),
            genesis_time: None,
            reserves: vec![],
            balances: vec![],
            prices: vec![],
        }
    }

    /// Flat fee charged per committed transaction.
    pub fn with_fee(mut self, fee: Coin) -> Self {
        self.fee = fee;
        self
    }

    /// Genesis block time. Defaults to the wall clock.
    pub fn with_genesis_time(mut self, timestamp: u64) -> Self {
        self.genesis_time = Some(timestamp);
        self
    }

    /// Register a reserve with unit indices at genesis.
    pub fn with_reserve(
        mut self,
        denom: impl Into<String>,
        ma_token: impl Into<String>,
        rate_model: RateModel,
        loan_to_value: Decimal256,
    ) -> Self {
        self.reserves
            .push((denom.into(), ma_token.into(), rate_model, loan_to_value));
        self
    }

    pub fn with_balance(mut self, address: impl Into<String>, coin: Coin) -> Self {
        self.balances.push((address.into(), coin));
        self
    }

    /// Price of a denom in the common unit of account. Defaults to one.
    pub fn with_price(mut self, denom: impl Into<String>, price: Decimal256) -> Self {
        self.prices.push((denom.into(), price));
        self
    }

    pub fn build(self) -> Result<SimChain> {
        let genesis = match self.genesis_time {
            Some(timestamp) => timestamp,
            None => Utc::now().timestamp().max(0) as u64,
        };
        let mut pool = PoolContract::new(self.pool_address);
        for (denom, ma_token, rate_model, loan_to_value) in self.reserves {
            pool.register_reserve(&denom, &ma_token, rate_model, loan_to_value, genesis)
                .map_err(HarnessError::InvalidConfig)?;
        }
        for (denom, price) in self.prices {
            pool.set_price(&denom, price);
        }
        let mut bank = Bank::default();
        for (address, coin) in self.balances {
            bank.credit(&address, &coin.denom, coin.amount)
                .map_err(HarnessError::InvalidConfig)?;
        }
        Ok(SimChain {
            bank,
            pool,
            time: genesis,
            height: 1,
            fee: self.fee,
        })
    }
}
