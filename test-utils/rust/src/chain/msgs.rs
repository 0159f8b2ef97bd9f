use cosmwasm_std::{Decimal256, Uint128};
use cw20::Cw20ReceiveMsg;
use serde::{Deserialize, Serialize};

/// Execute interface of the liquidity pool contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecuteMsg {
    /// Deposit the attached native coins into the reserve of `denom`
    DepositNative { denom: String },
    /// Borrow `amount` of `denom` against deposited collateral
    BorrowNative { denom: String, amount: Uint128 },
    /// Repay debt in `denom` with the attached coins
    RepayNative { denom: String },
    /// cw20 hook entry point, reached through a maToken `send`
    Receive(Cw20ReceiveMsg),
}

/// Messages embedded in a cw20 `send` to the pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReceiveMsg {
    /// Burn the sent maTokens for their underlying value
    Redeem {},
}

/// Query interface of the liquidity pool contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryMsg {
    Reserve { denom: String },
    ReservesList {},
    Debt { address: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReserveResponse {
    pub ma_token_address: String,
    pub liquidity_index: Decimal256,
    pub borrow_index: Decimal256,
    pub liquidity_rate: Decimal256,
    pub borrow_rate: Decimal256,
    pub borrow_slope: Decimal256,
    pub loan_to_value: Decimal256,
    pub interests_last_updated: u64,
    pub debt_total_scaled: Uint128,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReservesListResponse {
    pub reserves_list: Vec<ReserveInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReserveInfo {
    pub denom: String,
    pub ma_token_address: String,
}

/// Debt of one address across all reserves, in scaled units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebtResponse {
    pub debts: Vec<DebtInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebtInfo {
    pub denom: String,
    /// Scaled amount; multiply by the borrow index for the owed value
    pub amount: Uint128,
}
