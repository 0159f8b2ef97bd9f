use std::collections::BTreeMap;

use cosmwasm_std::{from_json, Coin, Decimal256, Uint128};
use serde_json::Value;

use model::math::decimal::{scaled_div, scaled_mul};
use model::{RateModel, Reserve};

use crate::chain::msgs::{
    DebtInfo, DebtResponse, ExecuteMsg, QueryMsg, ReceiveMsg, ReserveInfo, ReserveResponse,
    ReservesListResponse,
};
use crate::chain::Attribute;
use crate::sim::Bank;

fn math<T>(result: model::Result<T>) -> Result<T, String> {
    result.map_err(|err| err.to_string())
}

/// In-process rendition of the liquidity pool contract, including the
/// maToken ledgers it controls. Handlers return raw logs on failure so the
/// chain wrapper can wrap them the way wasmd does.
#[derive(Debug, Clone)]
pub(crate) struct PoolContract {
    pub address: String,
    reserves: BTreeMap<String, Reserve>,
    // user -> denom -> scaled debt
    debts: BTreeMap<String, BTreeMap<String, Uint128>>,
    // ma token -> holder -> balance
    ma_balances: BTreeMap<String, BTreeMap<String, Uint128>>,
    // ma token -> underlying denom
    ma_denoms: BTreeMap<String, String>,
    prices: BTreeMap<String, Decimal256>,
}

impl PoolContract {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            reserves: BTreeMap::new(),
            debts: BTreeMap::new(),
            ma_balances: BTreeMap::new(),
            ma_denoms: BTreeMap::new(),
            prices: BTreeMap::new(),
        }
    }

    pub fn register_reserve(
        &mut self,
        denom: &str,
        ma_token: &str,
        rate_model: RateModel,
        loan_to_value: Decimal256,
        time: u64,
    ) -> Result<(), String> {
        if self.reserves.contains_key(denom) {
            return Err(format!("reserve already exists: {}", denom));
        }
        let reserve =
            math(Reserve::new(denom, ma_token, rate_model, loan_to_value, time))?;
        self.reserves.insert(denom.to_string(), reserve);
        self.ma_denoms
            .insert(ma_token.to_string(), denom.to_string());
        Ok(())
    }

    pub fn set_price(&mut self, denom: &str, price: Decimal256) {
        self.prices.insert(denom.to_string(), price);
    }

    pub fn reserve_mut(&mut self, denom: &str) -> Option<&mut Reserve> {
        self.reserves.get_mut(denom)
    }

    pub fn is_ma_token(&self, address: &str) -> bool {
        self.ma_denoms.contains_key(address)
    }

    pub fn cw20_balance(&self, token: &str, holder: &str) -> Uint128 {
        self.ma_balances
            .get(token)
            .and_then(|holders| holders.get(holder))
            .copied()
            .unwrap_or_default()
    }

    pub fn burn(&mut self, token: &str, holder: &str, amount: Uint128) -> Result<(), String> {
        let balance = self.cw20_balance(token, holder);
        let remaining = balance
            .checked_sub(amount)
            .map_err(|_| "Cannot Sub with given operands".to_string())?;
        self.ma_balances
            .entry(token.to_string())
            .or_default()
            .insert(holder.to_string(), remaining);
        Ok(())
    }

    pub fn execute(
        &mut self,
        bank: &mut Bank,
        sender: &str,
        msg: ExecuteMsg,
        funds: &[Coin],
        time: u64,
    ) -> Result<Vec<Attribute>, String> {
        match msg {
            ExecuteMsg::DepositNative { denom } => {
                let amount = coin_amount(funds, &denom);
                self.deposit(bank, sender, &denom, amount, time)
            }
            ExecuteMsg::BorrowNative { denom, amount } => {
                self.borrow(bank, sender, &denom, amount, time)
            }
            ExecuteMsg::RepayNative { denom } => {
                let amount = coin_amount(funds, &denom);
                self.repay(bank, sender, &denom, amount, time)
            }
            ExecuteMsg::Receive(wrapper) => {
                let denom = self
                    .ma_denoms
                    .get(sender)
                    .cloned()
                    .ok_or_else(|| "unauthorized".to_string())?;
                let hook: ReceiveMsg = from_json(&wrapper.msg)
                    .map_err(|err| format!("invalid receive hook: {}", err))?;
                match hook {
                    ReceiveMsg::Redeem {} => {
                        self.redeem(bank, &wrapper.sender, &denom, wrapper.amount, time)
                    }
                }
            }
        }
    }

    fn deposit(
        &mut self,
        bank: &mut Bank,
        sender: &str,
        denom: &str,
        amount: Uint128,
        time: u64,
    ) -> Result<Vec<Attribute>, String> {
        let contract = self.address.clone();
        let reserve = self
            .reserves
            .get_mut(denom)
            .ok_or_else(|| format!("{} reserve not found", denom))?;
        if amount.is_zero() {
            return Err("Deposit amount must be greater than 0".to_string());
        }
        math(reserve.accrue(time))?;
        let minted = math(scaled_div(amount, reserve.liquidity_index))?;
        let ma_token = reserve.ma_token_address.clone();
        // Attached funds are already on the contract when the handler runs.
        math(reserve.update_rates(bank.balance(&contract, denom)))?;

        let mut attrs = vec![
            Attribute::new("action", "deposit"),
            Attribute::new("market", denom),
            Attribute::new("user", sender),
            Attribute::new("amount", amount.to_string()),
            Attribute::new("mint_amount", minted.to_string()),
        ];
        attrs.extend(interest_attrs(reserve));
        self.mint(&ma_token, sender, minted)?;
        Ok(attrs)
    }

    fn redeem(
        &mut self,
        bank: &mut Bank,
        user: &str,
        denom: &str,
        burn_scaled: Uint128,
        time: u64,
    ) -> Result<Vec<Attribute>, String> {
        let contract = self.address.clone();
        let reserve = self
            .reserves
            .get_mut(denom)
            .ok_or_else(|| format!("{} reserve not found", denom))?;
        math(reserve.accrue(time))?;
        let underlying = math(scaled_mul(burn_scaled, reserve.liquidity_index))?;
        bank.transfer(&contract, user, denom, underlying)?;
        math(reserve.update_rates(bank.balance(&contract, denom)))?;

        let mut attrs = vec![
            Attribute::new("action", "redeem"),
            Attribute::new("market", denom),
            Attribute::new("user", user),
            Attribute::new("amount", burn_scaled.to_string()),
            Attribute::new("redeem_amount", underlying.to_string()),
        ];
        attrs.extend(interest_attrs(reserve));
        Ok(attrs)
    }

    fn borrow(
        &mut self,
        bank: &mut Bank,
        sender: &str,
        denom: &str,
        amount: Uint128,
        time: u64,
    ) -> Result<Vec<Attribute>, String> {
        if !self.reserves.contains_key(denom) {
            return Err(format!("{} reserve not found", denom));
        }
        if amount.is_zero() {
            return Err("Borrow amount must be greater than 0".to_string());
        }
        self.check_health(sender, denom, amount, time)?;

        let contract = self.address.clone();
        let reserve = self
            .reserves
            .get_mut(denom)
            .ok_or_else(|| format!("{} reserve not found", denom))?;
        math(reserve.accrue(time))?;
        let scaled = math(scaled_div(amount, reserve.borrow_index))?;
        reserve.debt_total_scaled = reserve
            .debt_total_scaled
            .checked_add(scaled)
            .map_err(|err| err.to_string())?;
        bank.transfer(&contract, sender, denom, amount)?;
        math(reserve.update_rates(bank.balance(&contract, denom)))?;

        let mut attrs = vec![
            Attribute::new("action", "borrow"),
            Attribute::new("market", denom),
            Attribute::new("user", sender),
            Attribute::new("amount", amount.to_string()),
        ];
        attrs.extend(interest_attrs(reserve));

        let owed = self
            .debts
            .entry(sender.to_string())
            .or_default()
            .entry(denom.to_string())
            .or_default();
        *owed = owed.checked_add(scaled).map_err(|err| err.to_string())?;
        Ok(attrs)
    }

    fn repay(
        &mut self,
        bank: &mut Bank,
        sender: &str,
        denom: &str,
        amount: Uint128,
        time: u64,
    ) -> Result<Vec<Attribute>, String> {
        let contract = self.address.clone();
        let debt_scaled = self.debt_of(sender, denom);
        let reserve = self
            .reserves
            .get_mut(denom)
            .ok_or_else(|| format!("{} reserve not found", denom))?;
        if amount.is_zero() {
            return Err("Repay amount must be greater than 0".to_string());
        }
        if debt_scaled.is_zero() {
            return Err("Cannot repay 0 debt".to_string());
        }
        math(reserve.accrue(time))?;

        let mut paid_scaled = math(scaled_div(amount, reserve.borrow_index))?;
        let mut kept = amount;
        let mut refund = Uint128::zero();
        if paid_scaled > debt_scaled {
            let excess = paid_scaled
                .checked_sub(debt_scaled)
                .map_err(|err| err.to_string())?;
            refund = math(scaled_mul(excess, reserve.borrow_index))?;
            bank.transfer(&contract, sender, denom, refund)?;
            kept = amount.checked_sub(refund).map_err(|err| err.to_string())?;
            paid_scaled = debt_scaled;
        }
        reserve.debt_total_scaled = reserve
            .debt_total_scaled
            .checked_sub(paid_scaled)
            .map_err(|err| err.to_string())?;
        math(reserve.update_rates(bank.balance(&contract, denom)))?;

        let mut attrs = vec![
            Attribute::new("action", "repay"),
            Attribute::new("market", denom),
            Attribute::new("user", sender),
            Attribute::new("amount", kept.to_string()),
        ];
        if !refund.is_zero() {
            attrs.push(Attribute::new("refund_amount", refund.to_string()));
        }
        attrs.extend(interest_attrs(reserve));

        let remaining = debt_scaled
            .checked_sub(paid_scaled)
            .map_err(|err| err.to_string())?;
        self.debts
            .entry(sender.to_string())
            .or_default()
            .insert(denom.to_string(), remaining);
        Ok(attrs)
    }

    /// Collateral rule for new borrows. Values everything through the price
    /// table at projected indices, so pending interest counts on both sides.
    fn check_health(
        &self,
        sender: &str,
        denom: &str,
        amount: Uint128,
        time: u64,
    ) -> Result<(), String> {
        let mut collateral_value = Uint128::zero();
        let mut debt_value = Uint128::zero();
        let mut has_collateral = false;

        for reserve in self.reserves.values() {
            let held = self.cw20_balance(&reserve.ma_token_address, sender);
            let debt_scaled = self.debt_of(sender, &reserve.denom);
            if held.is_zero() && debt_scaled.is_zero() {
                continue;
            }
            let (liquidity_index, borrow_index) = math(reserve.projected_indices(time))?;
            let price = self.price(&reserve.denom);
            if !held.is_zero() {
                has_collateral = true;
                let underlying = math(scaled_mul(held, liquidity_index))?;
                let value = math(scaled_mul(underlying, price))?;
                let weighted = math(scaled_mul(value, reserve.loan_to_value))?;
                collateral_value = collateral_value
                    .checked_add(weighted)
                    .map_err(|err| err.to_string())?;
            }
            if !debt_scaled.is_zero() {
                let owed = math(scaled_mul(debt_scaled, borrow_index))?;
                let value = math(scaled_mul(owed, price))?;
                debt_value = debt_value
                    .checked_add(value)
                    .map_err(|err| err.to_string())?;
            }
        }

        if !has_collateral {
            return Err("address has no collateral deposited".to_string());
        }
        let new_value = math(scaled_mul(amount, self.price(denom)))?;
        let total = debt_value
            .checked_add(new_value)
            .map_err(|err| err.to_string())?;
        if total > collateral_value {
            return Err(
                "borrow amount exceeds maximum allowed given current collateral value"
                    .to_string(),
            );
        }
        Ok(())
    }

    pub fn query(&self, msg: QueryMsg) -> Result<Value, String> {
        let raw = match msg {
            QueryMsg::Reserve { denom } => {
                let reserve = self
                    .reserves
                    .get(&denom)
                    .ok_or_else(|| format!("{} reserve not found", denom))?;
                let borrow_slope = match reserve.rate_model {
                    RateModel::Proportional { slope } => slope,
                    // The v0 wire shape predates non-linear curves.
                    RateModel::Kinked { .. } => Decimal256::zero(),
                };
                serde_json::to_value(ReserveResponse {
                    ma_token_address: reserve.ma_token_address.clone(),
                    liquidity_index: reserve.liquidity_index,
                    borrow_index: reserve.borrow_index,
                    liquidity_rate: reserve.liquidity_rate,
                    borrow_rate: reserve.borrow_rate,
                    borrow_slope,
                    loan_to_value: reserve.loan_to_value,
                    interests_last_updated: reserve.interests_last_updated,
                    debt_total_scaled: reserve.debt_total_scaled,
                })
            }
            QueryMsg::ReservesList {} => serde_json::to_value(ReservesListResponse {
                reserves_list: self
                    .reserves
                    .values()
                    .map(|reserve| ReserveInfo {
                        denom: reserve.denom.clone(),
                        ma_token_address: reserve.ma_token_address.clone(),
                    })
                    .collect(),
            }),
            QueryMsg::Debt { address } => serde_json::to_value(DebtResponse {
                debts: self
                    .reserves
                    .keys()
                    .map(|denom| DebtInfo {
                        denom: denom.clone(),
                        amount: self.debt_of(&address, denom),
                    })
                    .collect(),
            }),
        };
        raw.map_err(|err| err.to_string())
    }

    fn mint(&mut self, token: &str, holder: &str, amount: Uint128) -> Result<(), String> {
        let balance = self
            .ma_balances
            .entry(token.to_string())
            .or_default()
            .entry(holder.to_string())
            .or_default();
        *balance = balance
            .checked_add(amount)
            .map_err(|err| err.to_string())?;
        Ok(())
    }

    fn debt_of(&self, user: &str, denom: &str) -> Uint128 {
        self.debts
            .get(user)
            .and_then(|per_denom| per_denom.get(denom))
            .copied()
            .unwrap_or_default()
    }

    fn price(&self, denom: &str) -> Decimal256 {
        self.prices
            .get(denom)
            .copied()
            .unwrap_or_else(Decimal256::one)
    }
}

fn coin_amount(funds: &[Coin], denom: &str) -> Uint128 {
    funds
        .iter()
        .find(|coin| coin.denom == denom)
        .map(|coin| coin.amount)
        .unwrap_or_default()
}

fn interest_attrs(reserve: &Reserve) -> Vec<Attribute> {
    vec![
        Attribute::new("borrow_index", reserve.borrow_index.to_string()),
        Attribute::new("liquidity_index", reserve.liquidity_index.to_string()),
        Attribute::new("borrow_rate", reserve.borrow_rate.to_string()),
        Attribute::new("liquidity_rate", reserve.liquidity_rate.to_string()),
    ]
}
