use std::collections::BTreeMap;

use cw20::{BalanceResponse, Cw20QueryMsg};
use tracing::debug;

use model::{ExpectedState, RateModel, Reserve};

use crate::chain::msgs::{DebtResponse, QueryMsg, ReserveResponse, ReservesListResponse};
use crate::chain::{smart_query, ChainClient};
use crate::core::Reconciler;
use crate::errors::{HarnessError, Result};

/// Scaled debt totals drift by a few base units against the model because
/// the chain rounds intermediate values independently.
pub const DEFAULT_DEBT_TOLERANCE: u128 = 10;

/// Builder for the reconciliation engine
#[derive(Debug, Clone)]
pub struct ReconcilerBuilder {
    pool: String,
    users: Vec<String>,
    extra_denoms: Vec<String>,
    rate_models: BTreeMap<String, RateModel>,
    debt_tolerance: u128,
}

impl ReconcilerBuilder {
    /// Reconcile against the money market deployed at `pool`.
    pub fn new(pool: impl Into<String>) -> Self {
        Self {
            pool: pool.into(),
            users: vec![],
            extra_denoms: vec![],
            rate_models: BTreeMap::new(),
            debt_tolerance: DEFAULT_DEBT_TOLERANCE,
        }
    }

    /// Track a user address. Only tracked users may drive actions.
    pub fn user(mut self, address: impl Into<String>) -> Self {
        self.users.push(address.into());
        self
    }

    /// Seed balances for a denom outside the reserve list, e.g. a fee denom.
    pub fn track_denom(mut self, denom: impl Into<String>) -> Self {
        self.extra_denoms.push(denom.into());
        self
    }

    /// Override the rate model recovered from the reserve query. The wire
    /// shape only carries a linear slope, so non-linear deployments need
    /// their model supplied here.
    pub fn rate_model(mut self, denom: impl Into<String>, model: RateModel) -> Self {
        self.rate_models.insert(denom.into(), model);
        self
    }

    /// Allowed drift on scaled debt amounts, in base units.
    pub fn debt_tolerance(mut self, tolerance: u128) -> Self {
        self.debt_tolerance = tolerance;
        self
    }

    /// Snapshot the deployed reserves and balances into a fresh expected
    /// state and wrap them with the client into a [`Reconciler`].
    pub fn build<C: ChainClient>(mut self, client: C) -> Result<Reconciler<C>> {
        if self.users.is_empty() {
            return Err(HarnessError::InvalidConfig(
                "at least one user must be tracked".to_string(),
            ));
        }

        let mut expected = ExpectedState::default();
        let listing: ReservesListResponse =
            smart_query(&client, &self.pool, &QueryMsg::ReservesList {})?;

        for info in &listing.reserves_list {
            let response: ReserveResponse = smart_query(
                &client,
                &self.pool,
                &QueryMsg::Reserve {
                    denom: info.denom.clone(),
                },
            )?;
            let rate_model = self
                .rate_models
                .remove(&info.denom)
                .unwrap_or(RateModel::Proportional {
                    slope: response.borrow_slope,
                });

            let mut reserve = Reserve::new(
                info.denom.as_str(),
                info.ma_token_address.as_str(),
                rate_model,
                response.loan_to_value,
                response.interests_last_updated,
            )?;
            reserve.liquidity_index = response.liquidity_index;
            reserve.borrow_index = response.borrow_index;
            reserve.liquidity_rate = response.liquidity_rate;
            reserve.borrow_rate = response.borrow_rate;
            reserve.debt_total_scaled = response.debt_total_scaled;
            expected.add_reserve(reserve)?;

            expected.set_contract_balance(
                info.denom.as_str(),
                client.native_balance(&self.pool, &info.denom)?,
            );

            for user in &self.users {
                expected.set_user_balance(
                    user.as_str(),
                    info.denom.as_str(),
                    client.native_balance(user, &info.denom)?,
                );
                let held: BalanceResponse = smart_query(
                    &client,
                    &info.ma_token_address,
                    &Cw20QueryMsg::Balance {
                        address: user.clone(),
                    },
                )?;
                expected.set_receipt_balance(user.as_str(), info.denom.as_str(), held.balance);
            }
        }

        for denom in &self.extra_denoms {
            for user in &self.users {
                expected.set_user_balance(
                    user.as_str(),
                    denom.as_str(),
                    client.native_balance(user, denom)?,
                );
            }
        }

        for user in &self.users {
            let debts: DebtResponse = smart_query(
                &client,
                &self.pool,
                &QueryMsg::Debt {
                    address: user.clone(),
                },
            )?;
            for debt in debts.debts {
                if !debt.amount.is_zero() {
                    expected.set_user_debt(user.as_str(), debt.denom, debt.amount);
                }
            }
        }

        debug!(
            pool = %self.pool,
            reserves = listing.reserves_list.len(),
            users = self.users.len(),
            "expected state bootstrapped"
        );
        Ok(Reconciler::from_parts(
            client,
            expected,
            self.pool,
            self.users,
            self.debt_tolerance,
        ))
    }
}
