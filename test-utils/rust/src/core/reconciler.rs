use cosmwasm_std::Uint128;
use tracing::{debug, error, info};

use model::{ExpectedState, Reserve};

use crate::chain::msgs::{DebtResponse, QueryMsg, ReserveResponse};
use crate::chain::{smart_query, ChainClient, Receipt};
use crate::core::actions::{Action, ActionBuilder, RejectionInfo};
use crate::core::compare::CompareCtx;
use crate::errors::{HarnessError, Result};

/// Where the engine sits inside one action cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    ActionSubmitted,
    ActualStateFetched,
    Compared,
    Failed,
}

/// Drives protocol actions and reconciles expected against actual state
/// after every one of them.
///
/// The engine is strictly sequential. The first divergence of any kind moves
/// it to [`Phase::Failed`], after which every operation returns
/// [`HarnessError::Halted`]. There is no retry and no rollback.
pub struct Reconciler<C: ChainClient> {
    client: C,
    expected: ExpectedState,
    pool: String,
    users: Vec<String>,
    debt_tolerance: u128,
    phase: Phase,
}

/// Post-action chain state gathered for one comparison pass.
struct ActualState {
    reserve: ReserveResponse,
    contract_balance: Uint128,
    payer_balances: Vec<(String, Uint128)>,
    receipt_balance: Option<Uint128>,
    debt_scaled: Option<Uint128>,
}

impl<C: ChainClient> Reconciler<C> {
    pub(crate) fn from_parts(
        client: C,
        expected: ExpectedState,
        pool: String,
        users: Vec<String>,
        debt_tolerance: u128,
    ) -> Self {
        Self {
            client,
            expected,
            pool,
            users,
            debt_tolerance,
            phase: Phase::Idle,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn expected(&self) -> &ExpectedState {
        &self.expected
    }

    pub fn pool(&self) -> &str {
        &self.pool
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn client_mut(&mut self) -> &mut C {
        &mut self.client
    }

    pub fn deposit(&mut self, user: &str, denom: &str, amount: Uint128) -> Result<Reserve> {
        self.run(
            user,
            Action::Deposit {
                denom: denom.to_string(),
                amount,
            },
        )
    }

    pub fn redeem(&mut self, user: &str, denom: &str, burn_scaled: Uint128) -> Result<Reserve> {
        self.run(
            user,
            Action::Redeem {
                denom: denom.to_string(),
                burn_scaled,
            },
        )
    }

    pub fn borrow(&mut self, user: &str, denom: &str, amount: Uint128) -> Result<Reserve> {
        self.run(
            user,
            Action::Borrow {
                denom: denom.to_string(),
                amount,
            },
        )
    }

    pub fn repay(&mut self, user: &str, denom: &str, amount: Uint128) -> Result<Reserve> {
        self.run(
            user,
            Action::Repay {
                denom: denom.to_string(),
                amount,
            },
        )
    }

    /// Drive one action through the full cycle: submit, apply to the
    /// expected state, fetch actual state, compare.
    pub fn run(&mut self, user: &str, action: Action) -> Result<Reserve> {
        self.ensure_ready(user)?;
        info!(
            action = action.name(),
            denom = action.denom(),
            user,
            "driving action"
        );
        match self.cycle(user, &action) {
            Ok(reserve) => {
                self.phase = Phase::Idle;
                Ok(reserve)
            }
            Err(err) => {
                error!(
                    action = action.name(),
                    denom = action.denom(),
                    user,
                    %err,
                    "reconciliation failed"
                );
                self.phase = Phase::Failed;
                Err(err)
            }
        }
    }

    /// Submit an action that must be rejected with `fragment` somewhere in
    /// its raw log. A correctly-predicted rejection leaves the expected
    /// state untouched and the engine idle.
    pub fn expect_rejection(
        &mut self,
        user: &str,
        action: Action,
        fragment: &str,
    ) -> Result<RejectionInfo> {
        self.ensure_ready(user)?;
        info!(
            action = action.name(),
            denom = action.denom(),
            user,
            fragment,
            "expecting rejection"
        );
        match self.submit(user, &action) {
            Ok(_) => {
                self.phase = Phase::Failed;
                Err(HarnessError::MissingRejection {
                    action: action.name().to_string(),
                    denom: action.denom().to_string(),
                    fragment: fragment.to_string(),
                })
            }
            Err(HarnessError::ExecuteFailed { code, raw_log }) => {
                let rejection = RejectionInfo { code, raw_log };
                if rejection.contains(fragment) {
                    debug!(code = rejection.code, "rejected as predicted");
                    Ok(rejection)
                } else {
                    self.phase = Phase::Failed;
                    Err(HarnessError::UnexpectedRejection {
                        action: action.name().to_string(),
                        denom: action.denom().to_string(),
                        code: rejection.code,
                        raw_log: rejection.raw_log,
                    })
                }
            }
            Err(other) => {
                self.phase = Phase::Failed;
                Err(other)
            }
        }
    }

    fn ensure_ready(&self, user: &str) -> Result<()> {
        if self.phase == Phase::Failed {
            return Err(HarnessError::Halted);
        }
        if !self.users.iter().any(|tracked| tracked == user) {
            return Err(HarnessError::InvalidConfig(format!(
                "untracked user: {}",
                user
            )));
        }
        Ok(())
    }

    fn cycle(&mut self, user: &str, action: &Action) -> Result<Reserve> {
        let receipt = match self.submit(user, action) {
            Ok(receipt) => receipt,
            Err(HarnessError::ExecuteFailed { code, raw_log }) => {
                return Err(HarnessError::UnexpectedRejection {
                    action: action.name().to_string(),
                    denom: action.denom().to_string(),
                    code,
                    raw_log,
                });
            }
            Err(other) => return Err(other),
        };
        self.phase = Phase::ActionSubmitted;

        let expected = self.apply(user, action, &receipt)?;
        let actual = self.fetch_actual(user, action, &receipt)?;
        self.phase = Phase::ActualStateFetched;

        self.compare(user, action, &receipt, &expected, &actual)?;
        self.phase = Phase::Compared;
        Ok(expected)
    }

    fn submit(&mut self, user: &str, action: &Action) -> Result<Receipt> {
        let ma_token = match action {
            Action::Redeem { denom, .. } => {
                self.expected.reserve(denom)?.ma_token_address.clone()
            }
            _ => String::new(),
        };
        let dispatch = action.dispatch(&self.pool, &ma_token)?;
        ActionBuilder::new(&mut self.client)
            .sender(user)
            .dispatch(dispatch)
            .execute()
    }

    fn apply(&mut self, user: &str, action: &Action, receipt: &Receipt) -> Result<Reserve> {
        let reserve = match action {
            Action::Deposit { denom, amount } => {
                self.expected
                    .apply_deposit(user, denom, *amount, receipt.timestamp)?
            }
            Action::Redeem { denom, burn_scaled } => {
                self.expected
                    .apply_redeem(user, denom, *burn_scaled, receipt.timestamp)?
            }
            Action::Borrow { denom, amount } => {
                self.expected
                    .apply_borrow(user, denom, *amount, receipt.timestamp)?
            }
            Action::Repay { denom, amount } => {
                self.expected
                    .apply_repay(user, denom, *amount, receipt.timestamp)?
            }
        };
        self.expected.charge_fee(user, &receipt.fee)?;
        Ok(reserve)
    }

    fn fetch_actual(&self, user: &str, action: &Action, receipt: &Receipt) -> Result<ActualState> {
        let denom = action.denom();
        let reserve: ReserveResponse = smart_query(
            &self.client,
            &self.pool,
            &QueryMsg::Reserve {
                denom: denom.to_string(),
            },
        )?;
        let contract_balance = self.client.native_balance(&self.pool, denom)?;

        let mut payer_balances = vec![(
            denom.to_string(),
            self.client.native_balance(user, denom)?,
        )];
        if receipt.fee.denom != denom {
            payer_balances.push((
                receipt.fee.denom.clone(),
                self.client.native_balance(user, &receipt.fee.denom)?,
            ));
        }

        let receipt_balance = match action {
            Action::Deposit { .. } | Action::Redeem { .. } => {
                let response: cw20::BalanceResponse = smart_query(
                    &self.client,
                    &reserve.ma_token_address,
                    &cw20::Cw20QueryMsg::Balance {
                        address: user.to_string(),
                    },
                )?;
                Some(response.balance)
            }
            _ => None,
        };

        let debt_scaled = match action {
            Action::Borrow { .. } | Action::Repay { .. } => {
                let response: DebtResponse = smart_query(
                    &self.client,
                    &self.pool,
                    &QueryMsg::Debt {
                        address: user.to_string(),
                    },
                )?;
                Some(
                    response
                        .debts
                        .iter()
                        .find(|debt| debt.denom == denom)
                        .map(|debt| debt.amount)
                        .unwrap_or_default(),
                )
            }
            _ => None,
        };

        Ok(ActualState {
            reserve,
            contract_balance,
            payer_balances,
            receipt_balance,
            debt_scaled,
        })
    }

    fn compare(
        &self,
        user: &str,
        action: &Action,
        receipt: &Receipt,
        expected: &Reserve,
        actual: &ActualState,
    ) -> Result<()> {
        let ctx = CompareCtx {
            action: action.name(),
            denom: action.denom(),
        };

        // The pool logs its post-action rates and indices with every action.
        ctx.texts(
            "action (event)",
            action.name(),
            receipt.required_attr(&self.pool, "action")?,
        )?;
        ctx.decimals(
            "liquidity_rate (event)",
            expected.liquidity_rate,
            receipt.decimal_attr(&self.pool, "liquidity_rate")?,
        )?;
        ctx.decimals(
            "borrow_rate (event)",
            expected.borrow_rate,
            receipt.decimal_attr(&self.pool, "borrow_rate")?,
        )?;
        ctx.decimals(
            "liquidity_index (event)",
            expected.liquidity_index,
            receipt.decimal_attr(&self.pool, "liquidity_index")?,
        )?;
        ctx.decimals(
            "borrow_index (event)",
            expected.borrow_index,
            receipt.decimal_attr(&self.pool, "borrow_index")?,
        )?;

        ctx.texts(
            "ma_token_address (query)",
            &expected.ma_token_address,
            &actual.reserve.ma_token_address,
        )?;
        ctx.decimals(
            "liquidity_index (query)",
            expected.liquidity_index,
            actual.reserve.liquidity_index,
        )?;
        ctx.decimals(
            "borrow_index (query)",
            expected.borrow_index,
            actual.reserve.borrow_index,
        )?;
        ctx.decimals(
            "liquidity_rate (query)",
            expected.liquidity_rate,
            actual.reserve.liquidity_rate,
        )?;
        ctx.decimals(
            "borrow_rate (query)",
            expected.borrow_rate,
            actual.reserve.borrow_rate,
        )?;
        ctx.seconds(
            "interests_last_updated (query)",
            expected.interests_last_updated,
            actual.reserve.interests_last_updated,
        )?;
        ctx.amounts_within(
            "debt_total_scaled (query)",
            expected.debt_total_scaled,
            actual.reserve.debt_total_scaled,
            self.debt_tolerance,
        )?;

        ctx.amounts(
            "contract balance",
            self.expected.contract_balance(action.denom()),
            actual.contract_balance,
        )?;
        for (denom, actual_balance) in &actual.payer_balances {
            ctx.amounts(
                &format!("{} balance of {}", denom, user),
                self.expected.user_balance(user, denom),
                *actual_balance,
            )?;
        }
        if let Some(actual_receipt) = actual.receipt_balance {
            ctx.amounts(
                "receipt token balance",
                self.expected.receipt_balance(user, action.denom()),
                actual_receipt,
            )?;
        }
        if let Some(actual_debt) = actual.debt_scaled {
            ctx.amounts_within(
                "user debt (scaled)",
                self.expected.user_debt_scaled(user, action.denom()),
                actual_debt,
                self.debt_tolerance,
            )?;
        }

        debug!(
            action = action.name(),
            denom = action.denom(),
            height = receipt.height,
            "reconciled"
        );
        Ok(())
    }
}
