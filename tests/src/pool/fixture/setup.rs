//! Setup functions and action proxies for pool tests
//!
//! This module seeds the sim chain with the default market layout and
//! wraps the engine operations in plain-integer helpers so test bodies
//! stay close to the scenarios they describe.

use {
    super::PoolFixture, crate::addresses::addresses, crate::connection, std::str::FromStr,
    tidepool_test_framework::prelude::*,
};

/// Parse a decimal literal, panicking on malformed input.
pub fn dec(raw: &str) -> Decimal256 {
    Decimal256::from_str(raw).unwrap_or_else(|err| panic!("bad decimal literal {}: {}", raw, err))
}

/// Default market layout: three reserves with distinct slopes and
/// loan-to-value ratios, both users funded in every denom.
pub fn seed_chain() -> Result<SimChain> {
    let mut builder = SimChainBuilder::new(addresses::POOL_ADDRESS)
        .with_fee(connection::get_fee())
        .with_genesis_time(PoolFixture::GENESIS_TIME)
        .with_reserve(
            "uluna",
            addresses::MA_ULUNA_ADDRESS,
            RateModel::Proportional {
                slope: dec(PoolFixture::ULUNA_SLOPE),
            },
            dec(PoolFixture::ULUNA_LOAN_TO_VALUE),
        )
        .with_reserve(
            "uusd",
            addresses::MA_UUSD_ADDRESS,
            RateModel::Proportional {
                slope: dec(PoolFixture::UUSD_SLOPE),
            },
            dec(PoolFixture::UUSD_LOAN_TO_VALUE),
        )
        .with_reserve(
            "ukrw",
            addresses::MA_UKRW_ADDRESS,
            RateModel::Proportional {
                slope: dec(PoolFixture::UKRW_SLOPE),
            },
            dec(PoolFixture::UKRW_LOAN_TO_VALUE),
        );

    for user in [addresses::ALICE, addresses::BOB] {
        for denom in ["uluna", "uusd", "ukrw"] {
            builder =
                builder.with_balance(user, Coin::new(PoolFixture::INITIAL_BALANCE, denom));
        }
    }
    builder.build()
}

impl PoolFixture {
    pub fn deposit(&mut self, user: &str, denom: &str, amount: u128) -> Result<Reserve> {
        self.engine.deposit(user, denom, Uint128::new(amount))
    }

    pub fn redeem(&mut self, user: &str, denom: &str, burn_scaled: u128) -> Result<Reserve> {
        self.engine.redeem(user, denom, Uint128::new(burn_scaled))
    }

    pub fn borrow(&mut self, user: &str, denom: &str, amount: u128) -> Result<Reserve> {
        self.engine.borrow(user, denom, Uint128::new(amount))
    }

    pub fn repay(&mut self, user: &str, denom: &str, amount: u128) -> Result<Reserve> {
        self.engine.repay(user, denom, Uint128::new(amount))
    }

    pub fn expect_deposit_rejection(
        &mut self,
        user: &str,
        denom: &str,
        amount: u128,
        fragment: &str,
    ) -> Result<RejectionInfo> {
        self.engine.expect_rejection(
            user,
            Action::Deposit {
                denom: denom.to_string(),
                amount: Uint128::new(amount),
            },
            fragment,
        )
    }

    pub fn expect_redeem_rejection(
        &mut self,
        user: &str,
        denom: &str,
        burn_scaled: u128,
        fragment: &str,
    ) -> Result<RejectionInfo> {
        self.engine.expect_rejection(
            user,
            Action::Redeem {
                denom: denom.to_string(),
                burn_scaled: Uint128::new(burn_scaled),
            },
            fragment,
        )
    }

    pub fn expect_borrow_rejection(
        &mut self,
        user: &str,
        denom: &str,
        amount: u128,
        fragment: &str,
    ) -> Result<RejectionInfo> {
        self.engine.expect_rejection(
            user,
            Action::Borrow {
                denom: denom.to_string(),
                amount: Uint128::new(amount),
            },
            fragment,
        )
    }

    pub fn expect_repay_rejection(
        &mut self,
        user: &str,
        denom: &str,
        amount: u128,
        fragment: &str,
    ) -> Result<RejectionInfo> {
        self.engine.expect_rejection(
            user,
            Action::Repay {
                denom: denom.to_string(),
                amount: Uint128::new(amount),
            },
            fragment,
        )
    }
}
