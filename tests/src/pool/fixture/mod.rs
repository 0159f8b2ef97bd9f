//! Pool test fixture module
//!
//! Provides the shared fixture for the pool suites: a seeded in-process
//! chain wrapped in a reconciliation engine that is ready to drive.

mod setup;

pub use setup::{dec, seed_chain};

use {crate::addresses::addresses, tidepool_test_framework::prelude::*};

/// Pool test fixture
pub struct PoolFixture {
    /// Engine bound to the sim chain, driving actions and cross-checks
    pub engine: Reconciler<SimChain>,
}

impl PoolFixture {
    pub const GENESIS_TIME: u64 = 1_700_000_000;
    pub const INITIAL_BALANCE: u128 = 100_000_000;
    pub const FEE_AMOUNT: u128 = 15_000;

    pub const ULUNA_SLOPE: &'static str = "4";
    pub const ULUNA_LOAN_TO_VALUE: &'static str = "0.5";
    pub const UUSD_SLOPE: &'static str = "5";
    pub const UUSD_LOAN_TO_VALUE: &'static str = "0.8";
    pub const UKRW_SLOPE: &'static str = "2";
    pub const UKRW_LOAN_TO_VALUE: &'static str = "0.6";
}

impl PoolFixture {
    pub fn new() -> Result<Self> {
        let chain = seed_chain()?;
        let engine = ReconcilerBuilder::new(addresses::POOL_ADDRESS)
            .user(addresses::ALICE)
            .user(addresses::BOB)
            .build(chain)?;
        Ok(Self { engine })
    }

    pub fn timestamp(&self) -> u64 {
        self.engine.client().timestamp()
    }

    /// Advance chain time by `seconds`.
    pub fn warp(&mut self, seconds: u64) {
        self.engine.client_mut().warp_time(seconds);
    }

    /// Move chain time to an absolute timestamp, backwards included.
    pub fn set_time(&mut self, timestamp: u64) {
        self.engine.client_mut().set_time(timestamp);
    }

    /// Reprice a denom in the unit of account.
    pub fn set_price(&mut self, denom: &str, price: &str) {
        self.engine.client_mut().set_price(denom, dec(price));
    }
}

impl Default for PoolFixture {
    fn default() -> Self {
        Self::new().expect("Failed to create PoolFixture")
    }
}
