//! Pool Base Tests - bootstrap and end-to-end market flow.
//!
//! Covers engine construction against a freshly seeded chain, the wire
//! shapes the pool serves, and one full deposit/borrow/repay/redeem
//! cycle reconciled step by step.

#[cfg(test)]
mod tests {
    use crate::addresses::addresses;
    use crate::pool::fixture::PoolFixture;
    use tidepool_test_framework::chain::msgs::{QueryMsg, ReservesListResponse};
    use tidepool_test_framework::prelude::*;

    fn setup_fixture() -> PoolFixture {
        PoolFixture::new().expect("Failed to create fixture")
    }

    /// Test: Should bootstrap the expected state from the deployed reserves
    #[test]
    fn test_should_bootstrap_expected_state() {
        let fixture = setup_fixture();

        let reserve = fixture
            .engine
            .expected()
            .reserve("uluna")
            .expect("uluna reserve should be tracked");
        assert_eq!(
            reserve.ma_token_address,
            addresses::MA_ULUNA_ADDRESS,
            "maToken address should come from the reserve query"
        );
        assert_eq!(reserve.liquidity_index, Decimal256::one());
        assert_eq!(reserve.borrow_index, Decimal256::one());
        assert_eq!(reserve.liquidity_rate, Decimal256::zero());
        assert_eq!(reserve.borrow_rate, Decimal256::zero());
        assert_eq!(reserve.debt_total_scaled, Uint128::zero());
        assert_eq!(
            reserve.interests_last_updated,
            PoolFixture::GENESIS_TIME,
            "reserves should report the genesis timestamp before any action"
        );

        assert!(fixture.engine.expected().reserve("uusd").is_ok());
        assert!(fixture.engine.expected().reserve("ukrw").is_ok());
        assert!(
            fixture.engine.expected().reserve("uatom").is_err(),
            "unlisted denoms should not be tracked"
        );

        for user in [addresses::ALICE, addresses::BOB] {
            for denom in ["uluna", "uusd", "ukrw"] {
                fixture
                    .engine
                    .assert_user_balance(user, denom, PoolFixture::INITIAL_BALANCE);
                fixture.engine.assert_receipt_balance(user, denom, 0);
                fixture.engine.assert_debt_scaled(user, denom, 0);
            }
        }
        fixture.engine.assert_contract_balance("uluna", 0);

        assert_eq!(fixture.engine.phase(), Phase::Idle);
        assert_eq!(fixture.timestamp(), PoolFixture::GENESIS_TIME);
        assert_eq!(
            fixture.engine.client().fee().amount.u128(),
            PoolFixture::FEE_AMOUNT
        );
    }

    /// Test: Should serve the v0 wire shapes
    #[test]
    fn test_should_serve_wire_shapes() {
        let fixture = setup_fixture();

        let listing: ReservesListResponse = smart_query(
            fixture.engine.client(),
            addresses::POOL_ADDRESS,
            &QueryMsg::ReservesList {},
        )
        .expect("reserves_list query should succeed");
        assert_eq!(listing.reserves_list.len(), 3, "three reserves are seeded");

        // Field names are part of the wire contract; pin them as raw JSON.
        let raw = fixture
            .engine
            .client()
            .query(
                addresses::POOL_ADDRESS,
                &serde_json::json!({"reserve": {"denom": "uluna"}}),
            )
            .expect("raw reserve query should succeed");
        for key in [
            "ma_token_address",
            "liquidity_index",
            "borrow_index",
            "liquidity_rate",
            "borrow_rate",
            "borrow_slope",
            "loan_to_value",
            "interests_last_updated",
            "debt_total_scaled",
        ] {
            assert!(
                raw.get(key).is_some(),
                "reserve response should carry `{}`",
                key
            );
        }
        assert_eq!(raw["ma_token_address"], addresses::MA_ULUNA_ADDRESS);
        assert_eq!(raw["liquidity_index"], "1");
        assert_eq!(raw["borrow_slope"], PoolFixture::ULUNA_SLOPE);
    }

    /// Test: Complete market flow (integration test)
    #[test]
    fn test_complete_market_flow() {
        let mut fixture = setup_fixture();
        let alice = addresses::ALICE;

        // 1. Deposit 10M uluna; receipt tokens mint 1:1 at the unit index.
        fixture
            .deposit(alice, "uluna", 10_000_000)
            .expect("deposit should reconcile");
        fixture.engine.assert_receipt_balance(alice, "uluna", 10_000_000);
        fixture.engine.assert_contract_balance("uluna", 10_000_000);
        fixture.engine.assert_user_balance(alice, "uluna", 89_985_000);

        // 2. Borrow 4M against the deposit (10M * 0.5 LTV leaves room).
        fixture
            .borrow(alice, "uluna", 4_000_000)
            .expect("borrow should reconcile");
        fixture.engine.assert_debt_scaled(alice, "uluna", 4_000_000);
        fixture.engine.assert_contract_balance("uluna", 6_000_000);
        fixture.engine.assert_user_balance(alice, "uluna", 93_970_000);
        fixture.engine.assert_rates("uluna", "1.6", "0.64");

        // 3. Thirty days of linear accrual, realized by the next action.
        fixture.warp(30 * time::DAY);
        fixture
            .repay(alice, "uluna", 200_000)
            .expect("partial repay should reconcile");
        fixture
            .engine
            .assert_indices("uluna", "1.052602739726027397", "1.131506849315068492");
        fixture.engine.assert_debt_scaled(alice, "uluna", 3_823_245);
        fixture.engine.assert_user_balance(alice, "uluna", 93_755_000);

        // 4. Overpay the rest; the excess comes back at the borrow index.
        fixture
            .repay(alice, "uluna", 4_426_027)
            .expect("full repay should reconcile");
        fixture.engine.assert_debt_scaled(alice, "uluna", 0);
        fixture.engine.assert_rates("uluna", "0", "0");
        fixture.engine.assert_contract_balance("uluna", 10_526_029);
        fixture.engine.assert_user_balance(alice, "uluna", 89_413_971);

        // 5. Redeem 2M scaled at the grown liquidity index.
        fixture
            .redeem(alice, "uluna", 2_000_000)
            .expect("redeem should reconcile");
        fixture.engine.assert_receipt_balance(alice, "uluna", 8_000_000);
        fixture.engine.assert_contract_balance("uluna", 8_420_824);
        fixture.engine.assert_user_balance(alice, "uluna", 91_504_176);
        // Indices survive the market going quiet.
        fixture
            .engine
            .assert_indices("uluna", "1.052602739726027397", "1.131506849315068492");

        assert_eq!(fixture.engine.phase(), Phase::Idle);
        println!("Complete market flow reconciled successfully!");
    }
}
