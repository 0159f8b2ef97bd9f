//! Pool Borrow Tests - collateral checks, debt issuance and rate moves.

#[cfg(test)]
mod tests {
    use crate::addresses::addresses;
    use crate::pool::fixture::PoolFixture;
    use tidepool_test_framework::prelude::*;

    fn setup_fixture() -> PoolFixture {
        PoolFixture::new().expect("Failed to create fixture")
    }

    /// Funded uluna market: alice supplies the liquidity, bob posts uusd
    /// collateral worth 8M borrowing power (10M * 0.8 LTV).
    fn setup_funded_market() -> PoolFixture {
        let mut fixture = setup_fixture();
        fixture
            .deposit(addresses::ALICE, "uluna", 10_000_000)
            .expect("alice's deposit should reconcile");
        fixture
            .deposit(addresses::BOB, "uusd", 10_000_000)
            .expect("bob's collateral deposit should reconcile");
        fixture
    }

    /// Test: Should issue scaled debt and move both rates
    #[test]
    fn test_should_issue_debt_and_update_rates() {
        let mut fixture = setup_funded_market();
        let bob = addresses::BOB;

        let reserve = fixture
            .borrow(bob, "uluna", 4_000_000)
            .expect("borrow should reconcile");

        // 4M of 10M locked: utilization 0.4, borrow 0.4 * slope 4.
        assert_eq!(reserve.debt_total_scaled, Uint128::new(4_000_000));
        fixture.engine.assert_rates("uluna", "1.6", "0.64");
        fixture.engine.assert_debt_scaled(bob, "uluna", 4_000_000);
        fixture.engine.assert_contract_balance("uluna", 6_000_000);
        // Two fees so far (collateral deposit and borrow) plus the proceeds.
        fixture.engine.assert_user_balance(bob, "uluna", 103_970_000);
        fixture.engine.assert_user_balance(bob, "uusd", 90_000_000);
    }

    /// Test: Should reject borrowers with no collateral at all
    #[test]
    fn test_should_reject_borrow_without_collateral() {
        let mut fixture = setup_fixture();
        fixture
            .deposit(addresses::ALICE, "uluna", 10_000_000)
            .expect("alice's deposit should reconcile");

        fixture
            .expect_borrow_rejection(
                addresses::BOB,
                "uluna",
                4_000_000,
                "address has no collateral deposited",
            )
            .expect("rejection should be predicted");
        assert_eq!(fixture.engine.phase(), Phase::Idle);
        fixture
            .engine
            .assert_user_balance(addresses::BOB, "uluna", PoolFixture::INITIAL_BALANCE);
    }

    /// Test: Borrowing power is a closed bound
    #[test]
    fn test_should_allow_exactly_the_collateral_capacity() {
        let mut fixture = setup_funded_market();
        let bob = addresses::BOB;

        // 8M is exactly 10M uusd * 0.8 LTV at par prices.
        fixture
            .borrow(bob, "uluna", 8_000_000)
            .expect("borrow at the bound should reconcile");
        fixture.engine.assert_rates("uluna", "3.2", "2.56");
        fixture.engine.assert_user_balance(bob, "uluna", 107_970_000);

        // One more base unit tips over.
        fixture
            .expect_borrow_rejection(
                bob,
                "uluna",
                1,
                "borrow amount exceeds maximum allowed given current collateral value",
            )
            .expect("rejection should be predicted");
        fixture.engine.assert_debt_scaled(bob, "uluna", 8_000_000);
    }

    /// Test: Collateral is valued through the price table
    #[test]
    fn test_should_value_collateral_at_oracle_prices() {
        let mut fixture = setup_funded_market();
        let bob = addresses::BOB;

        // Halving the collateral price halves the borrowing power to 4M.
        fixture.set_price("uusd", "0.5");
        fixture
            .expect_borrow_rejection(
                bob,
                "uluna",
                4_000_001,
                "borrow amount exceeds maximum allowed given current collateral value",
            )
            .expect("rejection should be predicted");

        fixture
            .borrow(bob, "uluna", 4_000_000)
            .expect("borrow within the repriced capacity should reconcile");
        fixture.engine.assert_rates("uluna", "1.6", "0.64");
        fixture.engine.assert_user_balance(bob, "uluna", 103_970_000);
    }

    /// Test: Borrows from unlisted denoms are rejected
    #[test]
    fn test_should_reject_unknown_reserve() {
        let mut fixture = setup_funded_market();

        fixture
            .expect_borrow_rejection(addresses::BOB, "uatom", 1, "uatom reserve not found")
            .expect("rejection should be predicted");
        assert_eq!(fixture.engine.phase(), Phase::Idle);
    }

    /// Test: Zero-amount borrows are rejected before the health check
    #[test]
    fn test_should_reject_zero_borrow() {
        let mut fixture = setup_fixture();

        // No collateral posted, yet the amount check fires first.
        fixture
            .expect_borrow_rejection(
                addresses::BOB,
                "uluna",
                0,
                "Borrow amount must be greater than 0",
            )
            .expect("rejection should be predicted");
    }
}
