//! Pool Repay Tests - paying debt down and off, refunds included.

#[cfg(test)]
mod tests {
    use crate::addresses::addresses;
    use crate::pool::fixture::PoolFixture;
    use tidepool_test_framework::prelude::*;

    fn setup_fixture() -> PoolFixture {
        PoolFixture::new().expect("Failed to create fixture")
    }

    /// Bob owes 4M uluna against uusd collateral, 30 days of interest
    /// pending.
    fn setup_seasoned_debt() -> PoolFixture {
        let mut fixture = setup_fixture();
        fixture
            .deposit(addresses::ALICE, "uluna", 10_000_000)
            .expect("alice's deposit should reconcile");
        fixture
            .deposit(addresses::BOB, "uusd", 10_000_000)
            .expect("bob's collateral deposit should reconcile");
        fixture
            .borrow(addresses::BOB, "uluna", 4_000_000)
            .expect("borrow should reconcile");
        fixture.warp(30 * time::DAY);
        fixture
    }

    /// Test: Partial repays shrink scaled debt by the floored quotient
    #[test]
    fn test_should_shrink_debt_on_partial_repay() {
        let mut fixture = setup_seasoned_debt();
        let bob = addresses::BOB;

        fixture
            .repay(bob, "uluna", 200_000)
            .expect("partial repay should reconcile");

        fixture
            .engine
            .assert_indices("uluna", "1.052602739726027397", "1.131506849315068492");
        // 200_000 / 1.1315... scaled units come off the books.
        fixture.engine.assert_debt_scaled(bob, "uluna", 3_823_245);
        fixture.engine.assert_contract_balance("uluna", 6_200_000);
        fixture.engine.assert_user_balance(bob, "uluna", 103_755_000);
        fixture
            .engine
            .assert_rates("uluna", "1.643935361366639092", "0.675630868087915564");
    }

    /// Test: Overpaying clears the debt and refunds the excess
    #[test]
    fn test_should_refund_overpayment_and_zero_the_debt() {
        let mut fixture = setup_seasoned_debt();
        let bob = addresses::BOB;

        fixture
            .repay(bob, "uluna", 200_000)
            .expect("partial repay should reconcile");
        // Owed after the partial repay is 4_326_027; pay 100_000 over.
        let reserve = fixture
            .repay(bob, "uluna", 4_426_027)
            .expect("closing repay should reconcile");

        fixture.engine.assert_debt_scaled(bob, "uluna", 0);
        assert_eq!(reserve.debt_total_scaled, Uint128::zero());
        fixture.engine.assert_rates("uluna", "0", "0");
        // The refund never reaches the pool's books.
        fixture.engine.assert_contract_balance("uluna", 10_526_029);
        fixture.engine.assert_user_balance(bob, "uluna", 99_413_971);
        // Indices are cumulative and survive the debt closing.
        fixture
            .engine
            .assert_indices("uluna", "1.052602739726027397", "1.131506849315068492");
    }

    /// Test: Repaying with no debt outstanding is rejected
    #[test]
    fn test_should_reject_repay_without_debt() {
        let mut fixture = setup_fixture();

        fixture
            .deposit(addresses::ALICE, "uluna", 10_000_000)
            .expect("deposit should reconcile");
        fixture
            .expect_repay_rejection(addresses::ALICE, "uluna", 100, "Cannot repay 0 debt")
            .expect("rejection should be predicted");
        assert_eq!(fixture.engine.phase(), Phase::Idle);
    }

    /// Test: Zero-amount repays are rejected before the debt check
    #[test]
    fn test_should_reject_zero_repay() {
        let mut fixture = setup_fixture();

        fixture
            .expect_repay_rejection(
                addresses::ALICE,
                "uluna",
                0,
                "Repay amount must be greater than 0",
            )
            .expect("rejection should be predicted");
    }

    /// Test: Repays to unlisted denoms are rejected
    #[test]
    fn test_should_reject_unknown_reserve() {
        let mut fixture = setup_fixture();

        fixture
            .expect_repay_rejection(addresses::ALICE, "uatom", 0, "uatom reserve not found")
            .expect("rejection should be predicted");
    }
}
