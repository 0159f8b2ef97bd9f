use cosmwasm_std::Coin;

/// Per-transaction fee charged by the simulated chain. Overridable through
/// the environment so suites can model fee-less or expensive networks.
pub fn get_fee() -> Coin {
    let amount = dotenv::var("TIDEPOOL_FEE_AMOUNT")
        .ok()
        .and_then(|raw| raw.parse::<u128>().ok())
        .unwrap_or(15_000);
    let denom = dotenv::var("TIDEPOOL_FEE_DENOM").unwrap_or_else(|_| "uluna".to_string());
    Coin::new(amount, denom)
}
