/// linked card payment - a bill whose amount follows a card's minimum payment
use chrono::NaiveDate;
use ledger_forecast_rs::{
    minimum_payment, running_balances, EngineConfig, ForecastEngine, Horizon, InMemoryStorage,
    LedgerEntry, Money, PayoffPlanner, Rate, RecurrenceRule, RevolvingCreditAccount, Storage,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== linked card payment ===\n");

    let visa = RevolvingCreditAccount::new(1, "V", "Visa", Money::from_major(5_000))
        .with_balance(Money::from_major(1_000))
        .with_rate(Rate::from_percentage(18))
        .with_due_day(10);
    println!("visa balance: ${}", visa.balance);
    println!("  apr: {}", visa.annual_rate);
    println!("  minimum payment: ${}", minimum_payment(&visa));

    let mut storage = InMemoryStorage::new();
    storage.set_balance("C", Money::from_major(3_000));
    storage.add_account(visa.clone());
    storage.add_rule(
        RecurrenceRule::builder()
            .name("Visa Payment")
            .amount(Money::from_major(-100))
            .day_code(20)
            .account("C")
            .linked_min_payment(visa.id)
            .build()?,
    );
    storage.add_entry(LedgerEntry::manual(
        NaiveDate::from_ymd_opt(2024, 1, 8).unwrap(),
        "Groceries",
        Money::from_major(-180),
        "V",
    ));

    let horizon = Horizon::new(
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
    )?;
    let mut engine = ForecastEngine::new(storage, EngineConfig::default())?;
    engine.regenerate(horizon, true)?;

    let entries = engine.storage().load_entries()?;
    let rules = engine.storage().load_active_rules()?;
    let starting = engine.storage().load_starting_balances()?;
    println!("\nrunning balances:");
    for row in running_balances(&starting, &entries, &[visa.clone()], &rules) {
        println!(
            "  {}  {:<14} {:>9}   checking {:>9}   visa owed {:>8}   utilization {}",
            row.entry.date,
            row.entry.description,
            row.entry.amount,
            row.balances["C"],
            row.balances["V"],
            row.utilization,
        );
    }

    println!("\npaying the card down with $150 a month extra:");
    let start = NaiveDate::from_ymd_opt(2024, 4, 1).unwrap();
    for plan in PayoffPlanner::default().compare(&[visa], Money::from_major(150), start) {
        println!(
            "  {:<16} {:>3} months   interest ${:>8}   done {}",
            plan.strategy.description(),
            plan.months,
            plan.total_interest,
            plan.payoff_date,
        );
    }

    // the account is deleted; the payment falls back to its nominal amount
    engine.storage_mut().remove_account(1);
    let fallback = engine.generate(horizon)?;
    if let Some(payment) = fallback.iter().find(|e| e.description == "Visa Payment") {
        println!("\nafter removing the card the payment forecasts ${}", payment.amount);
    }

    Ok(())
}
