/// quick start - a few bills, one payroll, one forecast
use chrono::NaiveDate;
use ledger_forecast_rs::{
    EngineConfig, ForecastEngine, Horizon, InMemoryStorage, Money, PayrollConfig, RecurrenceRule,
    Storage,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== quick start ===\n");

    let mut storage = InMemoryStorage::new();
    storage.set_balance("C", Money::from_major(2_500));
    storage.set_payroll(
        PayrollConfig::biweekly(Money::from_major(2_800), NaiveDate::from_ymd_opt(2024, 1, 5).unwrap())
            .with_net_pay(Money::from_major(2_150)),
    );
    storage.add_rule(
        RecurrenceRule::builder()
            .name("Rent")
            .amount(Money::from_major(-1_650))
            .day_code(1)
            .account("C")
            .build()?,
    );
    storage.add_rule(
        RecurrenceRule::builder()
            .name("Phone")
            .amount(Money::from_major(-85))
            .day_code(32)
            .account("C")
            .build()?,
    );

    let mut engine = ForecastEngine::new(storage, EngineConfig::default())?;
    let horizon = Horizon::new(
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        NaiveDate::from_ymd_opt(2024, 2, 29).unwrap(),
    )?;

    let report = engine.regenerate(horizon, true)?;
    println!("generated {} entries", report.generated);

    for entry in engine.storage().load_entries()? {
        println!("  {}  {:<8} {:>10}", entry.date, entry.description, entry.amount);
    }

    let projection = engine.project(horizon)?;
    println!("\nstarting balance: ${}", projection.starting_balance);
    match projection.min_date {
        Some(_) if projection.never_dips() => println!("balance never drops below its start"),
        Some(date) => println!("minimum balance:  ${} on {}", projection.min_balance, date),
        None => println!("nothing scheduled"),
    }

    Ok(())
}
