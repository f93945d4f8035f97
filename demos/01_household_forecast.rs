/// household forecast - paydays, biweekly mortgage, 15th-of-month charges and the shared-expense split
use chrono::{TimeZone, Utc, Weekday};
use ledger_forecast_rs::{
    resolve_split_rules, Deduction, EngineConfig, ForecastEngine, InMemoryStorage, Money,
    PayrollConfig, RecurrenceRule, SafeTimeProvider, SharedExpense, SplitPolicy, Storage,
    TimeSource,
};
use rust_decimal_macros::dec;
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::from_default_env().add_directive("ledger_forecast_rs=info".parse()?);
    fmt().with_env_filter(filter).init();

    println!("=== household forecast ===\n");

    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap()
    ));
    let config = EngineConfig::household("C", Weekday::Fri);

    let mut storage = InMemoryStorage::new();
    storage.set_balance("C", Money::from_major(1_800));
    storage.set_payroll(
        PayrollConfig::biweekly(Money::from_major(3_400), chrono::NaiveDate::from_ymd_opt(2024, 1, 5).unwrap())
            .with_deduction(Deduction::fixed("Federal tax", Money::from_major(520)))
            .with_deduction(Deduction::percentage("Retirement", dec!(0.06))),
    );

    storage.add_rule(
        RecurrenceRule::builder()
            .name("Mortgage")
            .amount(Money::from_major(-780))
            .day_code(991)
            .account("C")
            .build()?,
    );
    storage.add_rule(
        RecurrenceRule::builder()
            .name("Car Insurance")
            .amount(Money::from_major(-142))
            .day_code(992)
            .account("C")
            .build()?,
    );
    storage.add_rule(
        RecurrenceRule::builder()
            .name("Utilities")
            .amount(Money::from_major(-210))
            .day_code(12)
            .account("C")
            .build()?,
    );

    // shared expenses become the two split rules
    let shared = vec![
        SharedExpense::new("Daycare", Money::from_major(1_200), SplitPolicy::Half),
        SharedExpense::new("Groceries", Money::from_major(600), SplitPolicy::Custom(dec!(0.5))),
    ];
    let (two, three) = resolve_split_rules(&shared, &config.labels, &config.primary_account)?;
    println!("split per paycheck: {} in 2-paycheck months, {} in 3-paycheck months", two.amount, three.amount);
    storage.add_rule(two);
    storage.add_rule(three);

    let mut engine = ForecastEngine::new(storage, config)?;
    if let Some(report) = engine.ensure_forecast_with_time(&time)? {
        println!("first run: generated {} entries through {}\n", report.generated, report.horizon.end());
    }

    for entry in engine.storage().load_entries()? {
        let note = entry.note.as_deref().unwrap_or("");
        println!("  {}  {:<14} {:>10}  {}", entry.date, entry.description, entry.amount, note);
    }

    let alert = engine.minimum_balance_alert_with_time(&time)?;
    println!("\n{}", alert.json()?);

    Ok(())
}
