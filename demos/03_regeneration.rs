/// regeneration - clearing machine entries, keeping user entries, removing duplicates
use chrono::{Duration, NaiveDate, TimeZone, Utc};
use ledger_forecast_rs::{
    EngineConfig, Event, ForecastEngine, Horizon, InMemoryStorage, LedgerEntry, Money,
    PayrollConfig, RecurrenceRule, SafeTimeProvider, TimeSource,
};
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::from_default_env().add_directive("ledger_forecast_rs=debug".parse()?);
    fmt().with_env_filter(filter).init();

    println!("=== regeneration ===\n");

    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()
    ));
    let controller = time.test_control().unwrap();

    let mut storage = InMemoryStorage::new();
    storage.set_balance("C", Money::from_major(4_000));
    storage.set_payroll(
        PayrollConfig::biweekly(Money::from_major(2_600), NaiveDate::from_ymd_opt(2024, 3, 8).unwrap())
            .with_net_pay(Money::from_major(2_050)),
    );
    let rent = storage.add_rule(
        RecurrenceRule::builder()
            .name("Rent")
            .amount(Money::from_major(-1_500))
            .day_code(1)
            .account("C")
            .build()?,
    );
    let gift = storage.add_entry(LedgerEntry::manual(
        NaiveDate::from_ymd_opt(2024, 3, 20).unwrap(),
        "Birthday gift",
        Money::from_major(-75),
        "C",
    ));

    let mut engine = ForecastEngine::new(storage, EngineConfig::default())?;
    let first = engine.regenerate_with_time(&time, true)?;
    println!("first run:  generated {}, cleared {}", first.generated, first.cleared);

    // a month later rent goes up and the forecast is rebuilt from today
    controller.advance(Duration::days(31));
    engine.storage_mut().deactivate_rule(rent)?;
    engine.storage_mut().add_rule(
        RecurrenceRule::builder()
            .name("Rent")
            .amount(Money::from_major(-1_575))
            .day_code(1)
            .account("C")
            .build()?,
    );
    let second = engine.regenerate_with_time(&time, true)?;
    println!("second run: generated {}, cleared {}", second.generated, second.cleared);
    println!("user entry kept: {}", engine.storage().entry(gift).is_some());

    // appending without clearing duplicates every generated entry
    let today = time.now().date_naive();
    let horizon = Horizon::new(today, today + Duration::days(30))?;
    engine.regenerate(horizon, false)?;
    let removed = engine.dedup()?;
    println!("duplicates removed: {}", removed);

    println!("\nevents:");
    for event in engine.take_events() {
        match event {
            Event::RegenerationStarted { run_id, start, end, .. } => {
                println!("  run {} over {} .. {}", run_id, start, end)
            }
            Event::EntriesCleared { count, from, .. } => println!("  cleared {} from {}", count, from),
            Event::EntriesGenerated { count, .. } => println!("  generated {}", count),
            Event::DuplicatesRemoved { count } => println!("  removed {} duplicates", count),
            other => println!("  {:?}", other),
        }
    }

    Ok(())
}
