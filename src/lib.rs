pub mod config;
pub mod decimal;
pub mod engine;
pub mod errors;
pub mod events;
pub mod model;
pub mod payments;
pub mod projection;
pub mod regeneration;
pub mod schedule;
pub mod storage;
pub mod types;

// re-export key types
pub use config::{EngineConfig, HorizonConfig, InterestConfig, MinimumPaymentConfig, ReservedLabels};
pub use decimal::{Money, Rate};
pub use engine::ForecastEngine;
pub use errors::{LedgerError, Result};
pub use events::{Event, EventStore};
pub use model::{
    deferred_exposure, resolve_split_rules, AmountSource, Deduction, DeferredExposure,
    DeferredPurchase, DeferredPurchaseStatus, LedgerEntry, PayrollConfig, RecurrenceRule,
    RecurrenceRuleBuilder, RevolvingCreditAccount, Schedule, SharedExpense,
};
pub use payments::{
    minimum_payment, AmountResolver, MinimumPaymentCalculator, PayoffPayment, PayoffPlan,
    PayoffPlanner, ResolvedAmount,
};
pub use projection::{
    first_negative, minimum_in_window, project, running_balances, BalanceAlert, BalanceRow,
    NegativeBalance, Projection,
};
pub use regeneration::{dedup_plan, is_clearable, is_machine_attributable, RegenerationReport};
pub use schedule::{expand_all, ExpansionContext, Horizon};
pub use storage::{InMemoryStorage, Storage};
pub use types::{
    AccountCode, AmountKind, CardId, DeductionKind, EntryId, FrequencyKind, MinPaymentPolicy,
    PayFrequency, PaycheckMonth, PayoffStrategy, PromoRisk, RuleId, SplitPolicy,
};

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
pub use uuid::Uuid;
