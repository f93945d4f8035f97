pub mod credit_card;
pub mod deferred;
pub mod entry;
pub mod payroll;
pub mod rule;
pub mod split;

pub use credit_card::RevolvingCreditAccount;
pub use deferred::{deferred_exposure, DeferredExposure, DeferredPurchase, DeferredPurchaseStatus};
pub use entry::{DedupKey, LedgerEntry};
pub use payroll::{Deduction, PayrollConfig};
pub use rule::{AmountSource, RecurrenceRule, RecurrenceRuleBuilder, Schedule};
pub use split::{resolve_split_rules, total_split, SharedExpense};
