pub mod memory;

use std::collections::BTreeMap;

use crate::decimal::Money;
use crate::errors::Result;
use crate::model::{
    DeferredPurchase, LedgerEntry, PayrollConfig, RecurrenceRule, RevolvingCreditAccount,
};
use crate::types::{AccountCode, CardId, EntryId};

pub use memory::InMemoryStorage;

/// persistence collaborator injected into the engine
///
/// Calls are synchronous and immediately visible to later reads. Writes made
/// between `begin` and `commit` are discarded by `rollback`.
pub trait Storage {
    fn load_active_rules(&self) -> Result<Vec<RecurrenceRule>>;
    fn load_revolving_account(&self, id: CardId) -> Result<Option<RevolvingCreditAccount>>;
    fn load_revolving_accounts(&self) -> Result<Vec<RevolvingCreditAccount>>;
    fn load_current_payroll(&self) -> Result<Option<PayrollConfig>>;
    fn load_starting_balances(&self) -> Result<BTreeMap<AccountCode, Money>>;
    fn load_deferred_purchases(&self) -> Result<Vec<DeferredPurchase>>;
    /// all entries ordered by date, then id
    fn load_entries(&self) -> Result<Vec<LedgerEntry>>;

    /// store new entries, returning their assigned ids in input order
    fn insert_entries(&mut self, entries: Vec<LedgerEntry>) -> Result<Vec<EntryId>>;
    fn delete_entries(&mut self, predicate: &dyn Fn(&LedgerEntry) -> bool) -> Result<usize>;
    fn delete_entry_ids(&mut self, ids: &[EntryId]) -> Result<usize>;

    fn begin(&mut self) -> Result<()>;
    fn commit(&mut self) -> Result<()>;
    fn rollback(&mut self) -> Result<()>;
}
