use std::collections::BTreeMap;

use chrono::NaiveDate;
use tracing::debug;

use crate::decimal::Money;
use crate::errors::{LedgerError, Result};
use crate::model::{
    DeferredPurchase, LedgerEntry, PayrollConfig, RecurrenceRule, RevolvingCreditAccount,
};
use crate::storage::Storage;
use crate::types::{AccountCode, CardId, EntryId, RuleId};

#[derive(Debug, Clone, Default)]
struct Tables {
    rules: BTreeMap<RuleId, RecurrenceRule>,
    accounts: BTreeMap<CardId, RevolvingCreditAccount>,
    payroll: Option<PayrollConfig>,
    balances: BTreeMap<AccountCode, Money>,
    entries: BTreeMap<EntryId, LedgerEntry>,
    deferred: Vec<DeferredPurchase>,
    next_rule_id: RuleId,
    next_entry_id: EntryId,
}

/// storage kept entirely in memory, with snapshot transactions
#[derive(Debug, Clone, Default)]
pub struct InMemoryStorage {
    tables: Tables,
    snapshot: Option<Tables>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// store a rule, assigning an id when it has none
    pub fn add_rule(&mut self, mut rule: RecurrenceRule) -> RuleId {
        let id = match rule.id {
            Some(id) => id,
            None => {
                self.tables.next_rule_id += 1;
                self.tables.next_rule_id
            }
        };
        self.tables.next_rule_id = self.tables.next_rule_id.max(id);
        rule.id = Some(id);
        self.tables.rules.insert(id, rule);
        id
    }

    pub fn rule(&self, id: RuleId) -> Option<&RecurrenceRule> {
        self.tables.rules.get(&id)
    }

    pub fn deactivate_rule(&mut self, id: RuleId) -> Result<()> {
        let rule = self
            .tables
            .rules
            .get_mut(&id)
            .ok_or(LedgerError::RuleNotFound { id })?;
        rule.deactivate();
        Ok(())
    }

    pub fn add_account(&mut self, account: RevolvingCreditAccount) {
        self.tables.accounts.insert(account.id, account);
    }

    /// delete an account; rules linked to it keep their dangling reference
    pub fn remove_account(&mut self, id: CardId) -> Option<RevolvingCreditAccount> {
        self.tables.accounts.remove(&id)
    }

    pub fn account_mut(&mut self, id: CardId) -> Option<&mut RevolvingCreditAccount> {
        self.tables.accounts.get_mut(&id)
    }

    pub fn set_payroll(&mut self, payroll: PayrollConfig) {
        self.tables.payroll = Some(payroll);
    }

    pub fn clear_payroll(&mut self) {
        self.tables.payroll = None;
    }

    pub fn set_balance(&mut self, account: &str, balance: Money) {
        self.tables.balances.insert(account.to_string(), balance);
    }

    pub fn add_deferred_purchase(&mut self, mut purchase: DeferredPurchase) -> u64 {
        let id = self.tables.deferred.len() as u64 + 1;
        purchase.id = Some(id);
        self.tables.deferred.push(purchase);
        id
    }

    /// record a user-entered entry
    pub fn add_entry(&mut self, mut entry: LedgerEntry) -> EntryId {
        self.tables.next_entry_id += 1;
        let id = self.tables.next_entry_id;
        entry.id = Some(id);
        self.tables.entries.insert(id, entry);
        id
    }

    pub fn entry(&self, id: EntryId) -> Option<&LedgerEntry> {
        self.tables.entries.get(&id)
    }

    pub fn settle_entry(&mut self, id: EntryId, on: NaiveDate) -> Result<()> {
        let entry = self
            .tables
            .entries
            .get_mut(&id)
            .ok_or(LedgerError::EntryNotFound { id })?;
        entry.settle(on);
        Ok(())
    }

    pub fn entry_count(&self) -> usize {
        self.tables.entries.len()
    }

    pub fn in_transaction(&self) -> bool {
        self.snapshot.is_some()
    }
}

impl Storage for InMemoryStorage {
    fn load_active_rules(&self) -> Result<Vec<RecurrenceRule>> {
        Ok(self
            .tables
            .rules
            .values()
            .filter(|r| r.active)
            .cloned()
            .collect())
    }

    fn load_revolving_account(&self, id: CardId) -> Result<Option<RevolvingCreditAccount>> {
        Ok(self.tables.accounts.get(&id).cloned())
    }

    fn load_revolving_accounts(&self) -> Result<Vec<RevolvingCreditAccount>> {
        Ok(self.tables.accounts.values().cloned().collect())
    }

    fn load_current_payroll(&self) -> Result<Option<PayrollConfig>> {
        Ok(self.tables.payroll.clone().filter(|p| p.current))
    }

    fn load_starting_balances(&self) -> Result<BTreeMap<AccountCode, Money>> {
        Ok(self.tables.balances.clone())
    }

    fn load_deferred_purchases(&self) -> Result<Vec<DeferredPurchase>> {
        Ok(self.tables.deferred.clone())
    }

    fn load_entries(&self) -> Result<Vec<LedgerEntry>> {
        // id order from the map, then a stable sort by date
        let mut entries: Vec<LedgerEntry> = self.tables.entries.values().cloned().collect();
        entries.sort_by_key(|e| e.date);
        Ok(entries)
    }

    fn insert_entries(&mut self, entries: Vec<LedgerEntry>) -> Result<Vec<EntryId>> {
        Ok(entries.into_iter().map(|e| self.add_entry(e)).collect())
    }

    fn delete_entries(&mut self, predicate: &dyn Fn(&LedgerEntry) -> bool) -> Result<usize> {
        let before = self.tables.entries.len();
        self.tables.entries.retain(|_, e| !predicate(e));
        Ok(before - self.tables.entries.len())
    }

    fn delete_entry_ids(&mut self, ids: &[EntryId]) -> Result<usize> {
        Ok(ids
            .iter()
            .filter(|id| self.tables.entries.remove(*id).is_some())
            .count())
    }

    fn begin(&mut self) -> Result<()> {
        if self.snapshot.is_some() {
            return Err(LedgerError::TransactionState {
                message: "transaction already open".to_string(),
            });
        }
        self.snapshot = Some(self.tables.clone());
        Ok(())
    }

    fn commit(&mut self) -> Result<()> {
        self.snapshot
            .take()
            .map(|_| ())
            .ok_or_else(|| LedgerError::TransactionState {
                message: "commit without an open transaction".to_string(),
            })
    }

    fn rollback(&mut self) -> Result<()> {
        let snapshot = self
            .snapshot
            .take()
            .ok_or_else(|| LedgerError::TransactionState {
                message: "rollback without an open transaction".to_string(),
            })?;
        debug!(
            discarded = self.tables.entries.len() as i64 - snapshot.entries.len() as i64,
            "rolled back in-memory transaction"
        );
        self.tables = snapshot;
        Ok(())
    }
}
