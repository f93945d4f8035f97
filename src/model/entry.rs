use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::model::rule::RecurrenceRule;
use crate::types::{AccountCode, EntryId, RuleId};

/// a dated ledger line, entered by the user or generated by the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// assigned by storage
    pub id: Option<EntryId>,
    pub date: NaiveDate,
    pub description: String,
    pub amount: Money,
    pub account: AccountCode,
    /// rule that produced this entry
    pub rule_id: Option<RuleId>,
    pub settled: bool,
    pub settled_on: Option<NaiveDate>,
    pub note: Option<String>,
}

/// grouping key for exact duplicates
pub type DedupKey = (NaiveDate, AccountCode, String, Money);

impl LedgerEntry {
    /// user-entered entry
    pub fn manual(date: NaiveDate, description: &str, amount: Money, account: &str) -> Self {
        Self {
            id: None,
            date,
            description: description.to_string(),
            amount,
            account: account.to_string(),
            rule_id: None,
            settled: false,
            settled_on: None,
            note: None,
        }
    }

    /// entry generated from a recurrence rule
    pub fn from_rule(rule: &RecurrenceRule, date: NaiveDate, amount: Money) -> Self {
        Self {
            rule_id: rule.id,
            ..Self::manual(date, &rule.name, amount, &rule.account)
        }
    }

    pub fn with_rule(mut self, rule_id: Option<RuleId>) -> Self {
        self.rule_id = rule_id;
        self
    }

    pub fn with_account(mut self, account: &str) -> Self {
        self.account = account.to_string();
        self
    }

    pub fn with_note(mut self, note: &str) -> Self {
        self.note = Some(note.to_string());
        self
    }

    pub fn settle(&mut self, on: NaiveDate) {
        self.settled = true;
        self.settled_on = Some(on);
    }

    pub fn unsettle(&mut self) {
        self.settled = false;
        self.settled_on = None;
    }

    pub fn dedup_key(&self) -> DedupKey {
        (
            self.date,
            self.account.clone(),
            self.description.clone(),
            self.amount,
        )
    }
}
