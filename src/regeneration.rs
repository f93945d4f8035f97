use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::ReservedLabels;
use crate::errors::Result;
use crate::model::LedgerEntry;
use crate::schedule::Horizon;
use crate::types::{EntryId, RuleId};

/// true for entries the engine may delete in bulk
///
/// An entry qualifies when it references a rule, carries one of the reserved
/// labels, or is a generated card interest charge. Everything else was entered
/// by the user.
pub fn is_machine_attributable(entry: &LedgerEntry, labels: &ReservedLabels) -> bool {
    entry.rule_id.is_some()
        || labels.reserved().contains(&entry.description.as_str())
        || labels.is_interest_label(&entry.description)
}

/// machine-attributable, unsettled and dated on or after `from`
pub fn is_clearable(entry: &LedgerEntry, from: NaiveDate, labels: &ReservedLabels) -> bool {
    entry.date >= from && !entry.settled && is_machine_attributable(entry, labels)
}

/// ids to delete so that each duplicate group keeps only its lowest id
pub fn dedup_plan(entries: &[LedgerEntry]) -> Vec<EntryId> {
    let mut groups: BTreeMap<_, Vec<EntryId>> = BTreeMap::new();
    for entry in entries {
        if let Some(id) = entry.id {
            groups.entry(entry.dedup_key()).or_default().push(id);
        }
    }

    let mut doomed: Vec<EntryId> = groups
        .into_values()
        .filter(|ids| ids.len() > 1)
        .flat_map(|mut ids| {
            ids.sort_unstable();
            ids.into_iter().skip(1)
        })
        .collect();
    doomed.sort_unstable();
    doomed
}

/// drop candidates that an already settled entry covers
///
/// Rule-backed candidates match on `(rule, date)`, the rest on `(description, date)`.
/// Returns the surviving candidates and how many were dropped.
pub fn skip_settled(
    candidates: Vec<LedgerEntry>,
    stored: &[LedgerEntry],
) -> (Vec<LedgerEntry>, usize) {
    let settled = stored.iter().filter(|e| e.settled);
    let by_rule: BTreeSet<(RuleId, NaiveDate)> = settled
        .clone()
        .filter_map(|e| e.rule_id.map(|id| (id, e.date)))
        .collect();
    let by_description: BTreeSet<(&str, NaiveDate)> =
        settled.map(|e| (e.description.as_str(), e.date)).collect();

    let before = candidates.len();
    let kept: Vec<LedgerEntry> = candidates
        .into_iter()
        .filter(|c| match c.rule_id {
            Some(id) => !by_rule.contains(&(id, c.date)),
            None => !by_description.contains(&(c.description.as_str(), c.date)),
        })
        .collect();
    let skipped = before - kept.len();
    (kept, skipped)
}

/// summary of one regeneration run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegenerationReport {
    pub run_id: Uuid,
    pub horizon: Horizon,
    pub cleared: usize,
    pub generated: usize,
    /// candidates dropped because a settled entry already covers them
    pub skipped: usize,
    pub entry_ids: Vec<EntryId>,
}

impl RegenerationReport {
    pub fn json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
