use chrono::Datelike;

use crate::model::{LedgerEntry, RecurrenceRule};
use crate::schedule::{ExpansionContext, Horizon};
use crate::types::FrequencyKind;

/// expands day-of-month rules by walking the horizon one day at a time
pub struct CalendarExpander<'a> {
    ctx: &'a ExpansionContext<'a>,
}

impl<'a> CalendarExpander<'a> {
    pub fn new(ctx: &'a ExpansionContext<'a>) -> Self {
        Self { ctx }
    }

    pub fn expand(&self, rules: &[RecurrenceRule], horizon: Horizon) -> Vec<LedgerEntry> {
        let monthly: Vec<&RecurrenceRule> = rules
            .iter()
            .filter(|r| r.active && r.frequency_kind() == FrequencyKind::Monthly)
            .filter(|r| !self.ctx.is_excluded(r))
            .collect();

        let mut entries = Vec::new();
        for day in horizon.days() {
            for rule in &monthly {
                if rule.schedule.effective_day(day) != Some(day.day()) {
                    continue;
                }
                let amount = self.ctx.resolver.resolve(rule, day);
                // zero fixed amounts are placeholders; linked payments always fire
                if amount.is_zero() && !rule.is_linked_min_payment() {
                    continue;
                }
                entries.push(LedgerEntry::from_rule(rule, day, amount));
            }
        }
        entries
    }
}
