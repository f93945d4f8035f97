pub mod calendar;
pub mod interest;
pub mod monthly;
pub mod payday;
pub mod special;

use std::collections::BTreeSet;

use chrono::{Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{EngineConfig, HorizonConfig};
use crate::errors::{LedgerError, Result};
use crate::model::{LedgerEntry, PayrollConfig, RecurrenceRule};
use crate::payments::AmountResolver;
use crate::types::RuleId;

pub use interest::InterestChargeGenerator;
pub use monthly::CalendarExpander;
pub use payday::{MissingSplit, PaydayGenerator, PaydaySchedule};
pub use special::SpecialExpander;

/// inclusive date range walked by the expanders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Horizon {
    start: NaiveDate,
    end: NaiveDate,
}

impl Horizon {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if end < start {
            return Err(LedgerError::InvalidHorizon { start, end });
        }
        Ok(Self { start, end })
    }

    /// `months` nominal months of `days_per_month` days from `start`
    pub fn months(start: NaiveDate, months: u32, days_per_month: u32) -> Result<Self> {
        let days = i64::from(months)
            .checked_mul(i64::from(days_per_month))
            .ok_or(LedgerError::DateOutOfRange {
                start,
                days: i64::MAX,
            })?;
        Ok(Self {
            start,
            end: add_days(start, days)?,
        })
    }

    pub fn from_config(start: NaiveDate, config: &HorizonConfig) -> Result<Self> {
        Self::months(start, config.months, config.days_per_month)
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// every calendar day, start through end
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        std::iter::successors(Some(self.start), move |d| d.succ_opt().filter(|n| *n <= end))
    }
}

/// `start + days`, failing instead of overflowing the calendar
pub fn add_days(start: NaiveDate, days: i64) -> Result<NaiveDate> {
    Duration::try_days(days)
        .and_then(|delta| start.checked_add_signed(delta))
        .ok_or(LedgerError::DateOutOfRange { start, days })
}

/// inputs shared by all expanders
pub struct ExpansionContext<'a> {
    pub config: &'a EngineConfig,
    pub resolver: &'a AmountResolver,
    pub payroll: Option<&'a PayrollConfig>,
    /// rules handled outside the generic expanders
    pub excluded: &'a BTreeSet<RuleId>,
    /// stored entries that survive the run, seen by interest generation
    pub existing: &'a [LedgerEntry],
}

impl<'a> ExpansionContext<'a> {
    /// weekday biweekly charges are anchored to
    pub fn pay_weekday(&self) -> Weekday {
        self.payroll
            .map(|p| p.anchor_weekday)
            .unwrap_or(self.config.default_pay_weekday)
    }

    pub fn is_excluded(&self, rule: &RecurrenceRule) -> bool {
        rule.id.map(|id| self.excluded.contains(&id)).unwrap_or(false)
    }
}

/// output of a full expansion
#[derive(Debug, Clone, Default)]
pub struct Expansion {
    /// candidates ordered by date, stable within a day
    pub entries: Vec<LedgerEntry>,
    pub missing_splits: Vec<MissingSplit>,
}

/// run every expander over `horizon`
pub fn expand_all(
    ctx: &ExpansionContext<'_>,
    rules: &[RecurrenceRule],
    horizon: Horizon,
) -> Expansion {
    let mut entries = CalendarExpander::new(ctx).expand(rules, horizon);
    let monthly = entries.len();

    entries.extend(SpecialExpander::new(ctx).expand(rules, horizon));
    let special = entries.len() - monthly;

    let paydays = PaydayGenerator::new(ctx).generate(rules, horizon);
    let payday_count = paydays.entries.len();
    entries.extend(paydays.entries);

    let interest = InterestChargeGenerator::new(ctx).generate(rules, &entries, horizon);
    let interest_count = interest.len();
    entries.extend(interest);

    entries.sort_by_key(|e| e.date);

    debug!(
        start = %horizon.start,
        end = %horizon.end,
        monthly,
        special,
        paydays = payday_count,
        interest = interest_count,
        "expanded recurrence rules"
    );

    Expansion {
        entries,
        missing_splits: paydays.missing_splits,
    }
}
