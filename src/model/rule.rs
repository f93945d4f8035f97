use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::errors::{LedgerError, Result};
use crate::schedule::calendar;
use crate::types::{AccountCode, AmountKind, CardId, FrequencyKind, RuleId};

/// day code meaning "last day of the month"
pub const LAST_DAY_CODE: u16 = 32;
/// day code of the biweekly payday-anchored schedule
pub const BIWEEKLY_CODE: u16 = 991;
/// day codes charged monthly on the 15th
pub const FIFTEENTH_CODES: std::ops::RangeInclusive<u16> = 992..=995;
/// day codes reserved for the shared-expense split sentinels
pub const SPLIT_SENTINEL_CODES: std::ops::RangeInclusive<u16> = 996..=999;

/// when a recurrence rule fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Schedule {
    /// fixed day of month, 1..=31; months too short for it are skipped
    DayOfMonth(u8),
    /// last calendar day of every month
    LastDayOfMonth,
    /// every other payday, anchored on the pay weekday
    BiweeklyAnchored,
    /// monthly on the 15th (codes 992..=995)
    MonthlyOnFifteenth(u16),
    /// shared-expense split amount consumed by payday generation (codes 996..=999)
    SplitSentinel(u16),
}

impl Schedule {
    /// decode a stored day code
    pub fn from_day_code(code: u16) -> Result<Self> {
        match code {
            1..=31 => Ok(Schedule::DayOfMonth(code as u8)),
            LAST_DAY_CODE => Ok(Schedule::LastDayOfMonth),
            BIWEEKLY_CODE => Ok(Schedule::BiweeklyAnchored),
            c if FIFTEENTH_CODES.contains(&c) => Ok(Schedule::MonthlyOnFifteenth(c)),
            c if SPLIT_SENTINEL_CODES.contains(&c) => Ok(Schedule::SplitSentinel(c)),
            _ => Err(LedgerError::InvalidDayCode { code }),
        }
    }

    /// encode as a stored day code
    pub fn day_code(&self) -> u16 {
        match self {
            Schedule::DayOfMonth(day) => *day as u16,
            Schedule::LastDayOfMonth => LAST_DAY_CODE,
            Schedule::BiweeklyAnchored => BIWEEKLY_CODE,
            Schedule::MonthlyOnFifteenth(code) | Schedule::SplitSentinel(code) => *code,
        }
    }

    pub fn frequency_kind(&self) -> FrequencyKind {
        match self {
            Schedule::DayOfMonth(_) | Schedule::LastDayOfMonth => FrequencyKind::Monthly,
            _ => FrequencyKind::Special,
        }
    }

    /// day this schedule fires in the month containing `date`, for monthly schedules
    pub fn effective_day(&self, date: NaiveDate) -> Option<u32> {
        match self {
            Schedule::DayOfMonth(day) => Some(*day as u32),
            Schedule::LastDayOfMonth => Some(calendar::last_day_of_month(date)),
            _ => None,
        }
    }

    fn validate(&self) -> Result<()> {
        let code = self.day_code();
        let valid = match self {
            Schedule::DayOfMonth(day) => (1..=31).contains(day),
            Schedule::LastDayOfMonth | Schedule::BiweeklyAnchored => true,
            Schedule::MonthlyOnFifteenth(c) => FIFTEENTH_CODES.contains(c),
            Schedule::SplitSentinel(c) => SPLIT_SENTINEL_CODES.contains(c),
        };
        if valid {
            Ok(())
        } else {
            Err(LedgerError::InvalidDayCode { code })
        }
    }
}

/// where a rule's amount comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum AmountSource {
    /// the rule's nominal amount
    #[default]
    Fixed,
    /// minimum payment of a linked revolving account; `None` once the link is broken
    LinkedMinPayment { account: Option<CardId> },
}

impl AmountSource {
    pub fn kind(&self) -> AmountKind {
        match self {
            AmountSource::Fixed => AmountKind::Fixed,
            AmountSource::LinkedMinPayment { .. } => AmountKind::LinkedMinPayment,
        }
    }
}

/// recurring charge definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurrenceRule {
    pub id: Option<RuleId>,
    pub name: String,
    /// nominal signed amount, negative for outflows
    pub amount: Money,
    pub account: AccountCode,
    pub schedule: Schedule,
    pub amount_source: AmountSource,
    pub active: bool,
}

impl RecurrenceRule {
    pub fn builder() -> RecurrenceRuleBuilder {
        RecurrenceRuleBuilder::new()
    }

    pub fn day_code(&self) -> u16 {
        self.schedule.day_code()
    }

    pub fn frequency_kind(&self) -> FrequencyKind {
        self.schedule.frequency_kind()
    }

    pub fn amount_kind(&self) -> AmountKind {
        self.amount_source.kind()
    }

    pub fn is_linked_min_payment(&self) -> bool {
        self.amount_kind() == AmountKind::LinkedMinPayment
    }

    /// revolving account this rule pays, if still linked
    pub fn linked_account(&self) -> Option<CardId> {
        match self.amount_source {
            AmountSource::LinkedMinPayment { account } => account,
            AmountSource::Fixed => None,
        }
    }

    pub fn is_split_sentinel(&self) -> bool {
        matches!(self.schedule, Schedule::SplitSentinel(_))
    }

    /// stop future generation; existing entries keep their reference
    pub fn deactivate(&mut self) {
        self.active = false;
    }

    /// drop the link after the referenced account was deleted
    pub fn unlink_account(&mut self) {
        if let AmountSource::LinkedMinPayment { account } = &mut self.amount_source {
            *account = None;
        }
    }
}

/// builder for recurrence rules
pub struct RecurrenceRuleBuilder {
    id: Option<RuleId>,
    name: Option<String>,
    amount: Money,
    account: Option<AccountCode>,
    schedule: Option<Schedule>,
    day_code: Option<u16>,
    amount_source: AmountSource,
    active: bool,
}

impl RecurrenceRuleBuilder {
    pub fn new() -> Self {
        Self {
            id: None,
            name: None,
            amount: Money::ZERO,
            account: None,
            schedule: None,
            day_code: None,
            amount_source: AmountSource::Fixed,
            active: true,
        }
    }

    pub fn id(mut self, id: RuleId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn amount(mut self, amount: Money) -> Self {
        self.amount = amount;
        self
    }

    pub fn account(mut self, account: &str) -> Self {
        self.account = Some(account.to_string());
        self
    }

    pub fn schedule(mut self, schedule: Schedule) -> Self {
        self.schedule = Some(schedule);
        self
    }

    /// stored day code; decoded at build time
    pub fn day_code(mut self, code: u16) -> Self {
        self.day_code = Some(code);
        self
    }

    /// pay the minimum payment of a revolving account
    pub fn linked_min_payment(mut self, account: CardId) -> Self {
        self.amount_source = AmountSource::LinkedMinPayment {
            account: Some(account),
        };
        self
    }

    pub fn amount_source(mut self, source: AmountSource) -> Self {
        self.amount_source = source;
        self
    }

    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    pub fn build(self) -> Result<RecurrenceRule> {
        let name = self
            .name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .ok_or_else(|| LedgerError::InvalidRule {
                name: String::new(),
                message: "name required".to_string(),
            })?;

        let schedule = match (self.schedule, self.day_code) {
            (Some(schedule), _) => {
                schedule.validate()?;
                schedule
            }
            (None, Some(code)) => Schedule::from_day_code(code)?,
            (None, None) => {
                return Err(LedgerError::InvalidRule {
                    name,
                    message: "schedule or day code required".to_string(),
                })
            }
        };

        let account = self
            .account
            .filter(|a| !a.trim().is_empty())
            .ok_or_else(|| LedgerError::InvalidRule {
                name: name.clone(),
                message: "payment account required".to_string(),
            })?;

        Ok(RecurrenceRule {
            id: self.id,
            name,
            amount: self.amount,
            account,
            schedule,
            amount_source: self.amount_source,
            active: self.active,
        })
    }
}

impl Default for RecurrenceRuleBuilder {
    fn default() -> Self {
        Self::new()
    }
}
