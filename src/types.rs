use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::decimal::Money;

/// identity of a stored recurrence rule
pub type RuleId = u64;

/// identity of a stored ledger entry; lower ids were stored earlier
pub type EntryId = u64;

/// identity of a revolving credit account
pub type CardId = u64;

/// payment account identifier (pay type code such as "C")
pub type AccountCode = String;

/// how a rule's amount is determined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AmountKind {
    Fixed,
    LinkedMinPayment,
}

/// coarse recurrence family, derived from the day code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FrequencyKind {
    Monthly,
    Special,
}

/// minimum payment policy of a revolving account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum MinPaymentPolicy {
    /// pay the whole balance owed
    FullBalance,
    /// pay a fixed amount every cycle
    Fixed(Money),
    /// percentage of balance plus a month of interest, with a floor
    #[default]
    Calculated,
}

/// pay cadence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PayFrequency {
    Weekly,
    #[default]
    Biweekly,
    Semimonthly,
    Monthly,
}

impl PayFrequency {
    /// pay periods per year
    pub fn periods_per_year(&self) -> u32 {
        match self {
            PayFrequency::Weekly => 52,
            PayFrequency::Biweekly => 26,
            PayFrequency::Semimonthly => 24,
            PayFrequency::Monthly => 12,
        }
    }
}

/// payroll deduction kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeductionKind {
    Fixed(Money),
    /// fraction of gross (0.062 = 6.2%)
    Percentage(Decimal),
}

/// shared expense split policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SplitPolicy {
    #[default]
    Half,
    Third,
    /// ratio of the monthly amount owed, spread over the month's paychecks
    Custom(Decimal),
}

/// number of biweekly paychecks landing in a calendar month
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaycheckMonth {
    Two,
    Three,
}

impl PaycheckMonth {
    pub fn count(&self) -> u32 {
        match self {
            PaycheckMonth::Two => 2,
            PaycheckMonth::Three => 3,
        }
    }
}

/// where money beyond the minimums goes when paying down cards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PayoffStrategy {
    /// highest rate first
    Avalanche,
    /// lowest balance first
    Snowball,
    /// 60% rate, 40% small balance
    Hybrid,
    /// highest utilization first
    HighUtilization,
    /// minimums only
    CashOnHand,
}

impl PayoffStrategy {
    pub const ALL: [PayoffStrategy; 5] = [
        PayoffStrategy::Avalanche,
        PayoffStrategy::Snowball,
        PayoffStrategy::Hybrid,
        PayoffStrategy::HighUtilization,
        PayoffStrategy::CashOnHand,
    ];

    pub fn description(&self) -> &'static str {
        match self {
            PayoffStrategy::Avalanche => "highest interest rate first",
            PayoffStrategy::Snowball => "lowest balance first",
            PayoffStrategy::Hybrid => "weighted 60% rate and 40% balance",
            PayoffStrategy::HighUtilization => "highest utilization first",
            PayoffStrategy::CashOnHand => "minimum payments only",
        }
    }
}

/// how close a deferred-interest promotion is to expiring
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PromoRisk {
    Expired,
    /// under 60 days left
    High,
    /// under 90 days left
    Medium,
    Low,
}
