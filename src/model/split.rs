use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::ReservedLabels;
use crate::decimal::Money;
use crate::errors::Result;
use crate::model::rule::{RecurrenceRule, Schedule};
use crate::types::{PaycheckMonth, SplitPolicy};

/// day code given to the 2-paycheck split sentinel
pub const SPLIT_TWO_CODE: u16 = 996;
/// day code given to the 3-paycheck split sentinel
pub const SPLIT_THREE_CODE: u16 = 997;

/// an expense shared with another household member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SharedExpense {
    pub name: String,
    pub monthly_amount: Money,
    pub policy: SplitPolicy,
}

impl SharedExpense {
    pub fn new(name: &str, monthly_amount: Money, policy: SplitPolicy) -> Self {
        Self {
            name: name.to_string(),
            monthly_amount,
            policy,
        }
    }

    /// share owed per paycheck
    pub fn split_amount(&self, month: PaycheckMonth) -> Money {
        let paychecks = Decimal::from(month.count());
        match self.policy {
            SplitPolicy::Custom(ratio) if !ratio.is_zero() => {
                self.monthly_amount * ratio / paychecks
            }
            SplitPolicy::Third => self.monthly_amount / Decimal::from(3),
            _ if month == PaycheckMonth::Three => self.monthly_amount / Decimal::from(3),
            _ => self.monthly_amount / Decimal::from(2),
        }
    }
}

/// per-paycheck total over all shared expenses
pub fn total_split(expenses: &[SharedExpense], month: PaycheckMonth) -> Money {
    expenses.iter().map(|e| e.split_amount(month)).sum()
}

/// pre-resolve shared expenses into the two split sentinel rules (2- and 3-paycheck)
pub fn resolve_split_rules(
    expenses: &[SharedExpense],
    labels: &ReservedLabels,
    account: &str,
) -> Result<(RecurrenceRule, RecurrenceRule)> {
    let two = RecurrenceRule::builder()
        .name(&labels.split_two)
        .amount(total_split(expenses, PaycheckMonth::Two).round_cents().as_outflow())
        .schedule(Schedule::SplitSentinel(SPLIT_TWO_CODE))
        .account(account)
        .build()?;
    let three = RecurrenceRule::builder()
        .name(&labels.split_three)
        .amount(total_split(expenses, PaycheckMonth::Three).round_cents().as_outflow())
        .schedule(Schedule::SplitSentinel(SPLIT_THREE_CODE))
        .account(account)
        .build()?;
    Ok((two, three))
}
