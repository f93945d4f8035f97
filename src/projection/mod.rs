pub mod minimum;
pub mod running;

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::model::LedgerEntry;
use crate::types::AccountCode;

pub use minimum::{first_negative, minimum_in_window, BalanceAlert, NegativeBalance};
pub use running::{running_balances, BalanceRow};

/// outcome of replaying entries against starting balances
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projection {
    pub account: AccountCode,
    pub starting_balance: Money,
    /// lowest running balance of the watched account, starting balance included
    pub min_balance: Money,
    /// first date the minimum was reached
    ///
    /// `None` only for empty input. When the balance never dips below its
    /// start this is the date of the first entry.
    pub min_date: Option<NaiveDate>,
    pub closing_balances: BTreeMap<AccountCode, Money>,
}

impl Projection {
    /// true when there was nothing to replay
    pub fn is_flat(&self) -> bool {
        self.min_date.is_none()
    }

    /// true when the watched account never drops below its starting balance
    pub fn never_dips(&self) -> bool {
        self.min_balance >= self.starting_balance
    }
}

/// replay `entries` in the order given, watching `primary`
///
/// Entries must already be ordered by date then id. Accounts missing from
/// `starting` start at zero.
pub fn project(
    starting: &BTreeMap<AccountCode, Money>,
    entries: &[LedgerEntry],
    primary: &str,
) -> Projection {
    let mut balances = starting.clone();
    let starting_balance = starting.get(primary).copied().unwrap_or(Money::ZERO);
    let mut min_balance = starting_balance;
    let mut min_date = None;

    for entry in entries {
        let balance = balances.entry(entry.account.clone()).or_insert(Money::ZERO);
        *balance += entry.amount;
        // strict comparison keeps the earliest date on ties
        if entry.account == primary && *balance < min_balance {
            min_balance = *balance;
            min_date = Some(entry.date);
        }
    }

    Projection {
        account: primary.to_string(),
        starting_balance,
        min_balance,
        min_date: min_date.or_else(|| entries.first().map(|e| e.date)),
        closing_balances: balances,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(n: i64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 7, 1).unwrap() + chrono::Duration::days(n)
    }

    fn starting(primary: i64) -> BTreeMap<AccountCode, Money> {
        [("C".to_string(), Money::from_major(primary))].into_iter().collect()
    }

    #[test]
    fn test_minimum_reached_late_in_horizon() {
        let entries = vec![
            LedgerEntry::manual(day(0), "Payday", Money::from_major(2_500), "C"),
            LedgerEntry::manual(day(4), "Groceries", Money::from_major(-150), "C"),
            LedgerEntry::manual(day(10), "Rent", Money::from_major(-3_000), "C"),
        ];
        let projection = project(&starting(5_000), &entries, "C");
        assert_eq!(projection.min_balance, Money::from_major(4_350));
        assert_eq!(projection.min_date, Some(day(10)));
        assert_eq!(projection.closing_balances["C"], Money::from_major(4_350));
    }

    #[test]
    fn test_empty_entries_stay_flat() {
        let projection = project(&starting(1_234), &[], "C");
        assert_eq!(projection.min_balance, Money::from_major(1_234));
        assert_eq!(projection.min_date, None);
        assert!(projection.is_flat());
        assert!(projection.never_dips());
    }

    #[test]
    fn test_rising_balance_reports_first_entry_date() {
        let entries = vec![
            LedgerEntry::manual(day(3), "Payday", Money::from_major(2_000), "C"),
            LedgerEntry::manual(day(5), "Coffee", Money::from_major(-5), "C"),
        ];
        let projection = project(&starting(100), &entries, "C");
        assert_eq!(projection.min_balance, Money::from_major(100));
        assert_eq!(projection.min_date, Some(day(3)));
        assert!(projection.never_dips());
        assert!(!projection.is_flat());
    }

    #[test]
    fn test_ties_resolve_to_earliest_date() {
        let entries = vec![
            LedgerEntry::manual(day(1), "Bill", Money::from_major(-100), "C"),
            LedgerEntry::manual(day(2), "Refund", Money::from_major(100), "C"),
            LedgerEntry::manual(day(3), "Bill", Money::from_major(-100), "C"),
        ];
        let projection = project(&starting(500), &entries, "C");
        assert_eq!(projection.min_balance, Money::from_major(400));
        assert_eq!(projection.min_date, Some(day(1)));
    }

    #[test]
    fn test_other_accounts_tracked_but_not_watched() {
        let entries = vec![
            LedgerEntry::manual(day(1), "Card purchase", Money::from_major(-900), "V"),
            LedgerEntry::manual(day(2), "Savings", Money::from_major(-50), "S"),
        ];
        let mut start = starting(200);
        start.insert("S".to_string(), Money::from_major(1_000));
        let projection = project(&start, &entries, "C");
        assert!(projection.never_dips());
        assert!(!projection.is_flat());
        assert_eq!(projection.min_date, Some(day(1)));
        assert_eq!(projection.closing_balances["V"], Money::from_major(-900));
        assert_eq!(projection.closing_balances["S"], Money::from_major(950));
    }

    #[test]
    fn test_missing_primary_starts_at_zero() {
        let entries = vec![LedgerEntry::manual(day(1), "Bill", Money::from_major(-10), "C")];
        let projection = project(&BTreeMap::new(), &entries, "C");
        assert_eq!(projection.starting_balance, Money::ZERO);
        assert_eq!(projection.min_balance, Money::from_major(-10));
    }
}
