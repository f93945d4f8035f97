use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::errors::Result;
use crate::model::LedgerEntry;
use crate::types::AccountCode;

/// first point where a balance goes below zero
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NegativeBalance {
    pub balance: Money,
    pub date: NaiveDate,
}

/// minimum balance over `[from, to]` for one account
///
/// Only entries on `account` dated inside the window count. With no such
/// entries the date is `None`; otherwise a balance that never dips reports `from`.
pub fn minimum_in_window(
    start_balance: Money,
    entries: &[LedgerEntry],
    account: &str,
    from: NaiveDate,
    to: NaiveDate,
) -> (Money, Option<NaiveDate>) {
    let mut relevant = in_window(entries, account, from, Some(to)).peekable();
    if relevant.peek().is_none() {
        return (start_balance, None);
    }
    let mut balance = start_balance;
    let mut min = (start_balance, from);
    for entry in relevant {
        balance += entry.amount;
        if balance < min.0 {
            min = (balance, entry.date);
        }
    }
    (min.0, Some(min.1))
}

/// first entry on or after `today` that takes `account` below zero
///
/// A start balance that is already negative is reported on `today`.
pub fn first_negative(
    start_balance: Money,
    entries: &[LedgerEntry],
    account: &str,
    today: NaiveDate,
) -> Option<NegativeBalance> {
    if start_balance.is_negative() {
        return Some(NegativeBalance {
            balance: start_balance,
            date: today,
        });
    }
    let mut balance = start_balance;
    for entry in in_window(entries, account, today, None) {
        balance += entry.amount;
        if balance.is_negative() {
            return Some(NegativeBalance {
                balance,
                date: entry.date,
            });
        }
    }
    None
}

fn in_window<'e>(
    entries: &'e [LedgerEntry],
    account: &'e str,
    from: NaiveDate,
    to: Option<NaiveDate>,
) -> impl Iterator<Item = &'e LedgerEntry> {
    entries.iter().filter(move |e| {
        e.account == account && e.date >= from && to.map(|t| e.date <= t).unwrap_or(true)
    })
}

/// "minimum balance in the next N days" alert
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceAlert {
    pub account: AccountCode,
    pub window_start: NaiveDate,
    pub window_end: NaiveDate,
    pub starting_balance: Money,
    pub min_balance: Money,
    pub min_date: Option<NaiveDate>,
    pub first_negative: Option<NegativeBalance>,
}

impl BalanceAlert {
    pub fn goes_negative(&self) -> bool {
        self.first_negative.is_some()
    }

    pub fn json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
