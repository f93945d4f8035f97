use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::model::{LedgerEntry, RecurrenceRule, RevolvingCreditAccount};
use crate::types::{AccountCode, RuleId};

/// balances of every account right after one entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceRow {
    pub entry: LedgerEntry,
    /// card accounts hold the amount owed
    pub balances: BTreeMap<AccountCode, Money>,
    pub available_credit: BTreeMap<AccountCode, Money>,
    pub utilization: Rate,
}

/// replay `entries` across all accounts
///
/// Card codes missing from `starting` begin at the card's own balance.
pub fn running_balances(
    starting: &BTreeMap<AccountCode, Money>,
    entries: &[LedgerEntry],
    cards: &[RevolvingCreditAccount],
    rules: &[RecurrenceRule],
) -> Vec<BalanceRow> {
    let card_codes: BTreeMap<&str, &RevolvingCreditAccount> =
        cards.iter().map(|c| (c.code.as_str(), c)).collect();
    let payment_targets: BTreeMap<RuleId, &str> = rules
        .iter()
        .filter_map(|r| {
            let card = cards.iter().find(|c| Some(c.id) == r.linked_account())?;
            Some((r.id?, card.code.as_str()))
        })
        .collect();
    let total_limit: Money = cards.iter().map(|c| c.credit_limit).sum();

    let mut running = starting.clone();
    for card in cards {
        running.entry(card.code.clone()).or_insert(card.balance);
    }

    let mut rows = Vec::with_capacity(entries.len());
    for entry in entries {
        let balance = running.entry(entry.account.clone()).or_insert(Money::ZERO);
        if card_codes.contains_key(entry.account.as_str()) {
            *balance -= entry.amount;
        } else {
            *balance += entry.amount;
        }

        if let Some(code) = entry.rule_id.and_then(|id| payment_targets.get(&id)) {
            if let Some(owed) = running.get_mut(*code) {
                *owed += entry.amount;
            }
        }

        let available_credit = cards
            .iter()
            .map(|c| {
                let owed = running.get(&c.code).copied().unwrap_or(Money::ZERO);
                (c.code.clone(), c.credit_limit - owed)
            })
            .collect();
        let total_owed: Money = cards
            .iter()
            .filter_map(|c| running.get(&c.code).copied())
            .sum();
        let utilization = if total_limit.is_positive() {
            Rate::from_decimal(total_owed.as_decimal() / total_limit.as_decimal())
        } else {
            Rate::ZERO
        };

        rows.push(BalanceRow {
            entry: entry.clone(),
            balances: running.clone(),
            available_credit,
            utilization,
        });
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    use crate::model::AmountSource;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 8, d).unwrap()
    }

    fn visa() -> RevolvingCreditAccount {
        RevolvingCreditAccount::new(5, "V", "Visa", Money::from_major(2_000))
            .with_balance(Money::from_major(500))
    }

    fn payment_rule() -> RecurrenceRule {
        RecurrenceRule::builder()
            .id(9)
            .name("Visa Payment")
            .amount(Money::from_major(-50))
            .day_code(20)
            .account("C")
            .amount_source(AmountSource::LinkedMinPayment { account: Some(5) })
            .build()
            .unwrap()
    }

    #[test]
    fn test_card_charge_raises_owed_balance() {
        let starting: BTreeMap<AccountCode, Money> =
            [("C".to_string(), Money::from_major(3_000))].into_iter().collect();
        let entries = vec![LedgerEntry::manual(day(3), "Gas", Money::from_major(-60), "V")];

        let rows = running_balances(&starting, &entries, &[visa()], &[]);
        assert_eq!(rows[0].balances["V"], Money::from_major(560));
        assert_eq!(rows[0].balances["C"], Money::from_major(3_000));
        assert_eq!(rows[0].available_credit["V"], Money::from_major(1_440));
        assert_eq!(rows[0].utilization.as_decimal(), dec!(0.28));
    }

    #[test]
    fn test_linked_payment_reduces_card_and_checking() {
        let starting: BTreeMap<AccountCode, Money> =
            [("C".to_string(), Money::from_major(3_000))].into_iter().collect();
        let rule = payment_rule();
        let entries = vec![LedgerEntry::from_rule(&rule, day(20), Money::from_major(-100))];

        let rows = running_balances(&starting, &entries, &[visa()], &[rule]);
        assert_eq!(rows[0].balances["C"], Money::from_major(2_900));
        assert_eq!(rows[0].balances["V"], Money::from_major(400));
        assert_eq!(rows[0].available_credit["V"], Money::from_major(1_600));
    }

    #[test]
    fn test_one_row_per_entry() {
        let entries = vec![
            LedgerEntry::manual(day(1), "A", Money::from_major(10), "C"),
            LedgerEntry::manual(day(2), "B", Money::from_major(-5), "C"),
        ];
        let rows = running_balances(&BTreeMap::new(), &entries, &[], &[]);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].balances["C"], Money::from_major(5));
        assert!(rows[1].utilization.is_zero());
    }
}
