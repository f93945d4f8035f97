use std::collections::BTreeSet;

use chrono::{Datelike, Duration, NaiveDate};
use tracing::debug;

use crate::decimal::Money;
use crate::model::{LedgerEntry, RecurrenceRule, RevolvingCreditAccount};
use crate::schedule::calendar;
use crate::schedule::{ExpansionContext, Horizon};
use crate::types::RuleId;

/// posts monthly interest on revolving accounts a few days after their due day
///
/// The owed balance feeding each charge is the account's snapshot balance
/// replayed through every known entry up to the day before posting: charges on
/// the card's own code raise it, linked minimum payments lower it, and interest
/// posted in earlier months compounds into it.
pub struct InterestChargeGenerator<'a> {
    ctx: &'a ExpansionContext<'a>,
}

impl<'a> InterestChargeGenerator<'a> {
    pub fn new(ctx: &'a ExpansionContext<'a>) -> Self {
        Self { ctx }
    }

    /// interest entries for `horizon`, given the candidates generated so far
    pub fn generate(
        &self,
        rules: &[RecurrenceRule],
        candidates: &[LedgerEntry],
        horizon: Horizon,
    ) -> Vec<LedgerEntry> {
        if !self.ctx.config.interest.enabled {
            return Vec::new();
        }

        let mut charges = Vec::new();
        for card in self.ctx.resolver.accounts().filter(|c| c.accrues_interest()) {
            let payment_rules: BTreeSet<RuleId> = rules
                .iter()
                .filter(|r| r.linked_account() == Some(card.id))
                .filter_map(|r| r.id)
                .collect();

            let mut posted: Vec<LedgerEntry> = Vec::new();
            for posting in self.posting_dates(card, horizon) {
                let cutoff = posting - Duration::days(1);
                let known = self
                    .ctx
                    .existing
                    .iter()
                    .chain(candidates)
                    .chain(posted.iter());
                let owed = owed_balance(card, &payment_rules, known, cutoff);
                if !owed.is_positive() {
                    continue;
                }
                let amount = -owed.monthly_interest(card.annual_rate).round_cents();
                if amount.is_zero() {
                    continue;
                }
                posted.push(LedgerEntry::manual(
                    posting,
                    &self.ctx.config.labels.interest_label(&card.name),
                    amount,
                    &card.code,
                ));
            }
            debug!(card = %card.name, charges = posted.len(), "generated interest charges");
            charges.extend(posted);
        }
        charges
    }

    fn posting_dates(&self, card: &RevolvingCreditAccount, horizon: Horizon) -> Vec<NaiveDate> {
        let Some(due_day) = card.due_day else {
            return Vec::new();
        };
        let day = u32::from(due_day).saturating_add(self.ctx.config.interest.posting_offset_days);
        // the previous month's charge can roll over into the horizon
        let first = horizon
            .start()
            .with_day(1)
            .and_then(|d| d.pred_opt())
            .unwrap_or(horizon.start());
        calendar::month_starts(first, horizon.end())
            .into_iter()
            .map(|month| calendar::day_with_rollover(month, day))
            .filter(|date| horizon.contains(*date))
            .collect()
    }
}

fn owed_balance<'e>(
    card: &RevolvingCreditAccount,
    payment_rules: &BTreeSet<RuleId>,
    entries: impl Iterator<Item = &'e LedgerEntry>,
    cutoff: NaiveDate,
) -> Money {
    entries
        .filter(|e| e.date <= cutoff)
        .fold(card.balance, |owed, entry| {
            if entry.account == card.code {
                owed - entry.amount
            } else if entry.rule_id.map(|id| payment_rules.contains(&id)).unwrap_or(false) {
                owed + entry.amount
            } else {
                owed
            }
        })
}
