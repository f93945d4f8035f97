use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::decimal::Money;
use crate::model::{LedgerEntry, PayrollConfig, RecurrenceRule};
use crate::schedule::calendar;
use crate::schedule::{ExpansionContext, Horizon};
use crate::types::PaycheckMonth;

/// a payday whose split sentinel rule could not be found
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingSplit {
    pub label: String,
    pub payday: NaiveDate,
}

/// output of payday generation
#[derive(Debug, Clone, Default)]
pub struct PaydaySchedule {
    pub entries: Vec<LedgerEntry>,
    pub missing_splits: Vec<MissingSplit>,
}

/// generates payday deposits, pay period boundary markers and shared-expense splits
pub struct PaydayGenerator<'a> {
    ctx: &'a ExpansionContext<'a>,
}

impl<'a> PaydayGenerator<'a> {
    pub fn new(ctx: &'a ExpansionContext<'a>) -> Self {
        Self { ctx }
    }

    pub fn generate(&self, rules: &[RecurrenceRule], horizon: Horizon) -> PaydaySchedule {
        let mut schedule = PaydaySchedule::default();
        let Some(payroll) = self.ctx.payroll.filter(|p| p.drives_paydays()) else {
            debug!("no current biweekly payroll, skipping paydays");
            return schedule;
        };

        let labels = &self.ctx.config.labels;
        let primary = self.ctx.config.primary_account.as_str();
        let weekday = payroll.anchor_weekday;
        let split_two = self.split_rule(rules, &labels.split_two);
        let split_three = self.split_rule(rules, &labels.split_three);

        for payday in calendar::biweekly_dates(horizon.start(), horizon.end(), weekday) {
            schedule.entries.push(self.payday_entry(payroll, payday));

            let boundary = payday - Duration::days(1);
            if boundary >= horizon.start() {
                schedule.entries.push(
                    LedgerEntry::manual(boundary, &labels.boundary, Money::ZERO, primary)
                        .with_note(&labels.boundary_note),
                );
            }

            let (label, rule) = match calendar::classify_month(payday, weekday) {
                PaycheckMonth::Three => (&labels.split_three, split_three),
                PaycheckMonth::Two => (&labels.split_two, split_two),
            };
            match rule {
                Some(rule) if !rule.amount.is_zero() => {
                    schedule
                        .entries
                        .push(LedgerEntry::from_rule(rule, payday, rule.amount).with_account(primary));
                }
                Some(_) => {}
                None => {
                    warn!(%label, %payday, "split rule missing, no split entry generated");
                    schedule.missing_splits.push(MissingSplit {
                        label: label.clone(),
                        payday,
                    });
                }
            }
        }
        schedule
    }

    fn payday_entry(&self, payroll: &PayrollConfig, payday: NaiveDate) -> LedgerEntry {
        let config = self.ctx.config;
        LedgerEntry::manual(
            payday,
            &config.labels.payday,
            payroll.net_pay().round_cents().as_inflow(),
            &config.primary_account,
        )
    }

    fn split_rule<'r>(&self, rules: &'r [RecurrenceRule], label: &str) -> Option<&'r RecurrenceRule> {
        rules
            .iter()
            .find(|r| r.active && r.is_split_sentinel() && r.name == label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    use chrono::{Datelike, Weekday};
    use rust_decimal_macros::dec;

    use crate::config::EngineConfig;
    use crate::model::Deduction;
    use crate::payments::AmountResolver;
    use crate::schedule::fixtures::*;
    use crate::types::PayFrequency;

    fn payroll() -> PayrollConfig {
        // 2024-01-05 is a Friday
        PayrollConfig::biweekly(Money::from_major(3_000), date(2024, 1, 5))
            .with_deduction(Deduction::fixed("Tax", Money::from_major(600)))
            .with_deduction(Deduction::percentage("401k", dec!(0.05)))
    }

    fn splits() -> Vec<RecurrenceRule> {
        vec![fixed_rule(10, "Lisa", -500, 996), fixed_rule(11, "Lisa3", -333, 997)]
    }

    fn run(
        payroll: Option<&PayrollConfig>,
        rules: &[RecurrenceRule],
        start: NaiveDate,
        end: NaiveDate,
    ) -> PaydaySchedule {
        let config = EngineConfig::default();
        let resolver = AmountResolver::default();
        let excluded = BTreeSet::new();
        let ctx = ExpansionContext {
            config: &config,
            resolver: &resolver,
            payroll,
            excluded: &excluded,
            existing: &[],
        };
        PaydayGenerator::new(&ctx).generate(rules, Horizon::new(start, end).unwrap())
    }

    fn described<'e>(schedule: &'e PaydaySchedule, label: &str) -> Vec<&'e LedgerEntry> {
        schedule.entries.iter().filter(|e| e.description == label).collect()
    }

    #[test]
    fn test_paydays_carry_net_pay() {
        let payroll = payroll();
        let schedule = run(Some(&payroll), &splits(), date(2024, 1, 1), date(2024, 3, 31));
        let paydays = described(&schedule, "Payday");

        assert_eq!(paydays[0].date, date(2024, 1, 5));
        assert!(paydays.iter().all(|e| e.date.weekday() == Weekday::Fri));
        assert!(paydays.iter().all(|e| e.amount == Money::from_major(2_250)));
        assert!(paydays.iter().all(|e| e.account == "C" && e.rule_id.is_none()));
        assert_eq!(paydays.len(), 7);
    }

    #[test]
    fn test_boundary_marker_day_before_payday() {
        let payroll = payroll();
        let schedule = run(Some(&payroll), &splits(), date(2024, 1, 4), date(2024, 2, 10));
        let markers = described(&schedule, "LDBPD");
        let dates: Vec<NaiveDate> = markers.iter().map(|e| e.date).collect();
        // the first payday's marker is on the horizon start, so it is kept
        assert_eq!(dates, vec![date(2024, 1, 4), date(2024, 1, 18), date(2024, 2, 1)]);
        assert!(markers.iter().all(|e| e.amount.is_zero()));
        assert!(markers
            .iter()
            .all(|e| e.note.as_deref() == Some("Pay period boundary marker")));
    }

    #[test]
    fn test_boundary_never_precedes_horizon() {
        let payroll = payroll();
        // a Friday start bumps the first payday to 2024-01-12
        let schedule = run(Some(&payroll), &splits(), date(2024, 1, 5), date(2024, 2, 29));
        assert_eq!(described(&schedule, "Payday")[0].date, date(2024, 1, 12));
        let markers = described(&schedule, "LDBPD");
        assert_eq!(markers[0].date, date(2024, 1, 11));
        assert!(markers.iter().all(|e| e.date >= date(2024, 1, 5)));
    }

    #[test]
    fn test_split_selected_by_paycheck_count() {
        let payroll = payroll();
        // March 2024 has five Fridays, February four
        let schedule = run(Some(&payroll), &splits(), date(2024, 2, 1), date(2024, 3, 31));
        for entry in schedule.entries.iter().filter(|e| e.rule_id.is_some()) {
            if entry.date.month() == 3 {
                assert_eq!(entry.description, "Lisa3");
                assert_eq!(entry.amount, Money::from_major(-333));
                assert_eq!(entry.rule_id, Some(11));
            } else {
                assert_eq!(entry.description, "Lisa");
                assert_eq!(entry.amount, Money::from_major(-500));
            }
        }
        assert_eq!(described(&schedule, "Lisa3").len(), 3);
        assert_eq!(described(&schedule, "Lisa").len(), 2);
        assert!(schedule.missing_splits.is_empty());
    }

    #[test]
    fn test_missing_split_rule_is_not_an_error() {
        let payroll = payroll();
        let rules = vec![fixed_rule(10, "Lisa", -500, 996)];
        let schedule = run(Some(&payroll), &rules, date(2024, 3, 1), date(2024, 3, 31));
        assert!(described(&schedule, "Lisa3").is_empty());
        assert!(described(&schedule, "Lisa").is_empty());
        // paydays 2024-03-08 and 2024-03-22
        assert_eq!(schedule.missing_splits.len(), 2);
        assert!(schedule.missing_splits.iter().all(|m| m.label == "Lisa3"));
    }

    #[test]
    fn test_zero_split_amount_emits_nothing() {
        let payroll = payroll();
        let rules = vec![fixed_rule(10, "Lisa", 0, 996)];
        let schedule = run(Some(&payroll), &rules, date(2024, 2, 1), date(2024, 2, 29));
        assert!(described(&schedule, "Lisa").is_empty());
        assert!(schedule.missing_splits.is_empty());
    }

    #[test]
    fn test_non_driving_payroll_emits_nothing() {
        let monthly = payroll().with_frequency(PayFrequency::Monthly);
        assert!(run(Some(&monthly), &splits(), date(2024, 1, 1), date(2024, 3, 31))
            .entries
            .is_empty());

        let retired = payroll().retired();
        assert!(run(Some(&retired), &splits(), date(2024, 1, 1), date(2024, 3, 31))
            .entries
            .is_empty());

        assert!(run(None, &splits(), date(2024, 1, 1), date(2024, 3, 31))
            .entries
            .is_empty());
    }
}
