use crate::model::{LedgerEntry, RecurrenceRule, Schedule};
use crate::schedule::calendar;
use crate::schedule::{ExpansionContext, Horizon};

/// expands sentinel day codes: 991 biweekly and 992..=995 on the 15th
pub struct SpecialExpander<'a> {
    ctx: &'a ExpansionContext<'a>,
}

impl<'a> SpecialExpander<'a> {
    pub fn new(ctx: &'a ExpansionContext<'a>) -> Self {
        Self { ctx }
    }

    pub fn expand(&self, rules: &[RecurrenceRule], horizon: Horizon) -> Vec<LedgerEntry> {
        let mut entries = Vec::new();
        for rule in rules.iter().filter(|r| r.active && !self.ctx.is_excluded(r)) {
            match rule.schedule {
                Schedule::BiweeklyAnchored => entries.extend(self.biweekly(rule, horizon)),
                Schedule::MonthlyOnFifteenth(_) => entries.extend(self.fifteenth(rule, horizon)),
                // split sentinels belong to payday generation
                _ => {}
            }
        }
        entries
    }

    /// every other anchor weekday, always the nominal amount
    fn biweekly(&self, rule: &RecurrenceRule, horizon: Horizon) -> Vec<LedgerEntry> {
        calendar::biweekly_dates(horizon.start(), horizon.end(), self.ctx.pay_weekday())
            .into_iter()
            .map(|date| LedgerEntry::from_rule(rule, date, rule.amount))
            .collect()
    }

    fn fifteenth(&self, rule: &RecurrenceRule, horizon: Horizon) -> Vec<LedgerEntry> {
        calendar::monthly_fifteenths(horizon.start(), horizon.end())
            .into_iter()
            .filter_map(|date| {
                let amount = self.ctx.resolver.resolve(rule, date);
                (!amount.is_zero()).then(|| LedgerEntry::from_rule(rule, date, amount))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    use chrono::{Datelike, Duration, NaiveDate, Weekday};

    use crate::config::EngineConfig;
    use crate::decimal::Money;
    use crate::model::PayrollConfig;
    use crate::payments::AmountResolver;
    use crate::schedule::fixtures::*;

    fn run(
        rules: &[RecurrenceRule],
        payroll: Option<&PayrollConfig>,
        excluded: &BTreeSet<u64>,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Vec<LedgerEntry> {
        let config = EngineConfig::default();
        let resolver = AmountResolver::default();
        let ctx = ExpansionContext {
            config: &config,
            resolver: &resolver,
            payroll,
            excluded,
            existing: &[],
        };
        SpecialExpander::new(&ctx).expand(rules, Horizon::new(start, end).unwrap())
    }

    #[test]
    fn test_biweekly_skips_horizon_start() {
        // 2024-03-01 is a Friday
        let rules = vec![fixed_rule(1, "Mortgage", -700, 991)];
        let entries = run(&rules, None, &BTreeSet::new(), date(2024, 3, 1), date(2024, 4, 30));
        assert_eq!(entries[0].date, date(2024, 3, 8));
        assert!(entries
            .windows(2)
            .all(|w| w[1].date - w[0].date == Duration::days(14)));
        assert!(entries.iter().all(|e| e.amount == Money::from_major(-700)));
        assert_eq!(entries.len(), 4);
    }

    #[test]
    fn test_biweekly_uses_payroll_weekday() {
        let payroll = PayrollConfig::biweekly(Money::from_major(2_000), date(2024, 1, 3));
        assert_eq!(payroll.anchor_weekday, Weekday::Wed);
        let rules = vec![fixed_rule(1, "Mortgage", -700, 991)];
        let entries = run(
            &rules,
            Some(&payroll),
            &BTreeSet::new(),
            date(2024, 1, 1),
            date(2024, 2, 29),
        );
        assert!(entries.iter().all(|e| e.date.weekday() == Weekday::Wed));
        assert_eq!(entries[0].date, date(2024, 1, 3));
    }

    #[test]
    fn test_fifteenth_codes() {
        let rules: Vec<RecurrenceRule> = (992..=995)
            .map(|code| fixed_rule(code as u64, "Special", -100, code))
            .collect();
        let entries = run(&rules, None, &BTreeSet::new(), date(2024, 1, 20), date(2024, 4, 20));
        // Feb, Mar, Apr for each of four codes
        assert_eq!(entries.len(), 12);
        assert!(entries.iter().all(|e| e.date.day() == 15));
        assert!(entries.iter().all(|e| e.date.month() != 1));
    }

    #[test]
    fn test_fifteenth_wraps_into_january() {
        let rules = vec![fixed_rule(1, "Insurance", -120, 992)];
        let entries = run(&rules, None, &BTreeSet::new(), date(2024, 12, 16), date(2025, 3, 1));
        let dates: Vec<NaiveDate> = entries.iter().map(|e| e.date).collect();
        assert_eq!(dates, vec![date(2025, 1, 15), date(2025, 2, 15)]);
    }

    #[test]
    fn test_zero_fifteenth_charge_skipped() {
        let rules = vec![fixed_rule(1, "Paused", 0, 994)];
        assert!(run(&rules, None, &BTreeSet::new(), date(2024, 1, 1), date(2024, 6, 30)).is_empty());
    }

    #[test]
    fn test_sentinels_and_excluded_rules_ignored() {
        let rules = vec![
            fixed_rule(1, "Lisa", -500, 996),
            fixed_rule(2, "Lisa3", -333, 997),
            fixed_rule(3, "Car", -300, 993),
            fixed_rule(4, "Day rule", -10, 5),
        ];
        let excluded: BTreeSet<u64> = [3].into_iter().collect();
        assert!(run(&rules, None, &excluded, date(2024, 1, 1), date(2024, 6, 30)).is_empty());
    }
}
