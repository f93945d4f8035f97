use chrono::{Datelike, NaiveDate, Weekday};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::types::{DeductionKind, PayFrequency};

/// a single paycheck deduction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deduction {
    pub name: String,
    pub kind: DeductionKind,
}

impl Deduction {
    pub fn fixed(name: &str, amount: Money) -> Self {
        Self {
            name: name.to_string(),
            kind: DeductionKind::Fixed(amount),
        }
    }

    pub fn percentage(name: &str, fraction: Decimal) -> Self {
        Self {
            name: name.to_string(),
            kind: DeductionKind::Percentage(fraction),
        }
    }

    /// amount withheld from one gross paycheck
    pub fn amount(&self, gross: Money) -> Money {
        match self.kind {
            DeductionKind::Fixed(amount) => amount,
            DeductionKind::Percentage(fraction) => gross * fraction,
        }
    }
}

/// payroll configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayrollConfig {
    pub id: Option<u64>,
    pub gross: Money,
    pub frequency: PayFrequency,
    /// a known payday
    pub anchor_date: NaiveDate,
    pub anchor_weekday: Weekday,
    pub current: bool,
    pub deductions: Vec<Deduction>,
    /// precomputed net pay; takes precedence over deductions
    pub net_override: Option<Money>,
}

impl PayrollConfig {
    /// biweekly payroll anchored on a known payday
    pub fn biweekly(gross: Money, anchor_date: NaiveDate) -> Self {
        Self {
            id: None,
            gross,
            frequency: PayFrequency::Biweekly,
            anchor_date,
            anchor_weekday: anchor_date.weekday(),
            current: true,
            deductions: Vec::new(),
            net_override: None,
        }
    }

    pub fn with_frequency(mut self, frequency: PayFrequency) -> Self {
        self.frequency = frequency;
        self
    }

    pub fn with_anchor_weekday(mut self, weekday: Weekday) -> Self {
        self.anchor_weekday = weekday;
        self
    }

    pub fn with_deduction(mut self, deduction: Deduction) -> Self {
        self.deductions.push(deduction);
        self
    }

    pub fn with_net_pay(mut self, net: Money) -> Self {
        self.net_override = Some(net);
        self
    }

    pub fn retired(mut self) -> Self {
        self.current = false;
        self
    }

    pub fn total_deductions(&self) -> Money {
        self.deductions.iter().map(|d| d.amount(self.gross)).sum()
    }

    pub fn net_pay(&self) -> Money {
        self.net_override
            .unwrap_or_else(|| self.gross - self.total_deductions())
    }

    pub fn annual_gross(&self) -> Money {
        self.gross * Decimal::from(self.frequency.periods_per_year())
    }

    pub fn annual_net(&self) -> Money {
        self.net_pay() * Decimal::from(self.frequency.periods_per_year())
    }

    /// only a current biweekly payroll drives payday generation
    pub fn drives_paydays(&self) -> bool {
        self.current && self.frequency == PayFrequency::Biweekly
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn anchor() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 5).unwrap()
    }

    #[test]
    fn test_anchor_weekday_from_date() {
        let payroll = PayrollConfig::biweekly(Money::from_major(3_000), anchor());
        assert_eq!(payroll.anchor_weekday, Weekday::Fri);
        assert!(payroll.drives_paydays());
    }

    #[test]
    fn test_net_pay_from_deductions() {
        let payroll = PayrollConfig::biweekly(Money::from_major(3_000), anchor())
            .with_deduction(Deduction::fixed("401k", Money::from_major(200)))
            .with_deduction(Deduction::percentage("Federal", dec!(0.10)));

        assert_eq!(payroll.total_deductions(), Money::from_major(500));
        assert_eq!(payroll.net_pay(), Money::from_major(2_500));
        assert_eq!(payroll.annual_gross(), Money::from_major(78_000));
        assert_eq!(payroll.annual_net(), Money::from_major(65_000));
    }

    #[test]
    fn test_net_override_wins() {
        let payroll = PayrollConfig::biweekly(Money::from_major(3_000), anchor())
            .with_deduction(Deduction::fixed("401k", Money::from_major(200)))
            .with_net_pay(Money::from_cents(241_733));
        assert_eq!(payroll.net_pay(), Money::from_cents(241_733));
    }

    #[test]
    fn test_non_biweekly_does_not_drive_paydays() {
        let payroll = PayrollConfig::biweekly(Money::from_major(3_000), anchor())
            .with_frequency(PayFrequency::Semimonthly);
        assert!(!payroll.drives_paydays());
        let payroll = PayrollConfig::biweekly(Money::from_major(3_000), anchor()).retired();
        assert!(!payroll.drives_paydays());
    }
}
