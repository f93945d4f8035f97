use chrono::{Months, NaiveDate};
use hourglass_rs::SafeTimeProvider;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::decimal::Money;
use crate::errors::Result;
use crate::model::RevolvingCreditAccount;
use crate::payments::MinimumPaymentCalculator;
use crate::schedule::calendar;
use crate::types::{CardId, PayoffStrategy};

/// default cap on simulated months
pub const MAX_PAYOFF_MONTHS: u32 = 360;

/// one payment in a payoff plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayoffPayment {
    /// 1-based month of the simulation
    pub month: u32,
    pub date: NaiveDate,
    pub card_id: CardId,
    pub card_name: String,
    pub amount: Money,
    pub principal: Money,
    pub interest: Money,
    pub remaining_balance: Money,
}

/// simulated paydown of a set of cards under one strategy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayoffPlan {
    pub strategy: PayoffStrategy,
    pub monthly_extra: Money,
    pub months: u32,
    /// date of the last simulated month
    pub payoff_date: NaiveDate,
    pub total_interest: Money,
    pub total_paid: Money,
    pub payments: Vec<PayoffPayment>,
    /// card names in the order their balances reached zero
    pub payoff_order: Vec<String>,
    /// false when the month cap was hit with debt left
    pub paid_off: bool,
}

impl PayoffPlan {
    pub fn average_monthly_payment(&self) -> Money {
        if self.months == 0 {
            return Money::ZERO;
        }
        (self.total_paid / Decimal::from(self.months)).round_cents()
    }

    pub fn json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// month-by-month card paydown simulator
///
/// Each month every open card accrues a month of interest, then pays its
/// minimum under the configured calculator. The monthly extra goes to cards in
/// strategy order until it runs out.
#[derive(Debug, Clone)]
pub struct PayoffPlanner {
    calculator: MinimumPaymentCalculator,
    max_months: u32,
}

impl PayoffPlanner {
    pub fn new(calculator: MinimumPaymentCalculator) -> Self {
        Self {
            calculator,
            max_months: MAX_PAYOFF_MONTHS,
        }
    }

    pub fn with_max_months(mut self, months: u32) -> Self {
        self.max_months = months;
        self
    }

    /// simulate from `start`, the date of the first payment
    pub fn plan(
        &self,
        cards: &[RevolvingCreditAccount],
        monthly_extra: Money,
        strategy: PayoffStrategy,
        start: NaiveDate,
    ) -> PayoffPlan {
        let extra = match strategy {
            PayoffStrategy::CashOnHand => Money::ZERO,
            _ => monthly_extra.max(Money::ZERO),
        };
        let mut open: Vec<RevolvingCreditAccount> =
            cards.iter().filter(|c| c.balance.is_positive()).cloned().collect();

        let mut months = 0;
        let mut payoff_date = start;
        let mut total_interest = Money::ZERO;
        let mut total_paid = Money::ZERO;
        let mut payments = Vec::new();
        let mut payoff_order = Vec::new();

        while !open.is_empty() && months < self.max_months {
            let Some(date) = start.checked_add_months(Months::new(months)) else {
                break;
            };
            months += 1;
            payoff_date = date;

            let accrued: Vec<Money> = open
                .iter_mut()
                .map(|card| {
                    let interest = card.monthly_interest().round_cents();
                    card.balance += interest;
                    interest
                })
                .collect();
            total_interest += accrued.iter().sum::<Money>();
            let order = priority(strategy, &open);

            for (card, interest) in open.iter_mut().zip(&accrued) {
                let payment = self
                    .calculator
                    .minimum_payment(card)
                    .round_cents()
                    .min(card.balance);
                if !payment.is_positive() {
                    continue;
                }
                card.balance -= payment;
                total_paid += payment;
                let interest_portion = (*interest).min(payment);
                payments.push(PayoffPayment {
                    month: months,
                    date,
                    card_id: card.id,
                    card_name: card.name.clone(),
                    amount: payment,
                    principal: payment - interest_portion,
                    interest: interest_portion,
                    remaining_balance: card.balance,
                });
            }

            let mut extra_left = extra;
            for index in order {
                if !extra_left.is_positive() {
                    break;
                }
                let card = &mut open[index];
                if !card.balance.is_positive() {
                    continue;
                }
                let amount = extra_left.min(card.balance);
                card.balance -= amount;
                extra_left -= amount;
                total_paid += amount;
                payments.push(PayoffPayment {
                    month: months,
                    date,
                    card_id: card.id,
                    card_name: card.name.clone(),
                    amount,
                    principal: amount,
                    interest: Money::ZERO,
                    remaining_balance: card.balance,
                });
            }

            open.retain(|card| {
                if card.balance.is_positive() {
                    return true;
                }
                payoff_order.push(card.name.clone());
                false
            });
        }

        debug!(
            strategy = ?strategy,
            months,
            total_interest = %total_interest,
            open = open.len(),
            "simulated card payoff"
        );

        PayoffPlan {
            strategy,
            monthly_extra: extra,
            months,
            payoff_date,
            total_interest,
            total_paid,
            payments,
            payoff_order,
            paid_off: open.is_empty(),
        }
    }

    /// simulate with the first payment on the first of next month
    pub fn plan_with_time(
        &self,
        cards: &[RevolvingCreditAccount],
        monthly_extra: Money,
        strategy: PayoffStrategy,
        time_provider: &SafeTimeProvider,
    ) -> PayoffPlan {
        let start = calendar::first_of_next_month(time_provider.now().date_naive());
        self.plan(cards, monthly_extra, strategy, start)
    }

    /// every strategy, cheapest total interest first
    pub fn compare(
        &self,
        cards: &[RevolvingCreditAccount],
        monthly_extra: Money,
        start: NaiveDate,
    ) -> Vec<PayoffPlan> {
        let mut plans: Vec<PayoffPlan> = PayoffStrategy::ALL
            .iter()
            .map(|strategy| self.plan(cards, monthly_extra, *strategy, start))
            .collect();
        plans.sort_by_key(|plan| plan.total_interest);
        plans
    }
}

impl Default for PayoffPlanner {
    fn default() -> Self {
        Self::new(MinimumPaymentCalculator::default())
    }
}

/// indices of `cards` in the order the monthly extra is applied
fn priority(strategy: PayoffStrategy, cards: &[RevolvingCreditAccount]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..cards.len()).collect();
    match strategy {
        PayoffStrategy::Avalanche => {
            order.sort_by(|&a, &b| cards[b].annual_rate.cmp(&cards[a].annual_rate))
        }
        PayoffStrategy::Snowball => order.sort_by(|&a, &b| cards[a].balance.cmp(&cards[b].balance)),
        PayoffStrategy::HighUtilization => {
            order.sort_by(|&a, &b| cards[b].utilization().cmp(&cards[a].utilization()))
        }
        PayoffStrategy::Hybrid => {
            let scores = hybrid_scores(cards);
            order.sort_by(|&a, &b| scores[b].cmp(&scores[a]));
        }
        PayoffStrategy::CashOnHand => order.clear(),
    }
    order
}

/// 0.6 * rate / max rate + 0.4 * (1 - balance / max balance)
fn hybrid_scores(cards: &[RevolvingCreditAccount]) -> Vec<Decimal> {
    let max_rate = cards
        .iter()
        .map(|c| c.annual_rate.as_decimal())
        .max()
        .filter(|r| !r.is_zero())
        .unwrap_or(Decimal::ONE);
    let max_balance = cards
        .iter()
        .map(|c| c.balance.as_decimal())
        .max()
        .filter(|b| *b > Decimal::ZERO)
        .unwrap_or(Decimal::ONE);

    cards
        .iter()
        .map(|c| {
            dec!(0.6) * c.annual_rate.as_decimal() / max_rate
                + dec!(0.4) * (Decimal::ONE - c.balance.as_decimal() / max_balance)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decimal::Rate;
    use crate::types::MinPaymentPolicy;
    use chrono::{TimeZone, Utc};
    use hourglass_rs::TimeSource;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn card(id: CardId, name: &str, limit: i64, balance: i64, rate: u32) -> RevolvingCreditAccount {
        RevolvingCreditAccount::new(id, name, name, Money::from_major(limit))
            .with_balance(Money::from_major(balance))
            .with_rate(Rate::from_percentage(rate))
    }

    fn fixed(card: RevolvingCreditAccount, amount: i64) -> RevolvingCreditAccount {
        card.with_policy(MinPaymentPolicy::Fixed(Money::from_major(amount)))
    }

    // 24% card with room to spare, 12% card nearly maxed out
    fn two_cards() -> Vec<RevolvingCreditAccount> {
        vec![card(1, "A", 5_000, 2_000, 24), card(2, "B", 600, 400, 12)]
    }

    #[test]
    fn test_interest_free_card_pays_down_evenly() {
        let cards = vec![fixed(card(1, "Visa", 5_000, 1_000, 0), 100)];
        let plan = PayoffPlanner::default().plan(
            &cards,
            Money::ZERO,
            PayoffStrategy::Avalanche,
            date(2024, 2, 1),
        );

        assert_eq!(plan.months, 10);
        assert!(plan.paid_off);
        assert_eq!(plan.total_interest, Money::ZERO);
        assert_eq!(plan.total_paid, Money::from_major(1_000));
        assert_eq!(plan.payoff_date, date(2024, 11, 1));
        assert_eq!(plan.payoff_order, vec!["Visa".to_string()]);
        assert_eq!(plan.average_monthly_payment(), Money::from_major(100));
    }

    #[test]
    fn test_extra_shortens_payoff() {
        let cards = vec![fixed(card(1, "Visa", 5_000, 1_000, 0), 100)];
        let plan = PayoffPlanner::default().plan(
            &cards,
            Money::from_major(150),
            PayoffStrategy::Avalanche,
            date(2024, 2, 1),
        );

        assert_eq!(plan.months, 4);
        // a minimum and an extra payment each month
        assert_eq!(plan.payments.len(), 8);
        assert_eq!(plan.payments.last().unwrap().remaining_balance, Money::ZERO);
    }

    #[test]
    fn test_first_month_splits_interest_and_principal() {
        let cards = vec![fixed(card(1, "Visa", 5_000, 1_200, 12), 200)];
        let plan = PayoffPlanner::default().plan(
            &cards,
            Money::ZERO,
            PayoffStrategy::CashOnHand,
            date(2024, 2, 1),
        );

        let first = &plan.payments[0];
        assert_eq!(first.date, date(2024, 2, 1));
        assert_eq!(first.amount, Money::from_major(200));
        assert_eq!(first.interest, Money::from_major(12));
        assert_eq!(first.principal, Money::from_major(188));
        assert_eq!(first.remaining_balance, Money::from_major(1_012));
    }

    #[test]
    fn test_strategies_pick_different_targets() {
        let planner = PayoffPlanner::default();
        let extra = Money::from_major(300);
        let start = date(2024, 2, 1);
        let order = |strategy| planner.plan(&two_cards(), extra, strategy, start).payoff_order;

        assert_eq!(order(PayoffStrategy::Avalanche), vec!["A", "B"]);
        assert_eq!(order(PayoffStrategy::Snowball), vec!["B", "A"]);
        assert_eq!(order(PayoffStrategy::Hybrid), vec!["B", "A"]);
        assert_eq!(order(PayoffStrategy::HighUtilization), vec!["B", "A"]);
    }

    #[test]
    fn test_avalanche_pays_least_interest() {
        let planner = PayoffPlanner::default();
        let start = date(2024, 2, 1);
        let extra = Money::from_major(300);
        let avalanche = planner.plan(&two_cards(), extra, PayoffStrategy::Avalanche, start);
        let snowball = planner.plan(&two_cards(), extra, PayoffStrategy::Snowball, start);
        let minimums = planner.plan(&two_cards(), extra, PayoffStrategy::CashOnHand, start);

        assert!(avalanche.total_interest < snowball.total_interest);
        assert!(minimums.months > avalanche.months);
        assert_eq!(minimums.monthly_extra, Money::ZERO);
    }

    #[test]
    fn test_compare_sorts_by_interest() {
        let plans = PayoffPlanner::default().compare(
            &two_cards(),
            Money::from_major(300),
            date(2024, 2, 1),
        );
        assert_eq!(plans.len(), PayoffStrategy::ALL.len());
        assert!(plans.windows(2).all(|w| w[0].total_interest <= w[1].total_interest));
        assert_eq!(plans.last().unwrap().strategy, PayoffStrategy::CashOnHand);
    }

    #[test]
    fn test_month_cap_leaves_debt_open() {
        let cards = vec![fixed(card(1, "Visa", 5_000, 1_000, 12), 0)];
        let plan = PayoffPlanner::default().with_max_months(12).plan(
            &cards,
            Money::ZERO,
            PayoffStrategy::CashOnHand,
            date(2024, 2, 1),
        );

        assert_eq!(plan.months, 12);
        assert!(!plan.paid_off);
        assert!(plan.payments.is_empty());
        assert!(plan.total_interest > Money::from_major(120));
        assert!(plan.payoff_order.is_empty());
    }

    #[test]
    fn test_nothing_owed() {
        let cards = vec![card(1, "Visa", 5_000, 0, 18)];
        let plan = PayoffPlanner::default().plan(
            &cards,
            Money::from_major(100),
            PayoffStrategy::Snowball,
            date(2024, 2, 1),
        );
        assert_eq!(plan.months, 0);
        assert!(plan.paid_off);
        assert_eq!(plan.payoff_date, date(2024, 2, 1));
        assert_eq!(plan.average_monthly_payment(), Money::ZERO);
    }

    #[test]
    fn test_plan_with_time_starts_next_month() {
        let time = SafeTimeProvider::new(TimeSource::Test(
            Utc.with_ymd_and_hms(2024, 1, 15, 9, 0, 0).unwrap(),
        ));
        let cards = vec![fixed(card(1, "Visa", 5_000, 1_000, 0), 100)];
        let plan = PayoffPlanner::default().plan_with_time(
            &cards,
            Money::ZERO,
            PayoffStrategy::Avalanche,
            &time,
        );
        assert_eq!(plan.payments[0].date, date(2024, 2, 1));
        assert_eq!(plan.payoff_date, date(2024, 11, 1));
    }
}
