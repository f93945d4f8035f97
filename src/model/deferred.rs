use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::types::{CardId, PromoRisk};

/// days of retroactive interest assumed when the purchase date is unknown
const DEFAULT_INTEREST_DAYS: i64 = 365;

/// purchase on a revolving account under a deferred-interest promotion
///
/// If the promotion ends with a balance left, interest at `standard_rate` is
/// charged on the original purchase amount back to the purchase date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeferredPurchase {
    pub id: Option<u64>,
    pub card_id: CardId,
    pub description: String,
    pub purchase_amount: Money,
    pub remaining_balance: Money,
    pub promo_rate: Rate,
    pub standard_rate: Rate,
    pub promo_end: NaiveDate,
    pub min_monthly_payment: Option<Money>,
    pub purchased_on: Option<NaiveDate>,
}

impl DeferredPurchase {
    pub fn new(
        card_id: CardId,
        description: &str,
        purchase_amount: Money,
        standard_rate: Rate,
        promo_end: NaiveDate,
    ) -> Self {
        Self {
            id: None,
            card_id,
            description: description.to_string(),
            purchase_amount,
            remaining_balance: purchase_amount,
            promo_rate: Rate::ZERO,
            standard_rate,
            promo_end,
            min_monthly_payment: None,
            purchased_on: None,
        }
    }

    pub fn with_remaining(mut self, remaining: Money) -> Self {
        self.remaining_balance = remaining;
        self
    }

    pub fn with_min_payment(mut self, payment: Money) -> Self {
        self.min_monthly_payment = Some(payment);
        self
    }

    pub fn purchased(mut self, on: NaiveDate) -> Self {
        self.purchased_on = Some(on);
        self
    }

    /// negative once the promotion has ended
    pub fn days_until_expiry(&self, today: NaiveDate) -> i64 {
        (self.promo_end - today).num_days()
    }

    /// 30-day months left
    pub fn months_until_expiry(&self, today: NaiveDate) -> Decimal {
        Decimal::from(self.days_until_expiry(today)) / dec!(30)
    }

    pub fn is_expired(&self, today: NaiveDate) -> bool {
        self.days_until_expiry(today) < 0
    }

    /// monthly payment that clears the balance by the promotion end
    pub fn monthly_payment_needed(&self, today: NaiveDate) -> Money {
        let months = self.months_until_expiry(today);
        if months <= Decimal::ZERO {
            return self.remaining_balance;
        }
        (self.remaining_balance / months).round_cents()
    }

    /// true when the current minimum payment won't clear the balance in time
    pub fn is_at_risk(&self, today: NaiveDate) -> bool {
        if self.is_expired(today) {
            return true;
        }
        match self.min_monthly_payment {
            Some(payment) if payment.is_positive() => {
                payment * self.months_until_expiry(today) < self.remaining_balance
            }
            _ => true,
        }
    }

    pub fn risk_level(&self, today: NaiveDate) -> PromoRisk {
        match self.days_until_expiry(today) {
            days if days < 0 => PromoRisk::Expired,
            days if days < 60 => PromoRisk::High,
            days if days < 90 => PromoRisk::Medium,
            _ => PromoRisk::Low,
        }
    }

    /// retroactive interest charged if the promotion ends unpaid
    pub fn potential_interest_charge(&self) -> Money {
        let days = self
            .purchased_on
            .map(|on| (self.promo_end - on).num_days())
            .unwrap_or(DEFAULT_INTEREST_DAYS)
            .max(0);
        let daily = self.standard_rate.as_decimal() / dec!(365);
        (self.purchase_amount * daily * Decimal::from(days)).round_cents()
    }

    pub fn status(&self, today: NaiveDate) -> DeferredPurchaseStatus {
        DeferredPurchaseStatus {
            card_id: self.card_id,
            description: self.description.clone(),
            remaining_balance: self.remaining_balance,
            promo_end: self.promo_end,
            days_until_expiry: self.days_until_expiry(today),
            risk: self.risk_level(today),
            at_risk: self.is_at_risk(today),
            monthly_payment_needed: self.monthly_payment_needed(today),
            potential_interest: self.potential_interest_charge(),
        }
    }
}

/// point-in-time view of one deferred purchase
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeferredPurchaseStatus {
    pub card_id: CardId,
    pub description: String,
    pub remaining_balance: Money,
    pub promo_end: NaiveDate,
    pub days_until_expiry: i64,
    pub risk: PromoRisk,
    pub at_risk: bool,
    pub monthly_payment_needed: Money,
    pub potential_interest: Money,
}

/// deferred-interest exposure across all purchases
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeferredExposure {
    pub as_of: NaiveDate,
    pub total_remaining: Money,
    pub total_potential_interest: Money,
    /// purchases ordered by promotion end
    pub purchases: Vec<DeferredPurchaseStatus>,
}

impl DeferredExposure {
    pub fn at_risk(&self) -> impl Iterator<Item = &DeferredPurchaseStatus> {
        self.purchases.iter().filter(|p| p.at_risk)
    }

    /// promotions ending within `days`, already expired ones excluded
    pub fn expiring_within(&self, days: i64) -> impl Iterator<Item = &DeferredPurchaseStatus> {
        self.purchases
            .iter()
            .filter(move |p| (0..=days).contains(&p.days_until_expiry))
    }
}

pub fn deferred_exposure(purchases: &[DeferredPurchase], today: NaiveDate) -> DeferredExposure {
    let mut statuses: Vec<DeferredPurchaseStatus> =
        purchases.iter().map(|p| p.status(today)).collect();
    statuses.sort_by_key(|s| s.promo_end);

    DeferredExposure {
        as_of: today,
        total_remaining: purchases.iter().map(|p| p.remaining_balance).sum(),
        total_potential_interest: statuses.iter().map(|s| s.potential_interest).sum(),
        purchases: statuses,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    // 36.5% standard rate keeps the daily rate at 0.1%
    fn furniture() -> DeferredPurchase {
        DeferredPurchase::new(
            1,
            "Sofa",
            Money::from_major(1_000),
            Rate::from_bps(3_650),
            date(2024, 7, 1),
        )
        .with_remaining(Money::from_major(900))
    }

    #[test]
    fn test_payment_needed_spreads_over_remaining_months() {
        let purchase = furniture();
        // 90 days = 3 months
        assert_eq!(purchase.monthly_payment_needed(date(2024, 4, 2)), Money::from_major(300));
        // 45 days = 1.5 months
        assert_eq!(purchase.monthly_payment_needed(date(2024, 5, 17)), Money::from_major(600));
        assert_eq!(purchase.monthly_payment_needed(date(2024, 7, 1)), Money::from_major(900));
        assert_eq!(purchase.monthly_payment_needed(date(2024, 8, 1)), Money::from_major(900));
    }

    #[test]
    fn test_risk_levels() {
        let purchase = furniture();
        assert_eq!(purchase.risk_level(date(2024, 4, 2)), PromoRisk::Low);
        assert_eq!(purchase.risk_level(date(2024, 5, 2)), PromoRisk::Medium);
        assert_eq!(purchase.risk_level(date(2024, 5, 3)), PromoRisk::High);
        assert_eq!(purchase.risk_level(date(2024, 7, 1)), PromoRisk::High);
        assert!(!purchase.is_expired(date(2024, 7, 1)));
        assert_eq!(purchase.risk_level(date(2024, 7, 2)), PromoRisk::Expired);
    }

    #[test]
    fn test_at_risk_compares_minimum_with_time_left() {
        let today = date(2024, 4, 2);
        assert!(furniture().is_at_risk(today));
        assert!(furniture().with_min_payment(Money::from_major(250)).is_at_risk(today));
        assert!(!furniture().with_min_payment(Money::from_major(300)).is_at_risk(today));
        assert!(furniture()
            .with_min_payment(Money::from_major(900))
            .is_at_risk(date(2024, 7, 2)));
    }

    #[test]
    fn test_potential_interest_on_original_amount() {
        let dated = furniture().purchased(date(2024, 1, 1));
        // 182 days at 0.1% of 1000
        assert_eq!(dated.potential_interest_charge(), Money::from_major(182));
        assert_eq!(furniture().potential_interest_charge(), Money::from_major(365));
    }

    #[test]
    fn test_exposure_totals_and_filters() {
        let tv = DeferredPurchase::new(
            2,
            "TV",
            Money::from_major(500),
            Rate::from_bps(3_650),
            date(2024, 5, 1),
        )
        .purchased(date(2024, 1, 1))
        .with_min_payment(Money::from_major(600));
        let exposure = deferred_exposure(&[furniture(), tv], date(2024, 4, 2));

        assert_eq!(exposure.total_remaining, Money::from_major(1_400));
        // sofa 365 + tv 121 days at 0.50 a day
        assert_eq!(exposure.total_potential_interest, Money::from_cents(42_550));
        assert_eq!(exposure.purchases[0].description, "TV");
        let at_risk: Vec<&str> = exposure.at_risk().map(|p| p.description.as_str()).collect();
        assert_eq!(at_risk, vec!["Sofa"]);
        assert_eq!(exposure.expiring_within(60).count(), 1);
        assert_eq!(exposure.expiring_within(90).count(), 2);
    }
}
