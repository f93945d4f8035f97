use rust_decimal::Decimal;

use crate::config::MinimumPaymentConfig;
use crate::decimal::Money;
use crate::model::RevolvingCreditAccount;
use crate::types::MinPaymentPolicy;

/// minimum payment calculator for revolving accounts
#[derive(Debug, Clone, PartialEq)]
pub struct MinimumPaymentCalculator {
    /// fraction of the balance paid down each cycle
    percentage: Decimal,
    /// absolute floor, capped at the balance owed
    floor: Money,
}

impl MinimumPaymentCalculator {
    pub fn new(percentage: Decimal, floor: Money) -> Self {
        Self { percentage, floor }
    }

    pub fn from_config(config: &MinimumPaymentConfig) -> Self {
        Self::new(config.percentage, config.floor)
    }

    /// minimum payment due, as a positive amount
    pub fn minimum_payment(&self, account: &RevolvingCreditAccount) -> Money {
        match account.min_payment {
            MinPaymentPolicy::FullBalance => account.balance,
            MinPaymentPolicy::Fixed(amount) => amount,
            MinPaymentPolicy::Calculated => self.calculated(account),
        }
    }

    /// max(balance * pct + monthly interest, min(floor, balance))
    fn calculated(&self, account: &RevolvingCreditAccount) -> Money {
        let balance = account.balance;
        if !balance.is_positive() {
            return Money::ZERO;
        }

        let base = balance * self.percentage + account.monthly_interest();
        let floor = self.floor.min(balance);

        // never ask for more than is owed
        base.max(floor).min(balance)
    }
}

impl Default for MinimumPaymentCalculator {
    fn default() -> Self {
        Self::from_config(&MinimumPaymentConfig::default())
    }
}

/// minimum payment under the default calculator
pub fn minimum_payment(account: &RevolvingCreditAccount) -> Money {
    MinimumPaymentCalculator::default().minimum_payment(account)
}
