use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::payments::MinimumPaymentCalculator;
use crate::types::{AccountCode, CardId, MinPaymentPolicy};

/// revolving credit account (credit card)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevolvingCreditAccount {
    pub id: CardId,
    /// the card's own payment account identifier
    pub code: AccountCode,
    pub name: String,
    /// amount owed, positive = debt
    pub balance: Money,
    pub credit_limit: Money,
    pub annual_rate: Rate,
    pub min_payment: MinPaymentPolicy,
    pub due_day: Option<u8>,
}

impl RevolvingCreditAccount {
    pub fn new(id: CardId, code: &str, name: &str, credit_limit: Money) -> Self {
        Self {
            id,
            code: code.to_string(),
            name: name.to_string(),
            balance: Money::ZERO,
            credit_limit,
            annual_rate: Rate::ZERO,
            min_payment: MinPaymentPolicy::Calculated,
            due_day: None,
        }
    }

    pub fn with_balance(mut self, balance: Money) -> Self {
        self.balance = balance;
        self
    }

    pub fn with_rate(mut self, rate: Rate) -> Self {
        self.annual_rate = rate;
        self
    }

    pub fn with_policy(mut self, policy: MinPaymentPolicy) -> Self {
        self.min_payment = policy;
        self
    }

    pub fn with_due_day(mut self, day: u8) -> Self {
        self.due_day = Some(day);
        self
    }

    pub fn available_credit(&self) -> Money {
        self.credit_limit - self.balance
    }

    pub fn utilization(&self) -> Rate {
        if self.credit_limit.is_zero() {
            return Rate::ZERO;
        }
        Rate::from_decimal(self.balance.as_decimal() / self.credit_limit.as_decimal())
    }

    pub fn monthly_interest(&self) -> Money {
        self.balance.monthly_interest(self.annual_rate)
    }

    /// minimum payment under the default calculator
    pub fn minimum_payment(&self) -> Money {
        MinimumPaymentCalculator::default().minimum_payment(self)
    }

    /// true when generated interest charges apply to this account
    pub fn accrues_interest(&self) -> bool {
        !self.annual_rate.is_zero() && self.due_day.is_some()
    }
}
