use std::collections::BTreeMap;

use chrono::NaiveDate;
use tracing::debug;

use crate::decimal::Money;
use crate::model::{AmountSource, RecurrenceRule, RevolvingCreditAccount};
use crate::payments::MinimumPaymentCalculator;
use crate::types::CardId;

/// outcome of resolving a rule's amount
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedAmount {
    /// fixed rule, nominal amount
    Nominal(Money),
    /// negated minimum payment of the linked account
    Linked { account: CardId, amount: Money },
    /// link missing or dangling; nominal amount used instead
    BrokenLink {
        account: Option<CardId>,
        fallback: Money,
    },
}

impl ResolvedAmount {
    pub fn amount(&self) -> Money {
        match self {
            ResolvedAmount::Nominal(amount) => *amount,
            ResolvedAmount::Linked { amount, .. } => *amount,
            ResolvedAmount::BrokenLink { fallback, .. } => *fallback,
        }
    }

    pub fn is_broken_link(&self) -> bool {
        matches!(self, ResolvedAmount::BrokenLink { .. })
    }
}

/// resolves rule amounts against a snapshot of revolving accounts
///
/// The snapshot is taken when the resolver is built. Entries generated from it
/// keep their amounts even if the account is edited afterwards.
#[derive(Debug, Clone, Default)]
pub struct AmountResolver {
    accounts: BTreeMap<CardId, RevolvingCreditAccount>,
    calculator: MinimumPaymentCalculator,
}

impl AmountResolver {
    pub fn snapshot<I>(accounts: I, calculator: MinimumPaymentCalculator) -> Self
    where
        I: IntoIterator<Item = RevolvingCreditAccount>,
    {
        Self {
            accounts: accounts.into_iter().map(|a| (a.id, a)).collect(),
            calculator,
        }
    }

    pub fn account(&self, id: CardId) -> Option<&RevolvingCreditAccount> {
        self.accounts.get(&id)
    }

    pub fn accounts(&self) -> impl Iterator<Item = &RevolvingCreditAccount> {
        self.accounts.values()
    }

    pub fn resolve(&self, rule: &RecurrenceRule, as_of: NaiveDate) -> Money {
        self.resolve_detailed(rule, as_of).amount()
    }

    pub fn resolve_detailed(&self, rule: &RecurrenceRule, as_of: NaiveDate) -> ResolvedAmount {
        match rule.amount_source {
            AmountSource::Fixed => ResolvedAmount::Nominal(rule.amount),
            AmountSource::LinkedMinPayment { account } => {
                match account.and_then(|id| self.accounts.get(&id)) {
                    Some(card) => ResolvedAmount::Linked {
                        account: card.id,
                        amount: -self.calculator.minimum_payment(card).round_cents(),
                    },
                    None => {
                        debug!(
                            rule = %rule.name,
                            account = ?account,
                            %as_of,
                            "linked account missing, using nominal amount"
                        );
                        ResolvedAmount::BrokenLink {
                            account,
                            fallback: rule.amount,
                        }
                    }
                }
            }
        }
    }
}
