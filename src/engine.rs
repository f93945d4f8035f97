use std::collections::BTreeSet;

use chrono::NaiveDate;
use hourglass_rs::SafeTimeProvider;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::decimal::Money;
use crate::errors::Result;
use crate::events::{Event, EventStore};
use crate::model::{self, DeferredExposure, LedgerEntry, PayrollConfig, RecurrenceRule};
use crate::payments::{
    AmountResolver, MinimumPaymentCalculator, PayoffPlan, PayoffPlanner, ResolvedAmount,
};
use crate::projection::{self, BalanceAlert, Projection};
use crate::regeneration::{self, RegenerationReport};
use crate::schedule::{self, calendar, ExpansionContext, Horizon};
use crate::storage::Storage;
use crate::types::RuleId;

/// candidates ready to persist
struct Plan {
    entries: Vec<LedgerEntry>,
    skipped: usize,
}

/// recurring-charge expansion and balance forecasting over an injected storage handle
pub struct ForecastEngine<S: Storage> {
    storage: S,
    config: EngineConfig,
    excluded: BTreeSet<RuleId>,
    events: EventStore,
}

impl<S: Storage> ForecastEngine<S> {
    pub fn new(storage: S, config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            storage,
            config,
            excluded: BTreeSet::new(),
            events: EventStore::new(),
        })
    }

    /// leave a rule to some other process; the generic expanders skip it
    pub fn exclude_rule(&mut self, id: RuleId) {
        self.excluded.insert(id);
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }

    pub fn events(&self) -> &[Event] {
        self.events.events()
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        self.events.take_events()
    }

    /// expand every active rule over `horizon` without writing anything
    pub fn generate(&mut self, horizon: Horizon) -> Result<Vec<LedgerEntry>> {
        Ok(self.plan(horizon, None)?.entries)
    }

    /// replace the machine-generated future with a fresh expansion
    ///
    /// With `clear_existing`, unsettled machine-attributable entries dated on or
    /// after the horizon start are deleted first. Delete and insert commit
    /// together; a storage failure rolls both back and is returned.
    pub fn regenerate(&mut self, horizon: Horizon, clear_existing: bool) -> Result<RegenerationReport> {
        let run_id = Uuid::new_v4();
        self.events.emit(Event::RegenerationStarted {
            run_id,
            start: horizon.start(),
            end: horizon.end(),
            clear_existing,
        });

        let plan = self.plan(horizon, Some(run_id))?;
        let generated = plan.entries.len();
        let labels = self.config.labels.clone();
        let from = horizon.start();

        let outcome = self.atomically(move |storage| {
            let cleared = if clear_existing {
                storage.delete_entries(&|e| regeneration::is_clearable(e, from, &labels))?
            } else {
                0
            };
            let ids = storage.insert_entries(plan.entries)?;
            Ok((cleared, ids))
        });

        let (cleared, entry_ids) = match outcome {
            Ok(done) => done,
            Err(err) => {
                warn!(%run_id, error = %err, "regeneration rolled back");
                self.events.emit(Event::RegenerationRolledBack {
                    run_id,
                    reason: err.to_string(),
                });
                return Err(err);
            }
        };

        if clear_existing {
            self.events.emit(Event::EntriesCleared {
                run_id,
                count: cleared,
                from,
            });
        }
        self.events.emit(Event::EntriesGenerated {
            run_id,
            count: generated,
            start: horizon.start(),
            end: horizon.end(),
        });
        info!(
            %run_id,
            start = %horizon.start(),
            end = %horizon.end(),
            cleared,
            generated,
            skipped = plan.skipped,
            "regenerated forecast"
        );

        Ok(RegenerationReport {
            run_id,
            horizon,
            cleared,
            generated,
            skipped: plan.skipped,
            entry_ids,
        })
    }

    /// regenerate the configured horizon starting today
    pub fn regenerate_with_time(
        &mut self,
        time_provider: &SafeTimeProvider,
        clear_existing: bool,
    ) -> Result<RegenerationReport> {
        let today = time_provider.now().date_naive();
        self.regenerate(Horizon::from_config(today, &self.config.horizon)?, clear_existing)
    }

    /// regenerate with system time
    pub fn regenerate_now(&mut self, clear_existing: bool) -> Result<RegenerationReport> {
        let time = SafeTimeProvider::new(hourglass_rs::TimeSource::System);
        self.regenerate_with_time(&time, clear_existing)
    }

    /// first-run generation: only when nothing is dated today or later
    pub fn ensure_forecast_with_time(
        &mut self,
        time_provider: &SafeTimeProvider,
    ) -> Result<Option<RegenerationReport>> {
        let today = time_provider.now().date_naive();
        let has_future = self.storage.load_entries()?.iter().any(|e| e.date >= today);
        if has_future {
            debug!(%today, "future entries present, skipping first-run generation");
            return Ok(None);
        }
        self.regenerate_with_time(time_provider, true).map(Some)
    }

    /// collapse exact duplicates, keeping the lowest id of each group
    pub fn dedup(&mut self) -> Result<usize> {
        let entries = self.storage.load_entries()?;
        let doomed = regeneration::dedup_plan(&entries);
        if doomed.is_empty() {
            return Ok(0);
        }

        let removed = self.atomically(|storage| storage.delete_entry_ids(&doomed))?;
        self.events.emit(Event::DuplicatesRemoved { count: removed });
        info!(removed, "removed duplicate entries");
        Ok(removed)
    }

    /// project unsettled entries dated inside `horizon` for the primary account
    pub fn project(&mut self, horizon: Horizon) -> Result<Projection> {
        let starting = self.storage.load_starting_balances()?;
        let entries: Vec<LedgerEntry> = self
            .storage
            .load_entries()?
            .into_iter()
            .filter(|e| !e.settled && horizon.contains(e.date))
            .collect();

        let projection = projection::project(&starting, &entries, &self.config.primary_account);
        self.events.emit(Event::BalanceProjected {
            account: projection.account.clone(),
            min_balance: projection.min_balance,
            min_date: projection.min_date,
        });
        Ok(projection)
    }

    /// minimum balance of the primary account over the configured window from today
    pub fn minimum_balance_alert_with_time(
        &mut self,
        time_provider: &SafeTimeProvider,
    ) -> Result<BalanceAlert> {
        let today = time_provider.now().date_naive();
        let window_end = schedule::add_days(today, i64::from(self.config.projection_window_days))?;
        let account = self.config.primary_account.clone();

        let starting_balance = self
            .storage
            .load_starting_balances()?
            .get(&account)
            .copied()
            .unwrap_or(Money::ZERO);
        let pending: Vec<LedgerEntry> = self
            .storage
            .load_entries()?
            .into_iter()
            .filter(|e| !e.settled)
            .collect();

        let (min_balance, min_date) =
            projection::minimum_in_window(starting_balance, &pending, &account, today, window_end);
        let first_negative = projection::first_negative(starting_balance, &pending, &account, today);
        if let Some(negative) = &first_negative {
            warn!(
                account = %account,
                balance = %negative.balance,
                date = %negative.date,
                "balance projected to go negative"
            );
        }

        self.events.emit(Event::BalanceProjected {
            account: account.clone(),
            min_balance,
            min_date,
        });
        Ok(BalanceAlert {
            account,
            window_start: today,
            window_end,
            starting_balance,
            min_balance,
            min_date,
            first_negative,
        })
    }

    /// balance alert with system time
    pub fn minimum_balance_alert_now(&mut self) -> Result<BalanceAlert> {
        let time = SafeTimeProvider::new(hourglass_rs::TimeSource::System);
        self.minimum_balance_alert_with_time(&time)
    }

    /// simulated paydown of every stored card under each strategy
    pub fn payoff_plans_with_time(
        &self,
        monthly_extra: Money,
        time_provider: &SafeTimeProvider,
    ) -> Result<Vec<PayoffPlan>> {
        let cards = self.storage.load_revolving_accounts()?;
        let calculator = MinimumPaymentCalculator::from_config(&self.config.minimum_payment);
        let start = calendar::first_of_next_month(time_provider.now().date_naive());
        Ok(PayoffPlanner::new(calculator).compare(&cards, monthly_extra, start))
    }

    /// deferred-interest exposure as of today; at-risk promotions are reported
    pub fn deferred_exposure_with_time(
        &mut self,
        time_provider: &SafeTimeProvider,
    ) -> Result<DeferredExposure> {
        let today = time_provider.now().date_naive();
        let exposure = model::deferred_exposure(&self.storage.load_deferred_purchases()?, today);
        for status in exposure.at_risk() {
            warn!(
                card_id = status.card_id,
                purchase = %status.description,
                promo_end = %status.promo_end,
                potential_interest = %status.potential_interest,
                "deferred interest at risk"
            );
            self.events.emit(Event::DeferredInterestAtRisk {
                card_id: status.card_id,
                description: status.description.clone(),
                promo_end: status.promo_end,
                potential_interest: status.potential_interest,
            });
        }
        Ok(exposure)
    }

    /// deferred-interest exposure with system time
    pub fn deferred_exposure_now(&mut self) -> Result<DeferredExposure> {
        let time = SafeTimeProvider::new(hourglass_rs::TimeSource::System);
        self.deferred_exposure_with_time(&time)
    }

    fn plan(&mut self, horizon: Horizon, run_id: Option<Uuid>) -> Result<Plan> {
        let rules = self.storage.load_active_rules()?;
        let accounts = self.storage.load_revolving_accounts()?;
        let payroll = self.storage.load_current_payroll()?;
        let stored = self.storage.load_entries()?;

        let calculator = MinimumPaymentCalculator::from_config(&self.config.minimum_payment);
        let resolver = AmountResolver::snapshot(accounts, calculator);
        self.check_links(&rules, &resolver, horizon.start());
        self.check_payroll(payroll.as_ref());

        // entries no run will clear still move card balances
        let existing: Vec<LedgerEntry> = stored
            .iter()
            .filter(|e| !e.settled && horizon.contains(e.date))
            .filter(|e| !regeneration::is_machine_attributable(e, &self.config.labels))
            .cloned()
            .collect();

        let ctx = ExpansionContext {
            config: &self.config,
            resolver: &resolver,
            payroll: payroll.as_ref(),
            excluded: &self.excluded,
            existing: &existing,
        };
        let expansion = schedule::expand_all(&ctx, &rules, horizon);

        for missing in &expansion.missing_splits {
            self.events.emit(Event::SplitRuleMissing {
                label: missing.label.clone(),
                payday: missing.payday,
            });
        }

        let (entries, skipped) = if self.config.skip_settled_duplicates {
            regeneration::skip_settled(expansion.entries, &stored)
        } else {
            (expansion.entries, 0)
        };
        if let (Some(run_id), true) = (run_id, skipped > 0) {
            self.events.emit(Event::SettledDuplicatesSkipped {
                run_id,
                count: skipped,
            });
        }

        Ok(Plan { entries, skipped })
    }

    fn check_links(&mut self, rules: &[RecurrenceRule], resolver: &AmountResolver, as_of: NaiveDate) {
        for rule in rules.iter().filter(|r| r.is_linked_min_payment()) {
            if let ResolvedAmount::BrokenLink { account, fallback } = resolver.resolve_detailed(rule, as_of) {
                warn!(
                    rule = %rule.name,
                    account = ?account,
                    fallback = %fallback,
                    "linked account missing, forecasting nominal amount"
                );
                self.events.emit(Event::LinkedAccountMissing {
                    rule_id: rule.id,
                    rule_name: rule.name.clone(),
                    account_id: account,
                    fallback_amount: fallback,
                });
            }
        }
    }

    fn check_payroll(&mut self, payroll: Option<&PayrollConfig>) {
        let reason = match payroll {
            None => "no current payroll configured".to_string(),
            Some(p) if !p.drives_paydays() => {
                format!("{:?} payroll does not drive payday generation", p.frequency)
            }
            Some(_) => return,
        };
        warn!(%reason, "paydays will not be generated");
        self.events.emit(Event::PayrollUnavailable { reason });
    }

    /// run `op` between begin and commit, rolling back on any failure
    fn atomically<T>(&mut self, op: impl FnOnce(&mut S) -> Result<T>) -> Result<T> {
        self.storage.begin()?;
        let result = op(&mut self.storage).and_then(|value| {
            self.storage.commit()?;
            Ok(value)
        });
        if result.is_err() {
            if let Err(rollback) = self.storage.rollback() {
                warn!(error = %rollback, "rollback failed");
            }
        }
        result
    }
}
