use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::Money;
use crate::types::{AccountCode, CardId, RuleId};

/// everything the engine reports about a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    // regeneration events
    RegenerationStarted {
        run_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
        clear_existing: bool,
    },
    EntriesCleared {
        run_id: Uuid,
        count: usize,
        from: NaiveDate,
    },
    EntriesGenerated {
        run_id: Uuid,
        count: usize,
        start: NaiveDate,
        end: NaiveDate,
    },
    SettledDuplicatesSkipped {
        run_id: Uuid,
        count: usize,
    },
    RegenerationRolledBack {
        run_id: Uuid,
        reason: String,
    },

    // degraded inputs
    LinkedAccountMissing {
        rule_id: Option<RuleId>,
        rule_name: String,
        account_id: Option<CardId>,
        fallback_amount: Money,
    },
    PayrollUnavailable {
        reason: String,
    },
    SplitRuleMissing {
        label: String,
        payday: NaiveDate,
    },

    DeferredInterestAtRisk {
        card_id: CardId,
        description: String,
        promo_end: NaiveDate,
        potential_interest: Money,
    },

    // maintenance events
    DuplicatesRemoved {
        count: usize,
    },

    // projection events
    BalanceProjected {
        account: AccountCode,
        min_balance: Money,
        min_date: Option<NaiveDate>,
    },
}

/// event store for collecting events during operations
#[derive(Debug, Default)]
pub struct EventStore {
    events: Vec<Event>,
}

impl EventStore {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn emit(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
