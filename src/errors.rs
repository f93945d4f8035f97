use chrono::NaiveDate;
use thiserror::Error;

use crate::types::{EntryId, RuleId};

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("invalid day code: {code}")]
    InvalidDayCode {
        code: u16,
    },

    #[error("invalid horizon: end {end} is before start {start}")]
    InvalidHorizon {
        start: NaiveDate,
        end: NaiveDate,
    },

    #[error("invalid recurrence rule {name:?}: {message}")]
    InvalidRule {
        name: String,
        message: String,
    },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration {
        message: String,
    },

    #[error("date out of range: {start} + {days} days")]
    DateOutOfRange {
        start: NaiveDate,
        days: i64,
    },

    #[error("recurrence rule not found: {id}")]
    RuleNotFound {
        id: RuleId,
    },

    #[error("ledger entry not found: {id}")]
    EntryNotFound {
        id: EntryId,
    },

    #[error("storage failure: {message}")]
    Storage {
        message: String,
    },

    #[error("invalid transaction state: {message}")]
    TransactionState {
        message: String,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, LedgerError>;
