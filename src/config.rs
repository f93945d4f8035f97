use chrono::Weekday;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::errors::{LedgerError, Result};
use crate::types::AccountCode;

/// longest generation horizon accepted, in months
pub const MAX_HORIZON_MONTHS: u32 = 120;
/// widest minimum balance alert window, in days
pub const MAX_PROJECTION_WINDOW_DAYS: u32 = 3_660;
/// latest interest posting offset after the due day
pub const MAX_POSTING_OFFSET_DAYS: u32 = 31;

/// engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// account that receives paydays, boundary markers and split entries
    pub primary_account: AccountCode,
    pub horizon: HorizonConfig,
    /// width of the minimum balance alert window
    pub projection_window_days: u32,
    /// anchor weekday for payday-anchored charges when no payroll is configured
    pub default_pay_weekday: Weekday,
    pub labels: ReservedLabels,
    pub minimum_payment: MinimumPaymentConfig,
    pub interest: InterestConfig,
    /// drop candidates already present as settled entries
    pub skip_settled_duplicates: bool,
}

/// default generation horizon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HorizonConfig {
    pub months: u32,
    pub days_per_month: u32,
}

/// descriptions the engine writes for entries that have no rule of their own
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReservedLabels {
    pub payday: String,
    pub boundary: String,
    pub boundary_note: String,
    /// split rule used in 2-paycheck months
    pub split_two: String,
    /// split rule used in 3-paycheck months
    pub split_three: String,
    /// suffix of generated card interest entries
    pub interest_suffix: String,
}

/// parameters of the calculated minimum payment policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MinimumPaymentConfig {
    /// fraction of balance (0.01 = 1%)
    pub percentage: Decimal,
    pub floor: Money,
}

/// card interest charge generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterestConfig {
    pub enabled: bool,
    /// interest posts this many days after the due day
    pub posting_offset_days: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            primary_account: "C".to_string(),
            horizon: HorizonConfig::default(),
            projection_window_days: 90,
            default_pay_weekday: Weekday::Fri,
            labels: ReservedLabels::default(),
            minimum_payment: MinimumPaymentConfig::default(),
            interest: InterestConfig::default(),
            skip_settled_duplicates: true,
        }
    }
}

impl Default for HorizonConfig {
    fn default() -> Self {
        Self {
            months: 3,
            days_per_month: 30,
        }
    }
}

impl Default for ReservedLabels {
    fn default() -> Self {
        Self {
            payday: "Payday".to_string(),
            boundary: "LDBPD".to_string(),
            boundary_note: "Pay period boundary marker".to_string(),
            split_two: "Lisa".to_string(),
            split_three: "Lisa3".to_string(),
            interest_suffix: " Interest".to_string(),
        }
    }
}

impl Default for MinimumPaymentConfig {
    fn default() -> Self {
        Self {
            percentage: dec!(0.01),
            floor: Money::from_major(25),
        }
    }
}

impl Default for InterestConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            posting_offset_days: 3,
        }
    }
}

impl ReservedLabels {
    /// labels that mark an entry as engine-written regardless of rule reference
    pub fn reserved(&self) -> [&str; 4] {
        [
            self.payday.as_str(),
            self.boundary.as_str(),
            self.split_two.as_str(),
            self.split_three.as_str(),
        ]
    }

    /// description of a card's generated interest entry
    pub fn interest_label(&self, card_name: &str) -> String {
        format!("{}{}", card_name, self.interest_suffix)
    }

    /// true for descriptions shaped like "<X> Interest"
    pub fn is_interest_label(&self, description: &str) -> bool {
        description
            .strip_suffix(self.interest_suffix.as_str())
            .map(|prefix| !prefix.trim().is_empty())
            .unwrap_or(false)
    }
}

impl EngineConfig {
    /// configuration for a household whose paychecks land in `primary_account`
    pub fn household(primary_account: &str, pay_weekday: Weekday) -> Self {
        Self {
            primary_account: primary_account.to_string(),
            default_pay_weekday: pay_weekday,
            ..Self::default()
        }
    }

    /// configuration without card interest generation
    pub fn without_interest(mut self) -> Self {
        self.interest.enabled = false;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.primary_account.trim().is_empty() {
            return Err(LedgerError::InvalidConfiguration {
                message: "primary account must not be empty".to_string(),
            });
        }
        if self.horizon.days_per_month == 0 || self.horizon.days_per_month > 31 {
            return Err(LedgerError::InvalidConfiguration {
                message: format!(
                    "days per month {} outside [1, 31]",
                    self.horizon.days_per_month
                ),
            });
        }
        if self.horizon.months > MAX_HORIZON_MONTHS {
            return Err(LedgerError::InvalidConfiguration {
                message: format!(
                    "horizon of {} months exceeds {}",
                    self.horizon.months, MAX_HORIZON_MONTHS
                ),
            });
        }
        if self.projection_window_days > MAX_PROJECTION_WINDOW_DAYS {
            return Err(LedgerError::InvalidConfiguration {
                message: format!(
                    "projection window of {} days exceeds {}",
                    self.projection_window_days, MAX_PROJECTION_WINDOW_DAYS
                ),
            });
        }
        if self.interest.posting_offset_days > MAX_POSTING_OFFSET_DAYS {
            return Err(LedgerError::InvalidConfiguration {
                message: format!(
                    "interest posting offset of {} days exceeds {}",
                    self.interest.posting_offset_days, MAX_POSTING_OFFSET_DAYS
                ),
            });
        }
        if self.minimum_payment.percentage < Decimal::ZERO
            || self.minimum_payment.percentage > Decimal::ONE
        {
            return Err(LedgerError::InvalidConfiguration {
                message: format!(
                    "minimum payment percentage {} outside [0, 1]",
                    self.minimum_payment.percentage
                ),
            });
        }
        if self.minimum_payment.floor.is_negative() {
            return Err(LedgerError::InvalidConfiguration {
                message: "minimum payment floor must not be negative".to_string(),
            });
        }
        let labels = self.labels.reserved();
        if labels.iter().any(|l| l.trim().is_empty()) {
            return Err(LedgerError::InvalidConfiguration {
                message: "reserved labels must not be empty".to_string(),
            });
        }
        if self.labels.split_two == self.labels.split_three {
            return Err(LedgerError::InvalidConfiguration {
                message: "split labels must differ".to_string(),
            });
        }
        if self.labels.interest_suffix.trim().is_empty() {
            return Err(LedgerError::InvalidConfiguration {
                message: "interest suffix must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// parse and validate a json configuration
    pub fn from_json(json: &str) -> Result<Self> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.primary_account, "C");
        assert_eq!(config.horizon.months, 3);
        assert_eq!(config.projection_window_days, 90);
        assert_eq!(config.default_pay_weekday, Weekday::Fri);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config = EngineConfig::from_json(
            r#"{ "primary_account": "CHK", "horizon": { "months": 6 } }"#,
        )
        .unwrap();
        assert_eq!(config.primary_account, "CHK");
        assert_eq!(config.horizon.months, 6);
        assert_eq!(config.horizon.days_per_month, 30);
        assert_eq!(config.labels.payday, "Payday");
    }

    #[test]
    fn test_json_round_trip() {
        let config = EngineConfig::household("B", Weekday::Thu).without_interest();
        let json = config.to_json_pretty().unwrap();
        assert_eq!(EngineConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_invalid_configs_rejected() {
        let mut config = EngineConfig::default();
        config.primary_account = " ".to_string();
        assert!(matches!(
            config.validate(),
            Err(LedgerError::InvalidConfiguration { .. })
        ));

        let mut config = EngineConfig::default();
        config.labels.split_three = config.labels.split_two.clone();
        assert!(config.validate().is_err());

        let mut config = EngineConfig::default();
        config.minimum_payment.percentage = dec!(1.5);
        assert!(config.validate().is_err());

        assert!(EngineConfig::from_json("{ not json").is_err());
    }

    #[test]
    fn test_out_of_range_windows_rejected() {
        for json in [
            r#"{ "projection_window_days": 4000000000 }"#,
            r#"{ "horizon": { "months": 20000000 } }"#,
            r#"{ "horizon": { "days_per_month": 400 } }"#,
            r#"{ "interest": { "posting_offset_days": 4294967295 } }"#,
        ] {
            assert!(
                matches!(
                    EngineConfig::from_json(json),
                    Err(LedgerError::InvalidConfiguration { .. })
                ),
                "accepted {}",
                json
            );
        }

        let mut config = EngineConfig::default();
        config.horizon.months = MAX_HORIZON_MONTHS;
        config.projection_window_days = MAX_PROJECTION_WINDOW_DAYS;
        config.interest.posting_offset_days = MAX_POSTING_OFFSET_DAYS;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_interest_label_pattern() {
        let labels = ReservedLabels::default();
        assert_eq!(labels.interest_label("Visa"), "Visa Interest");
        assert!(labels.is_interest_label("Visa Interest"));
        assert!(labels.is_interest_label("Chase Freedom Interest"));
        assert!(!labels.is_interest_label(" Interest"));
        assert!(!labels.is_interest_label("Interest"));
        assert!(!labels.is_interest_label("Interest on savings"));
    }
}
