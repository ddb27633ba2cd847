use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::{BonusError, Result};
use crate::text::normalize_key;

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub bonus: BonusConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
}

/// Bonus rules: the salary ceiling, the hours → amount table and the roles
/// that never receive the bonus.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct BonusConfig {
    pub salary_limit: Decimal,
    pub full_time_hours: u32,
    pub full_time_amount: Decimal,
    pub part_time_hours: Vec<u32>,
    pub part_time_amount: Decimal,
    pub excluded_roles: Vec<String>,
}

impl Default for BonusConfig {
    fn default() -> Self {
        Self {
            salary_limit: dec!(2542.86),
            full_time_hours: 220,
            full_time_amount: dec!(300.00),
            part_time_hours: vec![110, 120],
            part_time_amount: dec!(150.00),
            excluded_roles: Vec::new(),
        }
    }
}

impl BonusConfig {
    /// Reject settings the classifier cannot work with. Called once at startup.
    pub fn validate(&self) -> Result<()> {
        let invalid = |message: String| -> Result<()> { Err(BonusError::Config(message)) };

        if self.salary_limit <= Decimal::ZERO {
            return invalid(format!("bonus.salary_limit must be positive, got {}", self.salary_limit));
        }
        if self.full_time_hours == 0 {
            return invalid("bonus.full_time_hours must be positive".to_string());
        }
        if self.full_time_amount <= Decimal::ZERO {
            return invalid(format!(
                "bonus.full_time_amount must be positive, got {}",
                self.full_time_amount
            ));
        }
        if self.part_time_amount <= Decimal::ZERO {
            return invalid(format!(
                "bonus.part_time_amount must be positive, got {}",
                self.part_time_amount
            ));
        }
        if self.part_time_amount > self.full_time_amount {
            return invalid(format!(
                "bonus.part_time_amount ({}) exceeds bonus.full_time_amount ({})",
                self.part_time_amount, self.full_time_amount
            ));
        }
        if self.part_time_hours.is_empty() {
            return invalid("bonus.part_time_hours must list at least one value".to_string());
        }
        if self.part_time_hours.contains(&self.full_time_hours) {
            return invalid(format!(
                "bonus.part_time_hours must not contain the full-time value {}",
                self.full_time_hours
            ));
        }
        if self.part_time_hours.contains(&0) {
            return invalid("bonus.part_time_hours must not contain 0".to_string());
        }
        Ok(())
    }

    pub fn is_excluded_role(&self, role: &str) -> bool {
        let role = normalize_key(role);
        !role.is_empty()
            && self
                .excluded_roles
                .iter()
                .any(|excluded| normalize_key(excluded) == role)
    }

    /// Bonus amount for a contracted-hours value, if the value is one the
    /// rules know about.
    pub fn amount_for_hours(&self, hours: u32) -> Option<Decimal> {
        if hours == self.full_time_hours {
            Some(self.full_time_amount)
        } else if self.part_time_hours.contains(&hours) {
            Some(self.part_time_amount)
        } else {
            None
        }
    }

    /// Every amount a result is allowed to carry.
    pub fn is_valid_amount(&self, amount: Decimal) -> bool {
        amount == Decimal::ZERO || amount == self.part_time_amount || amount == self.full_time_amount
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: "attendance_bonus.db".to_string(),
        }
    }
}

impl Config {
    /// Layer `config/default`, an optional explicit file and `BONUS__*`
    /// environment variables, then validate.
    pub fn load(path: Option<&str>) -> anyhow::Result<Self> {
        dotenv::dotenv().ok();

        let mut builder = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false));

        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path));
        }

        let config = builder
            .add_source(
                config::Environment::with_prefix("BONUS")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("bonus.part_time_hours")
                    .with_list_parse_key("bonus.excluded_roles")
                    .try_parsing(true),
            )
            .build()?;

        let config: Config = config.try_deserialize()?;
        config.bonus.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = BonusConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.salary_limit, dec!(2542.86));
        assert_eq!(config.amount_for_hours(220), Some(dec!(300.00)));
        assert_eq!(config.amount_for_hours(110), Some(dec!(150.00)));
        assert_eq!(config.amount_for_hours(120), Some(dec!(150.00)));
        assert_eq!(config.amount_for_hours(150), None);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = BonusConfig::default();
        config.part_time_hours.push(220);
        assert!(config.validate().is_err());

        let mut config = BonusConfig::default();
        config.part_time_amount = dec!(400);
        assert!(config.validate().is_err());

        let mut config = BonusConfig::default();
        config.salary_limit = Decimal::ZERO;
        assert!(config.validate().is_err());

        let mut config = BonusConfig::default();
        config.part_time_hours.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_reports_a_config_error() {
        let config = BonusConfig {
            full_time_hours: 0,
            ..BonusConfig::default()
        };
        match config.validate() {
            Err(BonusError::Config(message)) => assert!(message.contains("full_time_hours")),
            other => panic!("expected a config error, got {:?}", other),
        }
    }

    #[test]
    fn test_excluded_role_matching_ignores_case_and_accents() {
        let config = BonusConfig {
            excluded_roles: vec!["Auxiliar Intermitente".to_string()],
            ..BonusConfig::default()
        };
        assert!(config.is_excluded_role("AUXILIAR  INTERMITENTE"));
        assert!(config.is_excluded_role("auxiliar intermitênte"));
        assert!(!config.is_excluded_role("Auxiliar"));
        assert!(!config.is_excluded_role(""));
    }

    #[test]
    fn test_valid_amounts() {
        let config = BonusConfig::default();
        assert!(config.is_valid_amount(Decimal::ZERO));
        assert!(config.is_valid_amount(dec!(150)));
        assert!(config.is_valid_amount(dec!(300.00)));
        assert!(!config.is_valid_amount(dec!(200)));
    }

    #[test]
    fn test_config_round_trips_through_toml() {
        let config = Config::default();
        let rendered = config.to_toml().unwrap();
        assert!(rendered.contains("salary_limit"));
        assert!(rendered.contains("attendance_bonus.db"));
    }
}
