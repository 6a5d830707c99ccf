//! Application configuration management.

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::types::{Currency, Money};

/// Application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Balance computation and display settings.
    #[serde(default)]
    pub ledger: LedgerConfig,
    /// Debt reminder settings.
    #[serde(default)]
    pub reminders: ReminderConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Ledger configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerConfig {
    /// Currency used when formatting amounts.
    #[serde(default = "default_currency")]
    pub currency: Currency,
    /// Decimal places amounts are rounded to for display.
    #[serde(default = "default_display_scale")]
    pub display_scale: u32,
    /// Maximum allowed difference between an expense total and its splits.
    #[serde(default = "default_split_tolerance")]
    pub split_tolerance: Decimal,
}

fn default_currency() -> Currency {
    Currency::Usd
}

fn default_display_scale() -> u32 {
    2
}

fn default_split_tolerance() -> Decimal {
    Decimal::new(1, 2) // 0.01
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            currency: default_currency(),
            display_scale: default_display_scale(),
            split_tolerance: default_split_tolerance(),
        }
    }
}

/// Reminder configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ReminderConfig {
    /// Debts at or below this amount are not reminded.
    #[serde(default)]
    pub minimum_amount: Money,
    /// Maximum number of debts listed per user.
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
}

fn default_max_entries() -> usize {
    20
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            minimum_amount: Money::ZERO,
            max_entries: default_max_entries(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub filter: String,
    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

fn default_log_filter() -> String {
    "splitr=info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            json: false,
        }
    }
}

impl AppConfig {
    /// Loads configuration from config files and `SPLITR__*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded or fails validation.
    pub fn load() -> AppResult<Self> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("SPLITR").separator("__"))
            .build()?;

        let app: Self = config.try_deserialize()?;
        app.validate()?;
        Ok(app)
    }

    /// Checks value ranges that serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` describing the first invalid value.
    pub fn validate(&self) -> AppResult<()> {
        if self.ledger.display_scale > 10 {
            return Err(AppError::Config(format!(
                "ledger.display_scale must be at most 10, got {}",
                self.ledger.display_scale
            )));
        }
        if self.ledger.split_tolerance < Decimal::ZERO {
            return Err(AppError::Config(
                "ledger.split_tolerance cannot be negative".to_string(),
            ));
        }
        if self.reminders.minimum_amount.is_negative() {
            return Err(AppError::Config(
                "reminders.minimum_amount cannot be negative".to_string(),
            ));
        }
        if self.reminders.max_entries == 0 {
            return Err(AppError::Config(
                "reminders.max_entries must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
