//! Configuration management
//!
//! Settings live in `settings.json` in the data directory:
//! ```json
//! {
//!   "bank": {
//!     "lockThreshold": 3,
//!     "largeCreditThreshold": "100000000.00",
//!     "defaultCurrency": "IDR"
//!   }
//! }
//! ```
//! Keys this crate does not manage are kept as-is when saving.

use std::collections::HashMap;
use std::path::Path;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::result::{Error, Result};
use crate::domain::{DEFAULT_CURRENCY, LOCK_THRESHOLD};

/// Environment variable overriding `bank.lockThreshold`
pub const LOCK_THRESHOLD_ENV: &str = "COREBANK_LOCK_THRESHOLD";

const SETTINGS_FILE: &str = "settings.json";

/// Raw settings.json structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default)]
    bank: BankSettings,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BankSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    lock_threshold: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    large_credit_threshold: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    default_currency: Option<String>,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

/// Effective configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Consecutive failed logins that lock a customer
    pub lock_threshold: u32,
    /// Credits above this amount are logged at warn level
    pub large_credit_threshold: Decimal,
    /// Currency for accounts opened without one
    pub default_currency: String,
    _raw_settings: SettingsFile,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            lock_threshold: LOCK_THRESHOLD,
            large_credit_threshold: Decimal::new(10_000_000_000, 2),
            default_currency: DEFAULT_CURRENCY.to_string(),
            _raw_settings: SettingsFile::default(),
        }
    }
}

impl Config {
    /// Load config from the data directory
    ///
    /// A missing file yields defaults. `COREBANK_LOCK_THRESHOLD` wins over
    /// the file.
    pub fn load(data_dir: &Path) -> Result<Self> {
        let settings_path = data_dir.join(SETTINGS_FILE);

        let raw: SettingsFile = if settings_path.exists() {
            let content = std::fs::read_to_string(&settings_path)?;
            serde_json::from_str(&content).map_err(|e| {
                Error::Config(format!("{}: {}", settings_path.display(), e))
            })?
        } else {
            SettingsFile::default()
        };

        let defaults = Self::default();
        let env_threshold = parse_threshold_override(std::env::var(LOCK_THRESHOLD_ENV).ok())?;

        let config = Self {
            lock_threshold: env_threshold
                .or(raw.bank.lock_threshold)
                .unwrap_or(defaults.lock_threshold),
            large_credit_threshold: raw
                .bank
                .large_credit_threshold
                .unwrap_or(defaults.large_credit_threshold),
            default_currency: raw
                .bank
                .default_currency
                .clone()
                .map(|c| c.trim().to_uppercase())
                .unwrap_or(defaults.default_currency),
            _raw_settings: raw,
        };
        config.validate()?;
        Ok(config)
    }

    /// Save managed keys, preserving everything else in the file
    pub fn save(&self, data_dir: &Path) -> Result<()> {
        self.validate()?;
        let settings_path = data_dir.join(SETTINGS_FILE);

        let mut settings = if settings_path.exists() {
            let content = std::fs::read_to_string(&settings_path)?;
            serde_json::from_str::<SettingsFile>(&content)
                .unwrap_or_else(|_| self._raw_settings.clone())
        } else {
            self._raw_settings.clone()
        };

        settings.bank.lock_threshold = Some(self.lock_threshold);
        settings.bank.large_credit_threshold = Some(self.large_credit_threshold);
        settings.bank.default_currency = Some(self.default_currency.clone());

        let content = serde_json::to_string_pretty(&settings)?;
        std::fs::write(&settings_path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.lock_threshold == 0 {
            return Err(Error::Config("lockThreshold must be at least 1".to_string()));
        }
        if self.large_credit_threshold <= Decimal::ZERO {
            return Err(Error::Config(
                "largeCreditThreshold must be positive".to_string(),
            ));
        }
        if self.default_currency.len() != 3
            || !self.default_currency.chars().all(|c| c.is_ascii_uppercase())
        {
            return Err(Error::Config(format!(
                "defaultCurrency must be three letters, got '{}'",
                self.default_currency
            )));
        }
        Ok(())
    }
}

fn parse_threshold_override(value: Option<String>) -> Result<Option<u32>> {
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => raw.parse::<u32>().map(Some).map_err(|_| {
            Error::Config(format!("{} must be a positive integer, got '{}'", LOCK_THRESHOLD_ENV, raw))
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.default_currency, "IDR");
        assert_eq!(config.large_credit_threshold.to_string(), "100000000.00");
    }

    #[test]
    fn test_save_preserves_unknown_keys() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join(SETTINGS_FILE),
            r#"{"bank": {"lockThreshold": 5, "branch": "JKT-01"}, "theme": "dark"}"#,
        )
        .unwrap();

        let mut config = Config::load(dir.path()).unwrap();
        config.default_currency = "USD".to_string();
        config.save(dir.path()).unwrap();

        let saved: serde_json::Value = serde_json::from_str(
            &std::fs::read_to_string(dir.path().join(SETTINGS_FILE)).unwrap(),
        )
        .unwrap();
        assert_eq!(saved["theme"], "dark");
        assert_eq!(saved["bank"]["branch"], "JKT-01");
        assert_eq!(saved["bank"]["defaultCurrency"], "USD");
        assert_eq!(saved["bank"]["lockThreshold"], 5);
    }

    #[test]
    fn test_zero_threshold_rejected() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join(SETTINGS_FILE),
            r#"{"bank": {"lockThreshold": 0}}"#,
        )
        .unwrap();
        assert!(matches!(Config::load(dir.path()), Err(Error::Config(_))));
    }

    #[test]
    fn test_malformed_file_is_config_error() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(SETTINGS_FILE), "{not json").unwrap();
        assert!(matches!(Config::load(dir.path()), Err(Error::Config(_))));
    }

    #[test]
    fn test_threshold_override_parsing() {
        assert_eq!(parse_threshold_override(None).unwrap(), None);
        assert_eq!(parse_threshold_override(Some(" 5 ".into())).unwrap(), Some(5));
        assert!(parse_threshold_override(Some("three".into())).is_err());
    }
}
