//! # Daybook Configuration
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Command-line flags (highest priority)                              │
//! │     --db /tmp/shop.db                                                  │
//! │                                                                         │
//! │  2. Environment Variables                                              │
//! │     DAYBOOK_DB_PATH=/srv/shop/daybook.db                               │
//! │     DAYBOOK_COMMISSION_POLICY=flat_rate                                │
//! │                                                                         │
//! │  3. TOML Config File                                                   │
//! │     ~/.config/daybook/daybook.toml (Linux)                             │
//! │     ~/Library/Application Support/com.daybook.daybook/daybook.toml     │
//! │                                                                         │
//! │  4. Default Values (lowest priority)                                   │
//! │     tiered commission, full customer names                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [store]
//! name = "Main Shop"
//!
//! [commission]
//! policy = "tiered_floor"   # tiered_floor | flat_rate
//! unit_sales = 8000
//! commission_per_unit = 600
//! min_daily = 15000
//! rate_bps = 500
//!
//! [ledger]
//! require_full_name = true
//!
//! [database]
//! path = "/srv/shop/daybook.db"
//! ```

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use daybook_core::{
    CommissionPolicy, Money, NameRule, Rate, COMMISSION_PER_UNIT, FLAT_RATE_BPS, MAX_AMOUNT,
    MIN_DAILY, UNIT_SALES,
};

/// File name looked up in the platform config directory.
pub const CONFIG_FILE_NAME: &str = "daybook.toml";

/// File name of the SQLite store in the platform data directory.
pub const DATABASE_FILE_NAME: &str = "daybook.db";

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Could not determine the platform {0} directory")]
    NoProjectDirs(&'static str),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

// =============================================================================
// Sections
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSettings {
    /// Shown in the shell banner.
    #[serde(default = "default_store_name")]
    pub name: String,
}

fn default_store_name() -> String {
    "My Shop".to_string()
}

impl Default for StoreSettings {
    fn default() -> Self {
        StoreSettings {
            name: default_store_name(),
        }
    }
}

/// Which commission strategy the deployment uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyKind {
    #[default]
    TieredFloor,
    FlatRate,
}

impl std::str::FromStr for PolicyKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "tiered_floor" | "tiered" => Ok(PolicyKind::TieredFloor),
            "flat_rate" | "flat" => Ok(PolicyKind::FlatRate),
            other => Err(ConfigError::Invalid(format!(
                "Unknown commission policy: '{}'. Valid options: tiered_floor, flat_rate",
                other
            ))),
        }
    }
}

/// Commission constants, in whole currency units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommissionSettings {
    #[serde(default)]
    pub policy: PolicyKind,

    #[serde(default = "default_unit_sales")]
    pub unit_sales: i64,

    #[serde(default = "default_commission_per_unit")]
    pub commission_per_unit: i64,

    #[serde(default = "default_min_daily")]
    pub min_daily: i64,

    /// Flat-rate percentage in basis points (500 = 5%).
    #[serde(default = "default_rate_bps")]
    pub rate_bps: u32,
}

fn default_unit_sales() -> i64 {
    UNIT_SALES
}

fn default_commission_per_unit() -> i64 {
    COMMISSION_PER_UNIT
}

fn default_min_daily() -> i64 {
    MIN_DAILY
}

fn default_rate_bps() -> u32 {
    FLAT_RATE_BPS
}

impl Default for CommissionSettings {
    fn default() -> Self {
        CommissionSettings {
            policy: PolicyKind::default(),
            unit_sales: default_unit_sales(),
            commission_per_unit: default_commission_per_unit(),
            min_daily: default_min_daily(),
            rate_bps: default_rate_bps(),
        }
    }
}

impl CommissionSettings {
    pub fn to_policy(&self) -> CommissionPolicy {
        match self.policy {
            PolicyKind::TieredFloor => CommissionPolicy::TieredFloor {
                unit_sales: Money::from_units(self.unit_sales),
                commission_per_unit: Money::from_units(self.commission_per_unit),
                min_daily: Money::from_units(self.min_daily),
            },
            PolicyKind::FlatRate => CommissionPolicy::FlatRate {
                rate: Rate::from_bps(self.rate_bps),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSettings {
    /// `false` accepts single-word customer names.
    #[serde(default = "default_require_full_name")]
    pub require_full_name: bool,
}

fn default_require_full_name() -> bool {
    true
}

impl Default for LedgerSettings {
    fn default() -> Self {
        LedgerSettings {
            require_full_name: default_require_full_name(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// Defaults to the platform data directory when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

// =============================================================================
// Main Configuration
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaybookConfig {
    #[serde(default)]
    pub store: StoreSettings,

    #[serde(default)]
    pub commission: CommissionSettings,

    #[serde(default)]
    pub ledger: LedgerSettings,

    #[serde(default)]
    pub database: DatabaseSettings,
}

impl DaybookConfig {
    /// Loads configuration: defaults, then the file, then the environment.
    ///
    /// `config_path` falls back to `DAYBOOK_CONFIG`, then to the platform
    /// config directory. A missing file is not an error.
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        Self::load_with(config_path, |key| std::env::var(key).ok())
    }

    /// [`Self::load`] with an injectable environment lookup.
    pub fn load_with<F>(config_path: Option<PathBuf>, env: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        let path = config_path
            .or_else(|| env("DAYBOOK_CONFIG").map(PathBuf::from))
            .or_else(Self::default_config_path);

        if let Some(path) = path {
            if path.exists() {
                info!(?path, "Loading daybook config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_overrides(env)?;
        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        let c = &self.commission;

        if c.unit_sales <= 0 {
            return Err(ConfigError::Invalid(
                "commission.unit_sales must be greater than 0".into(),
            ));
        }

        if c.commission_per_unit < 0 || c.min_daily < 0 {
            return Err(ConfigError::Invalid(
                "commission constants must not be negative".into(),
            ));
        }

        let too_large = [
            ("unit_sales", c.unit_sales),
            ("commission_per_unit", c.commission_per_unit),
            ("min_daily", c.min_daily),
        ]
        .into_iter()
        .find(|(_, value)| *value > MAX_AMOUNT);
        if let Some((key, value)) = too_large {
            return Err(ConfigError::Invalid(format!(
                "commission.{key} must be at most {MAX_AMOUNT}, got {value}"
            )));
        }

        if c.rate_bps > 10_000 {
            return Err(ConfigError::Invalid(format!(
                "commission.rate_bps must be at most 10000, got {}",
                c.rate_bps
            )));
        }

        Ok(())
    }

    fn apply_overrides<F>(&mut self, env: F) -> ConfigResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = env("DAYBOOK_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database.path = Some(PathBuf::from(path));
        }

        if let Some(policy) = env("DAYBOOK_COMMISSION_POLICY") {
            debug!(policy = %policy, "Overriding commission policy from environment");
            self.commission.policy = policy.parse()?;
        }

        if let Some(name) = env("DAYBOOK_STORE_NAME") {
            self.store.name = name;
        }

        Ok(())
    }

    pub fn commission_policy(&self) -> CommissionPolicy {
        self.commission.to_policy()
    }

    pub fn name_rule(&self) -> NameRule {
        if self.ledger.require_full_name {
            NameRule::FullName
        } else {
            NameRule::NonEmpty
        }
    }

    /// Configured database file, or `daybook.db` in the platform data dir.
    ///
    /// The parent directory is created when missing.
    pub fn database_path(&self) -> ConfigResult<PathBuf> {
        let path = match &self.database.path {
            Some(path) => path.clone(),
            None => Self::project_dirs()
                .ok_or(ConfigError::NoProjectDirs("data"))?
                .data_dir()
                .join(DATABASE_FILE_NAME),
        };

        ensure_parent_dir(&path)?;
        Ok(path)
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("com", "daybook", "daybook")
    }
}

fn ensure_parent_dir(path: &Path) -> ConfigResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_defaults() {
        let config = DaybookConfig::default();
        assert_eq!(config.commission_policy(), CommissionPolicy::tiered());
        assert_eq!(config.name_rule(), NameRule::FullName);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let config =
            DaybookConfig::load_with(Some(dir.path().join("absent.toml")), no_env).unwrap();
        assert_eq!(config, DaybookConfig::default());
    }

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(
            &path,
            r#"
[store]
name = "Corner Shop"

[commission]
policy = "flat_rate"
rate_bps = 750

[ledger]
require_full_name = false
"#,
        )
        .unwrap();

        let config = DaybookConfig::load_with(Some(path), no_env).unwrap();
        assert_eq!(config.store.name, "Corner Shop");
        assert_eq!(
            config.commission_policy(),
            CommissionPolicy::FlatRate {
                rate: Rate::from_bps(750)
            }
        );
        assert_eq!(config.name_rule(), NameRule::NonEmpty);
        // Untouched keys keep their defaults
        assert_eq!(config.commission.unit_sales, UNIT_SALES);
    }

    #[test]
    fn test_env_overrides_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[commission]\npolicy = \"flat_rate\"\n").unwrap();

        let env: HashMap<&str, &str> = [
            ("DAYBOOK_COMMISSION_POLICY", "tiered_floor"),
            ("DAYBOOK_DB_PATH", "/tmp/override.db"),
            ("DAYBOOK_STORE_NAME", "Night Shop"),
        ]
        .into_iter()
        .collect();

        let config =
            DaybookConfig::load_with(Some(path), |k| env.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(config.commission.policy, PolicyKind::TieredFloor);
        assert_eq!(config.database.path, Some(PathBuf::from("/tmp/override.db")));
        assert_eq!(config.store.name, "Night Shop");
    }

    #[test]
    fn test_config_env_var_selects_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "[store]\nname = \"From Env\"\n").unwrap();
        let path_str = path.to_string_lossy().to_string();

        let config = DaybookConfig::load_with(None, |k| {
            (k == "DAYBOOK_CONFIG").then(|| path_str.clone())
        })
        .unwrap();
        assert_eq!(config.store.name, "From Env");
    }

    #[test]
    fn test_unknown_policy_rejected() {
        let result = DaybookConfig::load_with(None, |k| {
            (k == "DAYBOOK_COMMISSION_POLICY").then(|| "generous".to_string())
        });
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_validation() {
        let mut config = DaybookConfig::default();
        config.commission.unit_sales = 0;
        assert!(config.validate().is_err());

        let mut config = DaybookConfig::default();
        config.commission.min_daily = -1;
        assert!(config.validate().is_err());

        let mut config = DaybookConfig::default();
        config.commission.rate_bps = 10_001;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_oversized_commission_constants_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[commission]\nunit_sales = 92233720368547758\n").unwrap();

        let result = DaybookConfig::load_with(Some(path), no_env);
        match result {
            Err(ConfigError::Invalid(message)) => {
                assert!(message.contains("commission.unit_sales"));
            }
            other => panic!("expected an invalid config, got {other:?}"),
        }

        let mut config = DaybookConfig::default();
        config.commission.min_daily = MAX_AMOUNT + 1;
        assert!(config.validate().is_err());
        config.commission.min_daily = MAX_AMOUNT;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[commission\nunit_sales = ").unwrap();

        let result = DaybookConfig::load_with(Some(path), no_env);
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_database_path_creates_parent() {
        let dir = TempDir::new().unwrap();
        let db_path = dir.path().join("data").join("shop.db");

        let mut config = DaybookConfig::default();
        config.database.path = Some(db_path.clone());

        assert_eq!(config.database_path().unwrap(), db_path);
        assert!(dir.path().join("data").is_dir());
    }
}
