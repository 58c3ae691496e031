use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use anyhow::{anyhow, Result, Context};
use lazy_static::lazy_static;
use std::sync::RwLock;

/// Session configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SessionConfig {
    /// Inactivity timeout in seconds
    pub timeout_secs: u64,
}

/// Loan configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LoanConfig {
    /// Delay before an approved loan is credited, in milliseconds
    pub approval_delay_millis: u64,
    /// Share of the loan a single past movement must reach
    pub min_deposit_ratio: f64,
}

/// Ledger configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LedgerConfig {
    /// Smallest interest term counted in the summary
    pub min_interest_credit: f64,
}

/// Terminal UI configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct UiConfig {
    /// Say nothing when an operation is rejected
    pub silent_failures: bool,
}

/// Account seed configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct SeedConfig {
    /// TOML or JSON seed list; the demo accounts are used when unset
    pub path: Option<String>,
}

/// Global application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Application name
    pub app_name: String,
    /// Application version
    pub version: String,
    pub session: SessionConfig,
    pub loan: LoanConfig,
    pub ledger: LedgerConfig,
    pub ui: UiConfig,
    #[serde(default)]
    pub seed: SeedConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_name: "Bankist".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            session: SessionConfig {
                timeout_secs: 300, // 5 minutes
            },
            loan: LoanConfig {
                approval_delay_millis: 2500,
                min_deposit_ratio: 0.1,
            },
            ledger: LedgerConfig {
                min_interest_credit: 1.0,
            },
            ui: UiConfig {
                silent_failures: true,
            },
            seed: SeedConfig::default(),
        }
    }
}

impl Config {
    /// Reject values the session cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.session.timeout_secs == 0 {
            return Err(anyhow!("session.timeout_secs must be greater than zero"));
        }
        if !(self.loan.min_deposit_ratio.is_finite() && self.loan.min_deposit_ratio >= 0.0) {
            return Err(anyhow!("loan.min_deposit_ratio must be a non-negative number"));
        }
        if !self.ledger.min_interest_credit.is_finite() {
            return Err(anyhow!("ledger.min_interest_credit must be a number"));
        }
        Ok(())
    }
}

// Global configuration instance
lazy_static! {
    static ref CONFIG: RwLock<Config> = RwLock::new(Config::default());
}

/// Load configuration from file
pub fn load_config(path: &str) -> Result<()> {
    // Check if file exists
    if !Path::new(path).exists() {
        // If not, create default config and save it
        let default_config = Config::default();
        save_config(path, &default_config)?;
        return update_config(default_config);
    }

    let config = read_config(path)?;
    update_config(config)
}

/// Parse and validate a config file without installing it
pub fn read_config(path: &str) -> Result<Config> {
    let mut file = File::open(path).context(format!("Failed to open config file: {}", path))?;
    let mut contents = String::new();
    file.read_to_string(&mut contents).context("Failed to read config file")?;

    let config: Config = match path.ends_with(".toml") {
        true => toml::from_str(&contents).context("Failed to parse TOML config")?,
        false => serde_json::from_str(&contents).context("Failed to parse JSON config")?,
    };
    config.validate().context(format!("Invalid configuration in {}", path))?;

    Ok(config)
}

/// Save configuration to file
pub fn save_config(path: &str, config: &Config) -> Result<()> {
    // Create parent directory if it doesn't exist
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }
    }

    let serialized = match path.ends_with(".toml") {
        true => toml::to_string_pretty(config).context("Failed to serialize config to TOML")?,
        false => serde_json::to_string_pretty(config).context("Failed to serialize config to JSON")?,
    };

    std::fs::write(path, serialized).context(format!("Failed to write config to file: {}", path))?;

    Ok(())
}

/// Get a copy of the current config
pub fn get_config() -> Config {
    match CONFIG.read() {
        Ok(config) => config.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    }
}

/// Replace the current config
pub fn update_config(config: Config) -> Result<()> {
    let mut current = CONFIG
        .write()
        .map_err(|_| anyhow!("Configuration lock poisoned"))?;
    *current = config;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.app_name, "Bankist");
        assert_eq!(config.session.timeout_secs, 300);
        assert_eq!(config.loan.approval_delay_millis, 2500);
        assert!(config.ui.silent_failures);
        assert!(config.seed.path.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_save_config() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("test_config.toml");
        let config_path_str = config_path.to_str().unwrap();

        let mut config = Config::default();
        config.session.timeout_secs = 90;
        config.ui.silent_failures = false;
        save_config(config_path_str, &config).unwrap();

        let loaded_config = read_config(config_path_str).unwrap();

        assert_eq!(loaded_config.app_name, config.app_name);
        assert_eq!(loaded_config.session.timeout_secs, 90);
        assert!(!loaded_config.ui.silent_failures);
        assert_eq!(loaded_config.loan.min_deposit_ratio, config.loan.min_deposit_ratio);
    }

    #[test]
    fn test_missing_config_is_created() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("nested").join("config.json");
        let config_path_str = config_path.to_str().unwrap();

        load_config(config_path_str).unwrap();
        assert!(config_path.exists());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = Config::default();
        config.session.timeout_secs = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.loan.min_deposit_ratio = f64::NAN;
        assert!(config.validate().is_err());
    }
}
