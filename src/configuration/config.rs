use super::types::*;
use crate::error_handling::types::ConfigError;
use chrono::TimeDelta;
use clap::Parser;
use log::info;
use serde::Deserialize;
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Upper bound for `session.max_age_secs`, ten years.
pub const MAX_SESSION_AGE_SECS: u64 = 10 * 365 * 86_400;

/// Application configuration structure that defines all runtime parameters.
///
/// Loaded from a TOML file; every section and every field is optional and
/// falls back to its default.
///
/// # Examples
///
/// ```
/// use founderlink::configuration::Config;
///
/// let config = Config::from_toml_str("[server]\nport = 8080\n").unwrap();
/// assert_eq!(config.server.port, 8080);
/// assert_eq!(config.session.check_period_secs, 86_400);
/// ```
///
/// # Fields Overview
///
/// - `server`: address and port the HTTP API binds to
/// - `session`: purge interval and lifetime of login sessions
/// - `storage`: whether to seed the demo profiles at startup
#[derive(Debug, PartialEq, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub session: SessionConfig,
    pub storage: StorageConfig,
}

impl Config {
    /// Reads and validates a TOML configuration file.
    pub fn from_file(path: &Path) -> Result<Config, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Config, ConfigError> {
        let config: Config =
            toml::from_str(content).map_err(|e| ConfigError::TomlError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server
            .bind_address
            .parse::<IpAddr>()
            .map_err(|e| {
                ConfigError::BadAddressFormatting(format!(
                    "'{}': {}",
                    self.server.bind_address, e
                ))
            })?;
        if self.server.port == 0 {
            return Err(ConfigError::BadPort(String::from(
                "server.port must be between 1 and 65535",
            )));
        }
        if self.session.check_period_secs == 0 {
            return Err(ConfigError::NotInRange(String::from(
                "session.check_period_secs must be greater than 0",
            )));
        }
        if self.session.max_age_secs == 0 {
            return Err(ConfigError::NotInRange(String::from(
                "session.max_age_secs must be greater than 0",
            )));
        }
        if self.session.max_age_secs > MAX_SESSION_AGE_SECS {
            return Err(ConfigError::NotInRange(format!(
                "session.max_age_secs must not exceed {}",
                MAX_SESSION_AGE_SECS
            )));
        }
        self.session_max_age()?;
        Ok(())
    }

    /// Address for the HTTP API. Only valid after `validate` succeeded.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip = self
            .server
            .bind_address
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::BadAddressFormatting(e.to_string()))?;
        Ok(SocketAddr::new(ip, self.server.port))
    }

    pub fn check_period(&self) -> Duration {
        Duration::from_secs(self.session.check_period_secs)
    }

    pub fn session_max_age(&self) -> Result<TimeDelta, ConfigError> {
        i64::try_from(self.session.max_age_secs)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .ok_or_else(|| {
                ConfigError::NotInRange(format!(
                    "session.max_age_secs {} is not a valid duration",
                    self.session.max_age_secs
                ))
            })
    }
}

/// Command-line arguments.
///
/// The configuration file may also be named through `FOUNDERLINK_CONFIG`;
/// explicit flags override whatever the file says.
#[derive(Parser, Debug, Clone)]
#[command(name = "founderlink")]
#[command(version)]
#[command(about = "Entrepreneur and investor networking backend")]
pub struct Cli {
    /// Path of the TOML configuration file
    #[arg(env = "FOUNDERLINK_CONFIG")]
    pub config_file: Option<PathBuf>,

    /// Overrides `server.bind_address`
    #[arg(long)]
    pub bind_address: Option<String>,

    /// Overrides `server.port`
    #[arg(long)]
    pub port: Option<u16>,

    /// Seeds the demo profiles regardless of the file setting
    #[arg(long, action = clap::ArgAction::SetTrue)]
    pub seed_demo_accounts: bool,
}

impl Cli {
    /// Builds the effective configuration: file (or defaults), then flags.
    pub fn load_config(&self) -> Result<Config, ConfigError> {
        let mut config = match &self.config_file {
            Some(path) => Config::from_file(path)?,
            None => {
                info!("No configuration file given, using defaults");
                Config::default()
            }
        };
        if let Some(ref addr) = self.bind_address {
            config.server.bind_address = addr.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if self.seed_demo_accounts {
            config.storage.seed_demo_accounts = true;
        }
        config.validate()?;
        Ok(config)
    }
}
