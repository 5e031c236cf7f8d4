use serde::Deserialize;

#[derive(Debug, PartialEq, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: String::from("0.0.0.0"),
            port: 5000,
        }
    }
}

#[derive(Debug, PartialEq, Clone, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Seconds between two purges of stale sessions
    pub check_period_secs: u64,
    /// Lifetime of a login session, refreshed on every authenticated request
    pub max_age_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            check_period_secs: 86_400,
            max_age_secs: 86_400,
        }
    }
}

#[derive(Debug, PartialEq, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub seed_demo_accounts: bool,
}
