use crate::{env_parse, ConfigError, FromEnv};
use std::time::Duration;

/// Settings for the server-rendered web front end
#[derive(Clone, Debug)]
pub struct WebConfig {
    /// How long cleanup may run after a shutdown signal
    pub shutdown_timeout: Duration,
    /// Apply pending migrations at startup when PostgreSQL backs the store
    pub run_migrations: bool,
}

impl FromEnv for WebConfig {
    /// - SHUTDOWN_TIMEOUT_SECS: defaults to 30
    /// - RUN_MIGRATIONS: defaults to true
    fn from_env() -> Result<Self, ConfigError> {
        let shutdown_timeout_secs: u64 = env_parse("SHUTDOWN_TIMEOUT_SECS", "30")?;
        let run_migrations = env_parse("RUN_MIGRATIONS", "true")?;

        Ok(Self {
            shutdown_timeout: Duration::from_secs(shutdown_timeout_secs),
            run_migrations,
        })
    }
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            shutdown_timeout: Duration::from_secs(30),
            run_migrations: true,
        }
    }
}
