//! Configuration Module
//!
//! Handles loading and managing cache configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Default cache timeout: 15 minutes.
pub const DEFAULT_TIMEOUT_SECS: u64 = 15 * 60;

/// Default sweep interval: twice a day.
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 12 * 60 * 60;

// == Update Policy ==
/// Decides what a `put` does when the key already holds a live entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UpdatePolicy {
    /// Overwrite only while the instance-wide update gate is open; a
    /// successful update closes the gate again. Otherwise the write is dropped.
    #[default]
    Gated,
    /// Always overwrite the live entry.
    Upsert,
}

impl FromStr for UpdatePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gated" => Ok(UpdatePolicy::Gated),
            "upsert" => Ok(UpdatePolicy::Upsert),
            other => Err(format!("unknown update policy '{}'", other)),
        }
    }
}

/// Cache configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path of the SQLite database file
    pub db_path: PathBuf,
    /// Default timeout in seconds for entries written without an explicit one
    pub default_timeout: u64,
    /// Interval in seconds between expiration sweeps
    pub sweep_interval: u64,
    /// Behavior of `put` on an already cached key
    pub update_policy: UpdatePolicy,
    /// HTTP server port
    pub server_port: u16,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_DB_PATH` - SQLite database file (default: lake_cache.db)
    /// - `DEFAULT_TIMEOUT_SECS` - Default entry timeout (default: 900)
    /// - `SWEEP_INTERVAL_SECS` - Sweep frequency in seconds (default: 43200)
    /// - `UPDATE_POLICY` - `gated` or `upsert` (default: gated)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            db_path: env::var("CACHE_DB_PATH")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.db_path),
            default_timeout: parse_var("DEFAULT_TIMEOUT_SECS")
                .filter(|secs| *secs > 0)
                .unwrap_or(defaults.default_timeout),
            sweep_interval: parse_var("SWEEP_INTERVAL_SECS")
                .filter(|secs| *secs > 0)
                .unwrap_or(defaults.sweep_interval),
            update_policy: parse_var("UPDATE_POLICY").unwrap_or(defaults.update_policy),
            server_port: parse_var("SERVER_PORT").unwrap_or(defaults.server_port),
        }
    }

    /// Default entry timeout as a `Duration`.
    pub fn default_timeout_duration(&self) -> Duration {
        Duration::from_secs(self.default_timeout)
    }

    /// Sweep interval as a `Duration`.
    pub fn sweep_interval_duration(&self) -> Duration {
        Duration::from_secs(self.sweep_interval)
    }
}

fn parse_var<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("lake_cache.db"),
            default_timeout: DEFAULT_TIMEOUT_SECS,
            sweep_interval: DEFAULT_SWEEP_INTERVAL_SECS,
            update_policy: UpdatePolicy::Gated,
            server_port: 3000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.db_path, PathBuf::from("lake_cache.db"));
        assert_eq!(config.default_timeout, 900);
        assert_eq!(config.sweep_interval, 43_200);
        assert_eq!(config.update_policy, UpdatePolicy::Gated);
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.default_timeout_duration(), Duration::from_secs(900));
    }

    #[test]
    fn test_config_from_env_defaults() {
        // Clear any existing env vars to test defaults
        env::remove_var("CACHE_DB_PATH");
        env::remove_var("DEFAULT_TIMEOUT_SECS");
        env::remove_var("SWEEP_INTERVAL_SECS");
        env::remove_var("UPDATE_POLICY");
        env::remove_var("SERVER_PORT");

        let config = Config::from_env();
        assert_eq!(config.default_timeout, 900);
        assert_eq!(config.sweep_interval, 43_200);
        assert_eq!(config.update_policy, UpdatePolicy::Gated);
        assert_eq!(config.server_port, 3000);
    }

    #[test]
    fn test_update_policy_parse() {
        assert_eq!("gated".parse::<UpdatePolicy>(), Ok(UpdatePolicy::Gated));
        assert_eq!(" Upsert ".parse::<UpdatePolicy>(), Ok(UpdatePolicy::Upsert));
        assert!("lru".parse::<UpdatePolicy>().is_err());
    }
}
