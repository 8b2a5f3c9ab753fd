//! Configuration for the todo-forms binary.
//!
//! Loads configuration from environment variables with sensible defaults.
//! Unparseable values fall back to the default.

use crate::forms::ValidationMode;
use crate::users::DEFAULT_USERS_API_URL;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// User list endpoint (`USERS_API_URL`)
    pub users_api_url: String,
    /// Timeout for one user list request (`USERS_FETCH_TIMEOUT_SECS`, default 10)
    pub users_fetch_timeout: Duration,
    /// Contact form validation mode (`CONTACT_FORM_MODE`, default onSubmit)
    pub validation_mode: ValidationMode,
    /// Store action broadcast buffer (`STORE_BROADCAST_CAPACITY`, default 16)
    pub store_broadcast_capacity: usize,
    /// Graceful shutdown timeout (`SHUTDOWN_TIMEOUT_SECS`, default 5)
    pub shutdown_timeout: Duration,
    /// Print Prometheus metrics on exit (`PRINT_METRICS`, default false)
    pub print_metrics: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            users_api_url: DEFAULT_USERS_API_URL.to_string(),
            users_fetch_timeout: Duration::from_secs(10),
            validation_mode: ValidationMode::OnSubmit,
            store_broadcast_capacity: 16,
            shutdown_timeout: Duration::from_secs(5),
            print_metrics: false,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from `lookup`, keyed by environment variable name.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        Self {
            users_api_url: lookup("USERS_API_URL")
                .filter(|url| !url.trim().is_empty())
                .unwrap_or(defaults.users_api_url),
            users_fetch_timeout: lookup("USERS_FETCH_TIMEOUT_SECS")
                .and_then(|s| s.parse().ok())
                .map_or(defaults.users_fetch_timeout, Duration::from_secs),
            validation_mode: lookup("CONTACT_FORM_MODE")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.validation_mode),
            store_broadcast_capacity: lookup("STORE_BROADCAST_CAPACITY")
                .and_then(|s| s.parse().ok())
                .filter(|capacity| *capacity > 0)
                .unwrap_or(defaults.store_broadcast_capacity),
            shutdown_timeout: lookup("SHUTDOWN_TIMEOUT_SECS")
                .and_then(|s| s.parse().ok())
                .map_or(defaults.shutdown_timeout, Duration::from_secs),
            print_metrics: lookup("PRINT_METRICS")
                .map(|s| parse_flag(&s))
                .unwrap_or(defaults.print_metrics),
        }
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        assert_eq!(Config::from_lookup(lookup(&[])), Config::default());
    }

    #[test]
    fn reads_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("USERS_API_URL", "http://localhost:9000/users"),
            ("USERS_FETCH_TIMEOUT_SECS", "3"),
            ("CONTACT_FORM_MODE", "onChange"),
            ("STORE_BROADCAST_CAPACITY", "64"),
            ("SHUTDOWN_TIMEOUT_SECS", "1"),
            ("PRINT_METRICS", "yes"),
        ]));

        assert_eq!(config.users_api_url, "http://localhost:9000/users");
        assert_eq!(config.users_fetch_timeout, Duration::from_secs(3));
        assert_eq!(config.validation_mode, ValidationMode::OnChange);
        assert_eq!(config.store_broadcast_capacity, 64);
        assert_eq!(config.shutdown_timeout, Duration::from_secs(1));
        assert!(config.print_metrics);
    }

    #[test]
    fn invalid_values_fall_back() {
        let config = Config::from_lookup(lookup(&[
            ("USERS_API_URL", "  "),
            ("USERS_FETCH_TIMEOUT_SECS", "soon"),
            ("CONTACT_FORM_MODE", "sometimes"),
            ("STORE_BROADCAST_CAPACITY", "0"),
            ("PRINT_METRICS", "nope"),
        ]));

        assert_eq!(config, Config::default());
    }
}
