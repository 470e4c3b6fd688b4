use dashmap::DashMap;
use std::env;
use std::sync::Arc;

/// Environment key toggling the internal log line for unexpected failures.
pub const LOG_UNEXPECTED_KEY: &str = "PROBLEM_LOG_UNEXPECTED";
/// Environment key toggling the `instance` member on intercepted responses.
pub const INCLUDE_INSTANCE_KEY: &str = "PROBLEM_INCLUDE_INSTANCE";

/// Configuration service
#[derive(Clone, Default)]
pub struct ConfigService {
    config: Arc<DashMap<String, String>>,
}

impl ConfigService {
    /// Seeded from the process environment.
    pub fn new() -> Self {
        let service = Self::default();
        for (key, value) in env::vars() {
            service.set(&key, &value);
        }
        service
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.config.get(key).map(|v| v.clone())
    }

    pub fn set(&self, key: &str, value: &str) {
        self.config.insert(key.to_string(), value.to_string());
    }

    /// Reads `true/false`, `1/0`, `yes/no`, `on/off`. Anything else yields `default`.
    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        let Some(raw) = self.get(key) else {
            return default;
        };
        match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => true,
            "false" | "0" | "no" | "off" => false,
            other => {
                tracing::warn!("Ignoring unrecognised boolean {}={:?}", key, other);
                default
            }
        }
    }
}

/// Knobs of the problem responder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponderConfig {
    /// Log unexpected failures (with their cause) before answering opaquely.
    pub log_unexpected: bool,
    /// Stamp the request path as `instance` on responses built by the interceptor layer.
    pub include_instance: bool,
}

impl Default for ResponderConfig {
    fn default() -> Self {
        Self {
            log_unexpected: true,
            include_instance: true,
        }
    }
}

impl ResponderConfig {
    pub fn from_config(config: &ConfigService) -> Self {
        let defaults = Self::default();
        Self {
            log_unexpected: config.get_bool(LOG_UNEXPECTED_KEY, defaults.log_unexpected),
            include_instance: config.get_bool(INCLUDE_INSTANCE_KEY, defaults.include_instance),
        }
    }

    pub fn from_env() -> Self {
        Self::from_config(&ConfigService::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_unset() {
        let config = ConfigService::default();
        assert_eq!(ResponderConfig::from_config(&config), ResponderConfig::default());
    }

    #[test]
    fn test_reads_overrides() {
        let config = ConfigService::default();
        config.set(LOG_UNEXPECTED_KEY, "off");
        config.set(INCLUDE_INSTANCE_KEY, " FALSE ");

        let responder = ResponderConfig::from_config(&config);
        assert!(!responder.log_unexpected);
        assert!(!responder.include_instance);
    }

    #[test]
    fn test_unrecognised_bool_falls_back() {
        let config = ConfigService::default();
        config.set(LOG_UNEXPECTED_KEY, "maybe");
        assert!(config.get_bool(LOG_UNEXPECTED_KEY, true));
        assert!(!config.get_bool(LOG_UNEXPECTED_KEY, false));
    }
}
