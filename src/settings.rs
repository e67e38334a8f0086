//! Connection settings for the Configuration Manager client.
//!
//! Defaults point at `srv-configuration-manager:8000`. Every field can be
//! replaced through a `with_*` builder method or through the
//! `CONFIGURATION_MANAGER_*` environment variables.

use std::collections::HashMap;
use std::time::Duration;

use crate::error::{ConfigManagerError, Result};
use crate::utils::{build_base_url, env_map, join_url};

pub const DEFAULT_HOSTNAME: &str = "srv-configuration-manager";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_REGISTER_PATH: &str = "/register-service";
pub const DEFAULT_PAIR_PATH: &str = "/pair-service";
pub const DEFAULT_GET_PATH: &str = "/get-service-configuration";
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;

const ENV_HOST: &str = "CONFIGURATION_MANAGER_HOST";
const ENV_PORT: &str = "CONFIGURATION_MANAGER_PORT";
const ENV_REGISTER_PATH: &str = "CONFIGURATION_MANAGER_REGISTER_PATH";
const ENV_PAIR_PATH: &str = "CONFIGURATION_MANAGER_PAIR_PATH";
const ENV_GET_PATH: &str = "CONFIGURATION_MANAGER_GET_PATH";
const ENV_TIMEOUT_SECS: &str = "CONFIGURATION_MANAGER_TIMEOUT_SECS";

/// Where the Configuration Manager lives and how long to wait for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub hostname: String,
    pub port: u16,
    pub register_path: String,
    pub pair_path: String,
    pub get_path: String,
    pub timeout: Duration,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            hostname: DEFAULT_HOSTNAME.to_string(),
            port: DEFAULT_PORT,
            register_path: DEFAULT_REGISTER_PATH.to_string(),
            pair_path: DEFAULT_PAIR_PATH.to_string(),
            get_path: DEFAULT_GET_PATH.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl ClientSettings {
    pub fn new(hostname: &str, port: u16) -> Self {
        Self {
            hostname: hostname.to_string(),
            port,
            ..Default::default()
        }
    }

    /// Defaults overridden by the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_env_map(&env_map())
    }

    /// Defaults overridden by a provided env map.
    pub fn from_env_map(env: &HashMap<String, String>) -> Result<Self> {
        let mut settings = Self::default();

        if let Some(host) = non_empty(env, ENV_HOST) {
            settings.hostname = host.to_string();
        }
        if let Some(port) = non_empty(env, ENV_PORT) {
            settings.port = port
                .parse()
                .map_err(|_| ConfigManagerError::InvalidSettings(format!("{} is not a valid port: {}", ENV_PORT, port)))?;
        }
        if let Some(path) = non_empty(env, ENV_REGISTER_PATH) {
            settings.register_path = path.to_string();
        }
        if let Some(path) = non_empty(env, ENV_PAIR_PATH) {
            settings.pair_path = path.to_string();
        }
        if let Some(path) = non_empty(env, ENV_GET_PATH) {
            settings.get_path = path.to_string();
        }
        if let Some(secs) = non_empty(env, ENV_TIMEOUT_SECS) {
            let secs: u64 = secs.parse().map_err(|_| {
                ConfigManagerError::InvalidSettings(format!("{} is not a whole number of seconds: {}", ENV_TIMEOUT_SECS, secs))
            })?;
            settings.timeout = Duration::from_secs(secs);
        }

        settings.validate()?;
        Ok(settings)
    }

    /// Reject settings no request could succeed with: a blank hostname, port 0
    /// or a zero timeout.
    pub fn validate(&self) -> Result<()> {
        if self.hostname.trim().is_empty() {
            return Err(ConfigManagerError::InvalidSettings("hostname must not be empty".to_string()));
        }
        if self.port == 0 {
            return Err(ConfigManagerError::InvalidSettings("port must not be 0".to_string()));
        }
        if self.timeout.is_zero() {
            return Err(ConfigManagerError::InvalidSettings("timeout must be greater than zero".to_string()));
        }
        Ok(())
    }

    pub fn with_hostname(mut self, hostname: &str) -> Self {
        self.hostname = hostname.to_string();
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_register_path(mut self, path: &str) -> Self {
        self.register_path = path.to_string();
        self
    }

    pub fn with_pair_path(mut self, path: &str) -> Self {
        self.pair_path = path.to_string();
        self
    }

    pub fn with_get_path(mut self, path: &str) -> Self {
        self.get_path = path.to_string();
        self
    }

    /// Per-request timeout enforced by the HTTP layer.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> String {
        build_base_url(&self.hostname, self.port)
    }

    pub fn register_url(&self) -> String {
        join_url(&self.base_url(), &self.register_path)
    }

    pub fn pair_url(&self) -> String {
        join_url(&self.base_url(), &self.pair_path)
    }

    pub fn get_url(&self) -> String {
        join_url(&self.base_url(), &self.get_path)
    }
}

fn non_empty<'a>(env: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    env.get(key).map(|s| s.trim()).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_defaults() {
        let settings = ClientSettings::default();
        assert_eq!(settings.hostname, "srv-configuration-manager");
        assert_eq!(settings.port, 8000);
        assert_eq!(settings.register_path, "/register-service");
        assert_eq!(settings.pair_path, "/pair-service");
        assert_eq!(settings.get_path, "/get-service-configuration");
        assert_eq!(settings.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_default_urls() {
        let settings = ClientSettings::default();
        assert_eq!(settings.base_url(), "http://srv-configuration-manager:8000");
        assert_eq!(settings.register_url(), "http://srv-configuration-manager:8000/register-service");
        assert_eq!(settings.pair_url(), "http://srv-configuration-manager:8000/pair-service");
        assert_eq!(
            settings.get_url(),
            "http://srv-configuration-manager:8000/get-service-configuration"
        );
    }

    #[test]
    fn test_builder_overrides() {
        let settings = ClientSettings::new("localhost", 9000)
            .with_register_path("/v2/register")
            .with_pair_path("/v2/pair")
            .with_get_path("/v2/get")
            .with_timeout(Duration::from_millis(250));
        assert_eq!(settings.register_url(), "http://localhost:9000/v2/register");
        assert_eq!(settings.pair_url(), "http://localhost:9000/v2/pair");
        assert_eq!(settings.get_url(), "http://localhost:9000/v2/get");
        assert_eq!(settings.timeout, Duration::from_millis(250));
    }

    #[test]
    fn test_from_empty_env_is_default() {
        let settings = ClientSettings::from_env_map(&HashMap::new()).unwrap();
        assert_eq!(settings, ClientSettings::default());
    }

    #[test]
    fn test_from_env_overrides() {
        let settings = ClientSettings::from_env_map(&env(&[
            ("CONFIGURATION_MANAGER_HOST", "cm.internal"),
            ("CONFIGURATION_MANAGER_PORT", "8443"),
            ("CONFIGURATION_MANAGER_GET_PATH", "/config"),
            ("CONFIGURATION_MANAGER_TIMEOUT_SECS", "12"),
        ]))
        .unwrap();
        assert_eq!(settings.hostname, "cm.internal");
        assert_eq!(settings.port, 8443);
        assert_eq!(settings.get_path, "/config");
        assert_eq!(settings.register_path, "/register-service");
        assert_eq!(settings.timeout, Duration::from_secs(12));
    }

    #[test]
    fn test_blank_env_values_are_ignored() {
        let settings = ClientSettings::from_env_map(&env(&[("CONFIGURATION_MANAGER_HOST", "  ")])).unwrap();
        assert_eq!(settings.hostname, DEFAULT_HOSTNAME);
    }

    #[test]
    fn test_invalid_port_fails() {
        let err = ClientSettings::from_env_map(&env(&[("CONFIGURATION_MANAGER_PORT", "eighty")])).unwrap_err();
        assert!(matches!(err, ConfigManagerError::InvalidSettings(_)));
    }

    #[test]
    fn test_invalid_timeout_fails() {
        let err =
            ClientSettings::from_env_map(&env(&[("CONFIGURATION_MANAGER_TIMEOUT_SECS", "-1")])).unwrap_err();
        assert!(err.to_string().contains("CONFIGURATION_MANAGER_TIMEOUT_SECS"));
    }

    #[test]
    fn test_zero_timeout_fails() {
        let err = ClientSettings::from_env_map(&env(&[("CONFIGURATION_MANAGER_TIMEOUT_SECS", "0")])).unwrap_err();
        assert!(matches!(err, ConfigManagerError::InvalidSettings(ref msg) if msg.contains("timeout")));
    }

    #[test]
    fn test_zero_port_fails() {
        let err = ClientSettings::from_env_map(&env(&[("CONFIGURATION_MANAGER_PORT", "0")])).unwrap_err();
        assert!(matches!(err, ConfigManagerError::InvalidSettings(ref msg) if msg.contains("port")));
    }

    #[test]
    fn test_validate_builder_values() {
        assert!(ClientSettings::default().validate().is_ok());
        assert!(ClientSettings::new("", 8000).validate().is_err());
        assert!(ClientSettings::default().with_port(0).validate().is_err());
        assert!(ClientSettings::default().with_timeout(Duration::ZERO).validate().is_err());
    }

    #[test]
    fn test_https_host_keeps_scheme() {
        let settings = ClientSettings::new("https://cm.internal", 443);
        assert_eq!(settings.register_url(), "https://cm.internal:443/register-service");
    }
}
