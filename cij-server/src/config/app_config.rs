//! Runtime configuration loaded from the environment.

use std::net::SocketAddr;
use std::time::Duration;

use cij_protocol::EngineOptions;

use super::defaults::{self, DEFAULT_SETTINGS};
use super::validation::validate_setting;
use super::{SettingInfo, SettingType};

/// Runtime configuration for the simulator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: String,
    pub port: u16,
    pub password: String,
    pub firmware_version: String,
    pub log_capacity: usize,
    pub drift_enabled: bool,
    pub drift_interval_ms: u64,
    /// Zero disables the idle timeout.
    pub idle_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0".into(),
            port: 2323,
            password: "admin".into(),
            firmware_version: "4.2.1".into(),
            log_capacity: 100,
            drift_enabled: true,
            drift_interval_ms: 1000,
            idle_timeout_secs: 300,
        }
    }
}

impl AppConfig {
    /// Load configuration from process environment variables.
    pub fn from_env() -> Self {
        Self::load(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    ///
    /// Missing or empty values fall back to the default. Values that fail
    /// validation are reported and the default is kept.
    pub fn load<F>(source: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let g = |key: &str| -> String { resolve(&source, key) };

        let defaults = Self::default();
        Self {
            bind_addr: g("CIJ_BIND_ADDR"),
            port: parse_or(&g("CIJ_PORT"), defaults.port),
            password: g("CIJ_PASSWORD"),
            firmware_version: g("CIJ_FIRMWARE_VERSION"),
            log_capacity: parse_or(&g("CIJ_LOG_CAPACITY"), defaults.log_capacity),
            drift_enabled: g("CIJ_DRIFT_ENABLED") == "true",
            drift_interval_ms: parse_or(&g("CIJ_DRIFT_INTERVAL_MS"), defaults.drift_interval_ms),
            idle_timeout_secs: parse_or(&g("CIJ_IDLE_TIMEOUT_SECS"), defaults.idle_timeout_secs),
        }
    }

    /// Address the listener binds to.
    pub fn socket_addr(&self) -> Result<SocketAddr, anyhow::Error> {
        let ip = self.bind_addr.parse()?;
        Ok(SocketAddr::new(ip, self.port))
    }

    /// Options handed to each session's engine.
    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions::new()
            .with_password(self.password.clone())
            .with_firmware_version(self.firmware_version.clone())
            .with_log_capacity(self.log_capacity.max(1))
    }

    pub fn drift_interval(&self) -> Duration {
        Duration::from_millis(self.drift_interval_ms)
    }

    pub fn idle_timeout(&self) -> Option<Duration> {
        (self.idle_timeout_secs > 0).then(|| Duration::from_secs(self.idle_timeout_secs))
    }

    /// Current value of a setting key, rendered as it would be configured.
    fn value_of(&self, key: &str) -> Option<String> {
        let value = match key {
            "CIJ_BIND_ADDR" => self.bind_addr.clone(),
            "CIJ_PORT" => self.port.to_string(),
            "CIJ_PASSWORD" => self.password.clone(),
            "CIJ_FIRMWARE_VERSION" => self.firmware_version.clone(),
            "CIJ_LOG_CAPACITY" => self.log_capacity.to_string(),
            "CIJ_DRIFT_ENABLED" => self.drift_enabled.to_string(),
            "CIJ_DRIFT_INTERVAL_MS" => self.drift_interval_ms.to_string(),
            "CIJ_IDLE_TIMEOUT_SECS" => self.idle_timeout_secs.to_string(),
            _ => return None,
        };
        Some(value)
    }

    /// Effective settings in declaration order, with secrets masked.
    pub fn describe(&self) -> Vec<SettingInfo> {
        defaults::keys()
            .filter_map(|key| {
                let def = DEFAULT_SETTINGS.get(key)?;
                let value = self.value_of(key)?;
                let overridden = value != def.default;
                let (setting_type, value) = if def.secret {
                    (SettingType::Secret, "********".to_string())
                } else {
                    (SettingType::Normal, value)
                };
                Some(SettingInfo {
                    key: key.to_string(),
                    value,
                    setting_type,
                    description: def.description.to_string(),
                    overridden,
                })
            })
            .collect()
    }
}

/// Look up a key, validating it and falling back to its default.
fn resolve<F>(source: &F, key: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let default = defaults::get_default(key).unwrap_or_default();
    let Some(value) = source(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) else {
        return default.to_string();
    };
    match validate_setting(key, &value) {
        Ok(()) => value,
        Err(e) => {
            tracing::warn!("Invalid {key}={value:?}: {e}; using default {default:?}");
            default.to_string()
        }
    }
}

fn parse_or<T: std::str::FromStr>(s: &str, default: T) -> T {
    if s.is_empty() {
        return default;
    }
    s.parse().unwrap_or(default)
}
