//! All setting definitions with their default values.

use std::collections::HashMap;
use std::sync::LazyLock;

type DefTuple = (&'static str, &'static str, bool, &'static str);

const DEFS: &[DefTuple] = &[
    ("CIJ_BIND_ADDR", "0.0.0.0", false, "Address the simulator listens on"),
    ("CIJ_PORT", "2323", false, "TCP port for protocol sessions"),
    ("CIJ_PASSWORD", "admin", true, "Password accepted by ^LG"),
    ("CIJ_FIRMWARE_VERSION", "4.2.1", false, "Version reported by ^VV"),
    ("CIJ_LOG_CAPACITY", "100", false, "Transcript entries kept per session"),
    ("CIJ_DRIFT_ENABLED", "true", false, "Simulate live metric drift"),
    ("CIJ_DRIFT_INTERVAL_MS", "1000", false, "Milliseconds between drift ticks"),
    ("CIJ_IDLE_TIMEOUT_SECS", "300", false, "Close idle sessions after this many seconds (0 disables)"),
];

/// A single setting definition.
#[derive(Debug, Clone)]
pub struct SettingDef {
    pub key: &'static str,
    pub default: &'static str,
    pub secret: bool,
    pub description: &'static str,
}

/// Global setting definitions indexed by key.
pub static DEFAULT_SETTINGS: LazyLock<HashMap<&'static str, SettingDef>> = LazyLock::new(|| {
    DEFS.iter()
        .map(|&(key, default, secret, description)| {
            (
                key,
                SettingDef {
                    key,
                    default,
                    secret,
                    description,
                },
            )
        })
        .collect()
});

/// Setting keys in declaration order.
pub fn keys() -> impl Iterator<Item = &'static str> {
    DEFS.iter().map(|&(key, ..)| key)
}

/// Get the default value for a setting key, or `None` if not defined.
pub fn get_default(key: &str) -> Option<&'static str> {
    DEFAULT_SETTINGS.get(key).map(|d| d.default)
}
