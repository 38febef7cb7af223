//! Engine construction options.

use crate::transcript::DEFAULT_CAPACITY;

pub const DEFAULT_PASSWORD: &str = "admin";
pub const DEFAULT_FIRMWARE_VERSION: &str = "4.2.1";

/// Per-session options that are not part of the reported protocol state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineOptions {
    /// Shared secret accepted by `^LG`, compared case-insensitively.
    pub password: String,

    /// Reported by `^VV`.
    pub firmware_version: String,

    /// Maximum number of transcript entries kept.
    pub log_capacity: usize,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            password: DEFAULT_PASSWORD.to_string(),
            firmware_version: DEFAULT_FIRMWARE_VERSION.to_string(),
            log_capacity: DEFAULT_CAPACITY,
        }
    }
}

impl EngineOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set the login password.
    pub fn with_password(mut self, val: impl Into<String>) -> Self {
        self.password = val.into();
        self
    }

    /// Builder: set the reported firmware version.
    pub fn with_firmware_version(mut self, val: impl Into<String>) -> Self {
        self.firmware_version = val.into();
        self
    }

    /// Builder: set the transcript capacity.
    ///
    /// # Panics
    /// Panics if `val` is zero.
    pub fn with_log_capacity(mut self, val: usize) -> Self {
        assert!(val > 0, "Log capacity must be at least 1, got {val}");
        self.log_capacity = val;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let opts = EngineOptions::default();
        assert_eq!(opts.password, "admin");
        assert_eq!(opts.firmware_version, "4.2.1");
        assert_eq!(opts.log_capacity, 100);
    }

    #[test]
    fn test_builder_chain() {
        let opts = EngineOptions::new()
            .with_password("secret")
            .with_firmware_version("9.9")
            .with_log_capacity(5);

        assert_eq!(opts.password, "secret");
        assert_eq!(opts.firmware_version, "9.9");
        assert_eq!(opts.log_capacity, 5);
    }

    #[test]
    #[should_panic(expected = "Log capacity must be at least 1")]
    fn test_invalid_log_capacity() {
        EngineOptions::new().with_log_capacity(0);
    }
}
