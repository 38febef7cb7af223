//! Setting value validation.

use std::net::IpAddr;

/// Validate a setting value. Returns `Ok(())` if valid, or an error message.
pub fn validate_setting(key: &str, value: &str) -> Result<(), String> {
    match key {
        "CIJ_BIND_ADDR" => {
            value
                .parse::<IpAddr>()
                .map_err(|_| "must be an IPv4 or IPv6 address")?;
        }
        "CIJ_PORT" => validate_int_range(value, 1, 65535)?,
        "CIJ_PASSWORD" => {
            let len = value.chars().count();
            if !(1..=32).contains(&len) {
                return Err("password must be 1-32 characters".into());
            }
        }
        "CIJ_FIRMWARE_VERSION" => {
            if value.trim().is_empty() {
                return Err("must not be empty".into());
            }
        }
        "CIJ_LOG_CAPACITY" => validate_int_range(value, 1, 10_000)?,
        "CIJ_DRIFT_INTERVAL_MS" => validate_int_range(value, 100, 60_000)?,
        "CIJ_IDLE_TIMEOUT_SECS" => validate_int_range(value, 0, 86_400)?,
        k if is_boolean_setting(k) => {
            if value != "true" && value != "false" {
                return Err("must be 'true' or 'false'".into());
            }
        }
        _ => {}
    }
    Ok(())
}

fn validate_int_range(value: &str, min: i64, max: i64) -> Result<(), String> {
    let v: i64 = value.parse().map_err(|_| "must be an integer")?;
    if v < min || v > max {
        return Err(format!("must be between {min} and {max}"));
    }
    Ok(())
}

fn is_boolean_setting(key: &str) -> bool {
    matches!(key, "CIJ_DRIFT_ENABLED")
}
