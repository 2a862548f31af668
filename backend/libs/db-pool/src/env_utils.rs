//! Environment variable parsing utilities
//!
//! Helpers shared by the pool configuration and by service configs so that
//! a malformed value is reported instead of silently replaced.

use std::str::FromStr;

/// Parse an environment variable, falling back to `default` when it is unset.
///
/// A value that is present but cannot be parsed is an error.
///
/// # Example
/// ```ignore
/// let port: u16 = parse_env_or("PORT", 8080)?;
/// ```
pub fn parse_env_or<T: FromStr>(key: &str, default: T) -> Result<T, String> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| format!("Failed to parse {}='{}'", key, raw)),
        Err(_) => Ok(default),
    }
}

/// Parse a boolean flag. Accepts `1/0`, `true/false`, `yes/no`, `on/off`.
pub fn parse_env_flag(key: &str, default: bool) -> Result<bool, String> {
    match std::env::var(key) {
        Ok(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(format!("Failed to parse {}='{}' as a flag", key, raw)),
        },
        Err(_) => Ok(default),
    }
}
