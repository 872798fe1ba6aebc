//! Configuration Module
//!
//! Handles loading cache and server configuration from environment variables,
//! and parsing human-readable capacity strings.

use std::env;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::{CacheError, Result};

/// Cache and server configuration.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Byte budget as a byte count or `<number><B|KB|MB|GB>`
    pub capacity: String,
    /// Default TTL in seconds for entries without explicit TTL, 0 = never expire
    pub default_ttl: u64,
    /// Whether writes feed the predictor and misses trigger preload hints
    pub prediction_enabled: bool,
    /// Gzip payloads
    pub compression: bool,
    /// Encrypt payloads with AES-256-GCM
    pub encryption: bool,
    /// Hex encoded 32 byte key, generated per process when absent
    pub encryption_key: Option<String>,
    /// Predictor tracked-key bound, 0 = unbounded
    pub predictor_max_keys: usize,
    /// Active expiry sweep interval in seconds, 0 = lazy expiry only
    pub sweep_interval: u64,
    /// HTTP server port
    pub server_port: u16,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_CAPACITY` - Byte budget (default: 1GB)
    /// - `DEFAULT_TTL` - Default TTL in seconds (default: 3600)
    /// - `PREDICTION_ENABLED` - Access prediction (default: true)
    /// - `COMPRESSION` - Gzip payloads (default: true)
    /// - `ENCRYPTION` - Encrypt payloads (default: false)
    /// - `ENCRYPTION_KEY` - Hex key for encryption (default: none)
    /// - `PREDICTOR_MAX_KEYS` - Predictor key bound (default: 0)
    /// - `SWEEP_INTERVAL` - Expiry sweep in seconds (default: 0)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    ///
    /// The capacity string is validated when the engine is built, not here.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            capacity: env::var("CACHE_CAPACITY").unwrap_or(defaults.capacity),
            default_ttl: env_or("DEFAULT_TTL", defaults.default_ttl),
            prediction_enabled: env_flag("PREDICTION_ENABLED", defaults.prediction_enabled),
            compression: env_flag("COMPRESSION", defaults.compression),
            encryption: env_flag("ENCRYPTION", defaults.encryption),
            encryption_key: env::var("ENCRYPTION_KEY").ok().filter(|k| !k.is_empty()),
            predictor_max_keys: env_or("PREDICTOR_MAX_KEYS", defaults.predictor_max_keys),
            sweep_interval: env_or("SWEEP_INTERVAL", defaults.sweep_interval),
            server_port: env_or("SERVER_PORT", defaults.server_port),
        }
    }

    /// Parsed byte budget.
    pub fn capacity_bytes(&self) -> Result<u64> {
        parse_capacity(&self.capacity)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            capacity: "1GB".to_string(),
            default_ttl: 3600,
            prediction_enabled: true,
            compression: true,
            encryption: false,
            encryption_key: None,
            predictor_max_keys: 0,
            sweep_interval: 0,
            server_port: 3000,
        }
    }
}

// == Capacity Parsing ==
/// Parses `1024`, `512B`, `64KB`, `100MB` or `1GB` into bytes.
///
/// Units are binary (1KB = 1024B) and upper case; anything else, including
/// surrounding whitespace, is rejected.
pub fn parse_capacity(input: &str) -> Result<u64> {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern = PATTERN.get_or_init(|| {
        Regex::new(r"^(\d+)(B|KB|MB|GB)?$").expect("capacity pattern is valid")
    });

    let invalid = || CacheError::InvalidCapacityFormat(input.to_string());

    let caps = pattern.captures(input).ok_or_else(invalid)?;
    let amount: u64 = caps[1].parse().map_err(|_| invalid())?;
    let multiplier: u64 = match caps.get(2).map(|m| m.as_str()) {
        None | Some("B") => 1,
        Some("KB") => 1024,
        Some("MB") => 1024 * 1024,
        Some("GB") => 1024 * 1024 * 1024,
        Some(_) => return Err(invalid()),
    };

    amount.checked_mul(multiplier).ok_or_else(invalid)
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_flag(name: &str, default: bool) -> bool {
    match env::var(name) {
        Ok(v) => match v.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            _ => default,
        },
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.capacity, "1GB");
        assert_eq!(config.default_ttl, 3600);
        assert!(config.prediction_enabled);
        assert!(config.compression);
        assert!(!config.encryption);
        assert_eq!(config.sweep_interval, 0);
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.capacity_bytes().unwrap(), 1024 * 1024 * 1024);
    }

    #[test]
    fn test_config_from_env_defaults() {
        env::remove_var("CACHE_CAPACITY");
        env::remove_var("PREDICTOR_MAX_KEYS");
        env::remove_var("SWEEP_INTERVAL");

        let config = Config::from_env();
        assert_eq!(config.capacity, "1GB");
        assert_eq!(config.predictor_max_keys, 0);
        assert_eq!(config.sweep_interval, 0);
    }

    #[test]
    fn test_parse_capacity_units() {
        assert_eq!(parse_capacity("1024").unwrap(), 1024);
        assert_eq!(parse_capacity("512B").unwrap(), 512);
        assert_eq!(parse_capacity("64KB").unwrap(), 64 * 1024);
        assert_eq!(parse_capacity("100MB").unwrap(), 100 * 1024 * 1024);
        assert_eq!(parse_capacity("2GB").unwrap(), 2 * 1024 * 1024 * 1024);
    }

    #[test]
    fn test_parse_capacity_rejects_bad_formats() {
        for input in ["", "MB", "10 MB", "10mb", "1.5GB", "10TB", "-5MB", " 10MB"] {
            assert!(
                matches!(parse_capacity(input), Err(CacheError::InvalidCapacityFormat(_))),
                "{input:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_parse_capacity_overflow() {
        assert!(parse_capacity("99999999999999999999GB").is_err());
        assert!(parse_capacity("18446744073709551615GB").is_err());
    }
}
