//! Request DTOs for the cache HTTP facade
//!
//! Defines the structure of incoming HTTP request bodies.

use serde::Deserialize;
use serde_json::Value;

use crate::cache::{SetOptions, MAX_KEY_LENGTH};

/// Request body for the SET operation (PUT /set)
///
/// # Fields
/// - `key`: The cache key to store the value under
/// - `value`: Any JSON value
/// - `ttl`: Optional TTL in seconds (absent or 0 uses the default)
/// - `priority`: Optional eviction priority in [0, 1]
#[derive(Debug, Clone, Deserialize)]
pub struct SetRequest {
    /// The cache key
    pub key: String,
    /// The value to store
    pub value: Value,
    /// Optional TTL in seconds
    #[serde(default)]
    pub ttl: Option<u64>,
    /// Optional eviction priority
    #[serde(default)]
    pub priority: Option<f64>,
}

impl SetRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.key.is_empty() {
            return Some("Key cannot be empty".to_string());
        }
        if self.key.len() > MAX_KEY_LENGTH {
            return Some(format!(
                "Key exceeds maximum length of {} characters",
                MAX_KEY_LENGTH
            ));
        }
        if let Some(p) = self.priority {
            if !(0.0..=1.0).contains(&p) {
                return Some("Priority must be between 0 and 1".to_string());
            }
        }
        None
    }

    /// Engine options carried by this request.
    pub fn options(&self) -> SetOptions {
        SetOptions {
            ttl_seconds: self.ttl,
            priority: self.priority,
            ..SetOptions::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(key: &str, priority: Option<f64>) -> SetRequest {
        SetRequest {
            key: key.to_string(),
            value: json!("test"),
            ttl: None,
            priority,
        }
    }

    #[test]
    fn test_set_request_deserialize() {
        let json = r#"{"key": "test", "value": {"a": [1, 2]}}"#;
        let req: SetRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.key, "test");
        assert_eq!(req.value, json!({"a": [1, 2]}));
        assert!(req.ttl.is_none());
        assert!(req.priority.is_none());
    }

    #[test]
    fn test_set_request_with_ttl_and_priority() {
        let json = r#"{"key": "test", "value": "hello", "ttl": 60, "priority": 0.8}"#;
        let req: SetRequest = serde_json::from_str(json).unwrap();

        let opts = req.options();
        assert_eq!(opts.ttl_seconds, Some(60));
        assert_eq!(opts.priority, Some(0.8));
    }

    #[test]
    fn test_validate_empty_key() {
        assert!(request("", None).validate().is_some());
    }

    #[test]
    fn test_validate_long_key() {
        let key = "x".repeat(MAX_KEY_LENGTH + 1);
        assert!(request(&key, None).validate().is_some());
    }

    #[test]
    fn test_validate_priority_range() {
        assert!(request("k", Some(1.5)).validate().is_some());
        assert!(request("k", Some(-0.1)).validate().is_some());
        assert!(request("k", Some(0.3)).validate().is_none());
    }
}
