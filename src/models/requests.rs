//! Request DTOs for the lake cache API
//!
//! Defines the structure of incoming HTTP request bodies.

use serde::Deserialize;

use super::LakeConditions;

/// Maximum allowed key length in bytes
pub const MAX_KEY_LENGTH: usize = 256;

/// Request body for `PUT /lakes/:key`
///
/// # Fields
/// - `value`: The conditions to cache
/// - `timeout`: Optional timeout in seconds (uses the default if not specified)
#[derive(Debug, Clone, Deserialize)]
pub struct PutRequest {
    /// The record to store
    pub value: LakeConditions,
    /// Optional timeout in seconds
    #[serde(default)]
    pub timeout: Option<u32>,
}

/// Validates a key taken from the request path.
///
/// Returns an error message if validation fails, None if valid.
pub fn validate_key(key: &str) -> Option<String> {
    if key.trim().is_empty() {
        return Some("Key cannot be empty".to_string());
    }
    if key.len() > MAX_KEY_LENGTH {
        return Some(format!(
            "Key exceeds maximum length of {} bytes",
            MAX_KEY_LENGTH
        ));
    }
    None
}
