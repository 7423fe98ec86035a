//! Shared error response structure

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Standard error response structure used across all API endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code for client identification
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// Additional error details (field errors, etc.)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, serde_json::Value>>,

    /// Timestamp when the error occurred
    pub timestamp: DateTime<Utc>,
}

impl ErrorResponse {
    /// Create a new error response
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            details: None,
            timestamp: Utc::now(),
        }
    }

    /// Add a detail field to the error response
    pub fn add_detail(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        let details = self.details.get_or_insert_with(HashMap::new);
        if let Ok(json_value) = serde_json::to_value(value) {
            details.insert(key.into(), json_value);
        }
        self
    }
}

/// Error codes returned in [`ErrorResponse::error`]
pub mod error_codes {
    pub const UNAUTHORIZED: &str = "unauthorized";
    pub const INVALID_REFRESH_TOKEN: &str = "invalid_refresh_token";
    pub const INVALID_VERIFICATION_CODE: &str = "invalid_verification_code";
    pub const INVALID_CREDENTIALS: &str = "invalid_credentials";
    pub const CONFLICT: &str = "conflict";
    pub const VALIDATION_ERROR: &str = "validation_error";
    pub const NOT_FOUND: &str = "not_found";
    pub const SERVICE_UNAVAILABLE: &str = "service_unavailable";
    pub const INTERNAL_ERROR: &str = "internal_error";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response_skips_empty_details() {
        let response = ErrorResponse::new(error_codes::UNAUTHORIZED, "Authentication required");
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["error"], "unauthorized");
        assert!(json.get("details").is_none());
    }

    #[test]
    fn test_add_detail() {
        let response = ErrorResponse::new(error_codes::VALIDATION_ERROR, "Invalid request data")
            .add_detail("field", "email");

        let details = response.details.unwrap();
        assert_eq!(details["field"], serde_json::json!("email"));
    }
}
