use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Body returned by every failed request.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    /// Message of the underlying failure when an upstream call failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
            message: None,
        }
    }

    pub fn with_details<D: Display>(mut self, details: D) -> Self {
        self.details = Some(details.to_string());
        self
    }

    pub fn with_message<M: Display>(mut self, message: M) -> Self {
        self.message = Some(message.to_string());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn omits_empty_optional_fields() {
        let body = serde_json::to_value(ErrorResponse::new("Invalid token.")).unwrap();
        assert_eq!(body, serde_json::json!({ "error": "Invalid token." }));
    }

    #[test]
    fn carries_details() {
        let body = ErrorResponse::new("Failed to humanize text using AI.").with_details("HTTP 429");
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["details"], "HTTP 429");
        assert!(json.get("message").is_none());
    }
}
