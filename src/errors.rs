use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for the sparrow ride client
#[derive(Debug, Error)]
pub enum SparrowError {
    // Network and HTTP client errors
    #[error("Network request timed out")]
    NetworkTimeout,
    #[error("Network connection error: {0}")]
    NetworkConnection(String),
    #[error("HTTP client error: {0}")]
    HttpClient(String),
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    // Non-2xx responses. `detail` is the server message or the call's default message.
    #[error("{detail}")]
    Api { status: u16, detail: String },

    // Serialization and parsing errors
    #[error("Invalid response from server: {0}")]
    MalformedResponse(String),
    #[error("JSON serialization error: {0}")]
    JsonSerialization(String),

    // Session and authentication errors
    #[error("Not authenticated: {0}")]
    Unauthenticated(String),
    #[error("Admin accounts cannot use the rider and driver app")]
    AdminSession,
    #[error("Session storage error: {0}")]
    Session(String),

    // Screen gating
    #[error("Driver profile is not approved")]
    DriverNotApproved,

    // Validation errors
    #[error("Validation failed: {} errors", .0.len())]
    ValidationFailed(Vec<ValidationError>),

    // Configuration and setup errors
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

// Convenience type alias for Results
pub type SparrowResult<T> = Result<T, SparrowError>;

impl From<reqwest::Error> for SparrowError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SparrowError::NetworkTimeout
        } else if err.is_connect() {
            SparrowError::NetworkConnection(err.to_string())
        } else if err.is_builder() {
            SparrowError::InvalidUrl(err.to_string())
        } else {
            SparrowError::HttpClient(err.to_string())
        }
    }
}

impl From<serde_json::Error> for SparrowError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_syntax() || err.is_eof() || err.is_data() {
            SparrowError::MalformedResponse(err.to_string())
        } else {
            SparrowError::JsonSerialization(err.to_string())
        }
    }
}

impl From<std::io::Error> for SparrowError {
    fn from(err: std::io::Error) -> Self {
        SparrowError::Session(err.to_string())
    }
}

// Helper functions for creating common errors
impl SparrowError {
    pub fn api(status: u16, detail: impl Into<String>) -> Self {
        SparrowError::Api {
            status,
            detail: detail.into(),
        }
    }

    pub fn unauthenticated(msg: impl Into<String>) -> Self {
        SparrowError::Unauthenticated(msg.into())
    }

    pub fn validation_error(field: impl Into<String>, message: impl Into<String>) -> Self {
        SparrowError::ValidationFailed(vec![ValidationError {
            field: field.into(),
            message: message.into(),
        }])
    }

    /// HTTP status for errors that came back from the server.
    pub fn status(&self) -> Option<u16> {
        match self {
            SparrowError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    /// Human readable text for an error banner.
    ///
    /// Server errors show their `detail`; malformed bodies get a fixed message and
    /// anything without text of its own falls back to `default_message`.
    pub fn banner_message(&self, default_message: &str) -> String {
        match self {
            SparrowError::Api { detail, .. } if !detail.trim().is_empty() => detail.clone(),
            SparrowError::Api { .. } => default_message.to_string(),
            SparrowError::MalformedResponse(_) => "Invalid response from server".to_string(),
            SparrowError::ValidationFailed(errors) => errors
                .first()
                .map(|e| e.message.clone())
                .unwrap_or_else(|| default_message.to_string()),
            other => {
                let text = other.to_string();
                if text.is_empty() {
                    default_message.to_string()
                } else {
                    text
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = SparrowError::api(409, "Trip already accepted");
        assert_eq!(error.to_string(), "Trip already accepted");
        assert_eq!(error.status(), Some(409));
    }

    #[test]
    fn test_validation_error() {
        let error = SparrowError::validation_error("otp", "OTP must be 6 digits");
        match &error {
            SparrowError::ValidationFailed(errors) => {
                assert_eq!(errors.len(), 1);
                assert_eq!(errors[0].field, "otp");
            }
            _ => panic!("Expected ValidationFailed error"),
        }
        assert_eq!(error.banner_message("Failed"), "OTP must be 6 digits");
    }

    #[test]
    fn test_banner_message_prefers_detail() {
        let error = SparrowError::api(400, "Trip cannot be cancelled now");
        assert_eq!(error.banner_message("Failed to cancel trip"), "Trip cannot be cancelled now");

        let blank = SparrowError::api(500, "  ");
        assert_eq!(blank.banner_message("Failed to cancel trip"), "Failed to cancel trip");

        let malformed = SparrowError::MalformedResponse("expected value".to_string());
        assert_eq!(malformed.banner_message("x"), "Invalid response from server");
    }

    #[test]
    fn test_status_helpers() {
        assert!(SparrowError::api(404, "Not found").is_not_found());
        assert!(SparrowError::api(401, "expired").is_unauthorized());
        assert!(!SparrowError::NetworkTimeout.is_not_found());
        assert_eq!(SparrowError::NetworkTimeout.status(), None);
    }
}
