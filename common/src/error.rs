use std::fmt;

use serde::{Deserialize, Serialize};

/// Error payload returned by the backend on non-2xx responses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl ErrorBody {
    /// Wraps a body that could not be decoded as JSON.
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        let text = text.trim();
        Self {
            message: (!text.is_empty()).then(|| text.to_string()),
            ..Self::default()
        }
    }
}

impl fmt::Display for ErrorBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.error, &self.message) {
            (Some(error), Some(message)) if !message.is_empty() => {
                write!(f, "{error}: {message}")
            }
            (_, Some(message)) => write!(f, "{message}"),
            (Some(error), None) => write!(f, "{error}"),
            (None, None) => write!(f, "no details"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_error_body_from_spring_payload() {
        let json = r#"{
            "timestamp": "2025-03-01T10:00:00.000+00:00",
            "status": 404,
            "error": "Not Found",
            "message": "Image not found",
            "path": "/api/images/42"
        }"#;
        let body: ErrorBody = serde_json::from_str(json).unwrap();
        assert_eq!(body.status, Some(404));
        assert_eq!(body.path.as_deref(), Some("/api/images/42"));
        assert_eq!(body.to_string(), "Not Found: Image not found");
    }

    #[test]
    fn test_error_body_partial_payload() {
        let body: ErrorBody = serde_json::from_str(r#"{"status": 400}"#).unwrap();
        assert_eq!(body.to_string(), "no details");
    }

    #[test]
    fn test_error_body_from_text() {
        assert_eq!(ErrorBody::from_text("  boom \n").to_string(), "boom");
        assert_eq!(ErrorBody::from_text("").message, None);
    }
}
