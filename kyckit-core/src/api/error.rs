//! Normalized failures of the authenticated request pipeline.

use serde::{Deserialize, Serialize};
use strum::Display;
use thiserror::Error;

/// Failure taxonomy shared by the pipeline and local persistence.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, uniffi::Enum,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ErrorKind {
    /// No response reached the client (connect failure, timeout).
    Network,
    /// 401, the session has been evicted.
    Auth,
    /// 400, or a 2xx envelope reporting `success: false`.
    Validation,
    /// 403.
    Permission,
    /// 404.
    NotFound,
    /// 413.
    FileSize,
    /// 429.
    RateLimit,
    /// 500.
    Server,
    /// Any other status, or an undecodable success body.
    Unknown,
    /// Local persistence failure.
    Storage,
}

impl ErrorKind {
    /// Maps an HTTP status to its bucket.
    #[must_use]
    pub const fn from_status(status: u16) -> Self {
        match status {
            400 => Self::Validation,
            401 => Self::Auth,
            403 => Self::Permission,
            404 => Self::NotFound,
            413 => Self::FileSize,
            429 => Self::RateLimit,
            500 => Self::Server,
            _ => Self::Unknown,
        }
    }

    /// Message used when the backend does not provide one.
    #[must_use]
    pub const fn default_message(self) -> &'static str {
        match self {
            Self::Network => "Network error. Please check your connection and try again.",
            Self::Auth => "Your session has expired. Please log in again.",
            Self::Validation => "The request was invalid. Please check your input.",
            Self::Permission => "You do not have permission to perform this action.",
            Self::NotFound => "The requested resource was not found.",
            Self::FileSize => "The file is too large. Please choose a smaller file.",
            Self::RateLimit => "Too many requests. Please wait a moment and try again.",
            Self::Server => "Server error. Please try again later.",
            Self::Unknown => "An unexpected error occurred.",
            Self::Storage => "Could not save data on this device.",
        }
    }
}

/// Normalized failure of a backend call.
///
/// Produced by a pure mapping of the HTTP status and response body, so the
/// same response always yields the same error.
#[derive(Debug, Clone, PartialEq, Eq, Error, uniffi::Error)]
pub enum ApiError {
    /// No response was received.
    #[error("network error: {message}")]
    Network {
        /// Human-readable description.
        message: String,
    },
    /// The backend rejected the credentials (401).
    #[error("auth error: {message}")]
    Auth {
        /// Human-readable description.
        message: String,
    },
    /// The request was rejected as invalid (400).
    #[error("validation error: {message}")]
    Validation {
        /// Human-readable description.
        message: String,
    },
    /// The caller lacks permission (403).
    #[error("permission error: {message}")]
    Permission {
        /// Human-readable description.
        message: String,
    },
    /// The resource does not exist (404).
    #[error("not found: {message}")]
    NotFound {
        /// Human-readable description.
        message: String,
    },
    /// The uploaded payload is too large (413).
    #[error("file size error: {message}")]
    FileSize {
        /// Human-readable description.
        message: String,
    },
    /// The client is being rate limited (429).
    #[error("rate limited: {message}")]
    RateLimit {
        /// Human-readable description.
        message: String,
    },
    /// The backend failed (500).
    #[error("server error: {message}")]
    Server {
        /// Human-readable description.
        message: String,
    },
    /// Any other status.
    #[error("unexpected status {status}: {message}")]
    Unknown {
        /// HTTP status code.
        status: u16,
        /// Human-readable description.
        message: String,
    },
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

impl ApiError {
    /// Builds the error for a failed HTTP response.
    ///
    /// Uses the `message` field of a JSON body when present, otherwise the
    /// fixed default for the status bucket.
    #[must_use]
    pub fn from_response(status: u16, body: &str) -> Self {
        let kind = ErrorKind::from_status(status);
        let message = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|body| body.message)
            .filter(|message| !message.trim().is_empty())
            .unwrap_or_else(|| kind.default_message().to_string());
        Self::new(kind, message, status)
    }

    /// Builds a network failure.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    pub(crate) fn new(kind: ErrorKind, message: String, status: u16) -> Self {
        match kind {
            ErrorKind::Network => Self::Network { message },
            ErrorKind::Auth => Self::Auth { message },
            ErrorKind::Validation => Self::Validation { message },
            ErrorKind::Permission => Self::Permission { message },
            ErrorKind::NotFound => Self::NotFound { message },
            ErrorKind::FileSize => Self::FileSize { message },
            ErrorKind::RateLimit => Self::RateLimit { message },
            ErrorKind::Server => Self::Server { message },
            ErrorKind::Unknown | ErrorKind::Storage => Self::Unknown { status, message },
        }
    }

    /// Returns the taxonomy bucket.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Network { .. } => ErrorKind::Network,
            Self::Auth { .. } => ErrorKind::Auth,
            Self::Validation { .. } => ErrorKind::Validation,
            Self::Permission { .. } => ErrorKind::Permission,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::FileSize { .. } => ErrorKind::FileSize,
            Self::RateLimit { .. } => ErrorKind::RateLimit,
            Self::Server { .. } => ErrorKind::Server,
            Self::Unknown { .. } => ErrorKind::Unknown,
        }
    }

    /// Returns the human-readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Network { message }
            | Self::Auth { message }
            | Self::Validation { message }
            | Self::Permission { message }
            | Self::NotFound { message }
            | Self::FileSize { message }
            | Self::RateLimit { message }
            | Self::Server { message }
            | Self::Unknown { message, .. } => message,
        }
    }

    /// Returns the HTTP status of an unclassified response.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Unknown { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(400, ErrorKind::Validation ; "bad request")]
    #[test_case(401, ErrorKind::Auth ; "unauthorized")]
    #[test_case(403, ErrorKind::Permission ; "forbidden")]
    #[test_case(404, ErrorKind::NotFound ; "not found")]
    #[test_case(413, ErrorKind::FileSize ; "payload too large")]
    #[test_case(429, ErrorKind::RateLimit ; "too many requests")]
    #[test_case(500, ErrorKind::Server ; "internal error")]
    #[test_case(502, ErrorKind::Unknown ; "bad gateway")]
    #[test_case(418, ErrorKind::Unknown ; "teapot")]
    fn test_status_taxonomy(status: u16, expected: ErrorKind) {
        let err = ApiError::from_response(status, "");
        assert_eq!(err.kind(), expected);
        assert_eq!(err.message(), expected.default_message());
    }

    #[test]
    fn test_server_message_wins() {
        let err = ApiError::from_response(400, r#"{"success":false,"message":"Email is required"}"#);
        assert_eq!(
            err,
            ApiError::Validation {
                message: "Email is required".to_string()
            }
        );
    }

    #[test]
    fn test_blank_or_non_json_body_uses_default() {
        let err = ApiError::from_response(500, "<html>oops</html>");
        assert_eq!(err.message(), ErrorKind::Server.default_message());

        let err = ApiError::from_response(404, r#"{"message":"  "}"#);
        assert_eq!(err.message(), ErrorKind::NotFound.default_message());
    }

    #[test]
    fn test_mapping_is_deterministic() {
        let body = r#"{"message":"slow down"}"#;
        assert_eq!(
            ApiError::from_response(429, body),
            ApiError::from_response(429, body)
        );
    }

    #[test]
    fn test_unknown_keeps_status() {
        assert!(matches!(
            ApiError::from_response(503, ""),
            ApiError::Unknown { status: 503, .. }
        ));
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(ErrorKind::NotFound.to_string(), "notfound");
        assert_eq!(ErrorKind::FileSize.to_string(), "filesize");
        assert_eq!(ErrorKind::RateLimit.to_string(), "ratelimit");
        assert_eq!(
            serde_json::to_string(&ErrorKind::Network).unwrap(),
            r#""network""#
        );
    }
}
