use thiserror::Error;

use crate::api::{ApiError, ErrorKind};
use crate::storage::StorageError;

/// Error outputs from `KycKit`
///
/// Hosts branch on `kind` of [`KycKitError::Api`] to tell an expired session
/// from a dropped connection without parsing messages.
#[derive(Debug, Error, uniffi::Error)]
pub enum KycKitError {
    /// A backend call failed.
    #[error("{}", describe_api(.kind, .status, .message))]
    Api {
        /// Taxonomy bucket of the failure.
        kind: ErrorKind,
        /// HTTP status, only set when the status has no bucket of its own.
        status: Option<u16>,
        /// Server message, or the default message of the bucket.
        message: String,
    },
    /// Local persistence failed.
    #[error("{message}")]
    Storage {
        /// Description of the storage failure.
        message: String,
    },
    /// The presented input is not valid for the requested operation
    #[error("invalid_input: {message}")]
    InvalidInput {
        /// What was wrong with the input.
        message: String,
    },
    /// In-memory state could not be accessed (poisoned lock)
    #[error("state_error: {message}")]
    State {
        /// Which state could not be accessed.
        message: String,
    },
}

#[allow(clippy::trivially_copy_pass_by_ref, clippy::ref_option)]
fn describe_api(kind: &ErrorKind, status: &Option<u16>, message: &str) -> String {
    ApiError::new(*kind, message.to_string(), status.unwrap_or_default()).to_string()
}

impl From<ApiError> for KycKitError {
    fn from(err: ApiError) -> Self {
        Self::Api {
            kind: err.kind(),
            status: err.status(),
            message: err.message().to_string(),
        }
    }
}

impl From<StorageError> for KycKitError {
    fn from(err: StorageError) -> Self {
        Self::Storage {
            message: err.to_string(),
        }
    }
}

impl KycKitError {
    /// Builds an [`KycKitError::InvalidInput`].
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Returns the taxonomy bucket of the failure.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Api { kind, .. } => *kind,
            Self::Storage { .. } => ErrorKind::Storage,
            Self::InvalidInput { .. } => ErrorKind::Validation,
            Self::State { .. } => ErrorKind::Unknown,
        }
    }

    /// Returns the underlying backend failure, if this is one.
    #[must_use]
    pub fn as_api(&self) -> Option<ApiError> {
        match self {
            Self::Api {
                kind,
                status,
                message,
            } => Some(ApiError::new(
                *kind,
                message.clone(),
                status.unwrap_or_default(),
            )),
            _ => None,
        }
    }

    /// Returns the human-readable message without the bucket prefix.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Api { message, .. } | Self::Storage { message } => message.clone(),
            _ => self.to_string(),
        }
    }
}
