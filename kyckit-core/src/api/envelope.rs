//! Response envelope of the backend: `{success, data?, message?}`.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

use super::error::{ApiError, ErrorKind};
use crate::error::KycKitError;

/// Uniform result shape, both on the wire and for hosts that branch on `success`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    /// Whether the operation succeeded.
    pub success: bool,
    /// Payload of a successful operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Human-readable message, always present on failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Failure bucket, only set on failure.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub error_type: Option<ErrorKind>,
}

impl<T> ApiEnvelope<T> {
    /// Folds an operation result into the uniform shape. Local failures are
    /// reported under their own bucket (`storage`, `validation`).
    pub fn from_result<E>(result: Result<T, E>) -> Self
    where
        E: Into<KycKitError>,
    {
        match result {
            Ok(data) => Self {
                success: true,
                data: Some(data),
                message: None,
                error_type: None,
            },
            Err(err) => {
                let err = err.into();
                Self {
                    success: false,
                    data: None,
                    message: Some(err.message()),
                    error_type: Some(err.kind()),
                }
            }
        }
    }
}

/// Extracts the payload of a 2xx response body.
///
/// Bodies shaped like an envelope are unwrapped to their `data` (a missing
/// `data` decodes as JSON `null`); an envelope with `success: false` is a
/// validation failure. Bodies that are not envelopes are decoded as the
/// payload directly.
pub(crate) fn unwrap_payload<T>(status: u16, body: &str) -> Result<T, ApiError>
where
    T: DeserializeOwned,
{
    let value = if body.trim().is_empty() {
        Value::Null
    } else {
        serde_json::from_str::<Value>(body).map_err(|err| ApiError::Unknown {
            status,
            message: format!("failed to parse response body: {err}"),
        })?
    };

    let is_envelope = value
        .as_object()
        .is_some_and(|map| map.get("success").is_some_and(Value::is_boolean));

    let payload = if is_envelope {
        let envelope: ApiEnvelope<Value> =
            serde_json::from_value(value).map_err(|err| ApiError::Unknown {
                status,
                message: format!("failed to parse response envelope: {err}"),
            })?;
        if !envelope.success {
            return Err(ApiError::Validation {
                message: envelope
                    .message
                    .unwrap_or_else(|| ErrorKind::Validation.default_message().to_string()),
            });
        }
        envelope.data.unwrap_or(Value::Null)
    } else {
        value
    };

    serde_json::from_value(payload).map_err(|err| ApiError::Unknown {
        status,
        message: format!("unexpected response payload: {err}"),
    })
}
