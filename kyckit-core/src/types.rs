//! Records exchanged with the backend and persisted on the device.

use serde::{Deserialize, Deserializer, Serialize};

/// Profile of the signed-in user.
///
/// Unknown fields sent by the backend are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, uniffi::Record)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Backend identifier of the user. Sent as the `x-user-id` header.
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    /// Email address.
    #[serde(default)]
    pub email: Option<String>,
    /// Given name.
    #[serde(default)]
    pub first_name: Option<String>,
    /// Family name.
    #[serde(default)]
    pub last_name: Option<String>,
    /// Phone number in E.164 format.
    #[serde(default)]
    pub phone_number: Option<String>,
    /// Whether the email address has been confirmed.
    #[serde(default)]
    pub is_email_verified: bool,
    /// KYC status as reported by the backend (e.g. `pending`, `approved`).
    #[serde(default)]
    pub kyc_status: Option<String>,
    /// Account creation time (RFC 3339).
    #[serde(default)]
    pub created_at: Option<String>,
}

impl UserProfile {
    /// Creates a profile carrying only an identifier.
    #[must_use]
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: None,
            first_name: None,
            last_name: None,
            phone_number: None,
            is_email_verified: false,
            kyc_status: None,
            created_at: None,
        }
    }
}

/// Locally persisted session. Every field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, uniffi::Record)]
pub struct Session {
    /// Bearer token.
    pub token: Option<String>,
    /// Profile of the signed-in user.
    pub user: Option<UserProfile>,
    /// Time of the last successful login (RFC 3339).
    pub last_login_time: Option<String>,
}

/// Application settings. Missing fields take their defaults when loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, uniffi::Record)]
#[serde(rename_all = "camelCase", default)]
pub struct AppSettings {
    /// Push notifications enabled.
    pub notifications: bool,
    /// Biometric unlock enabled.
    pub biometric_auth: bool,
    /// UI language code.
    pub language: String,
    /// UI theme name.
    pub theme: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            notifications: true,
            biometric_auth: false,
            language: "en".to_string(),
            theme: "light".to_string(),
        }
    }
}

/// A document uploaded as part of the KYC flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, uniffi::Record)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Backend identifier. Unique within the cached collection.
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    /// Document type (`passport`, `drivers_license`, `national_id`, ...).
    #[serde(rename = "type")]
    pub document_type: String,
    /// Original file name.
    pub filename: String,
    /// Upload status.
    #[serde(default)]
    pub status: String,
    /// Verification status assigned by the backend.
    #[serde(default)]
    pub verification_status: String,
    /// Upload time (RFC 3339).
    #[serde(default)]
    pub uploaded_at: String,
}

/// Credentials for `POST /api/auth/login`.
#[derive(Debug, Clone, Serialize, uniffi::Record)]
pub struct LoginRequest {
    /// Email address.
    pub email: String,
    /// Password.
    pub password: String,
}

/// Payload for `POST /api/auth/register`.
#[derive(Debug, Clone, Serialize, uniffi::Record)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    /// Email address.
    pub email: String,
    /// Password.
    pub password: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Phone number in E.164 format.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
}

/// Profile fields accepted by `PUT /api/user/profile`. Missing fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, uniffi::Record)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    /// Given name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    /// Family name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    /// Phone number in E.164 format.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
}

/// Result of a successful login, registration or token refresh.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, uniffi::Record)]
#[serde(rename_all = "camelCase")]
pub struct AuthSession {
    /// Profile of the authenticated user.
    pub user: UserProfile,
    /// Bearer token.
    pub token: String,
}

/// Backend health report from `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, uniffi::Record)]
pub struct HealthStatus {
    /// Overall status string (`ok` when healthy).
    pub status: String,
    /// Backend version, when reported.
    #[serde(default)]
    pub version: Option<String>,
}

/// Accepts identifiers sent either as JSON strings or as JSON numbers.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(text) => text,
        Id::Number(number) => number.to_string(),
    })
}
