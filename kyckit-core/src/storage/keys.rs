//! Names of the entries persisted on the device.

/// Raw bearer token. Stored verbatim, never JSON-encoded.
pub const TOKEN: &str = "token";
/// JSON user profile.
pub const USER: &str = "user";
/// JSON user profile, legacy alias written alongside [`USER`].
pub const USER_PROFILE: &str = "userProfile";
/// RFC 3339 timestamp of the last successful login.
pub const LAST_LOGIN_TIME: &str = "lastLoginTime";
/// JSON array of cached documents.
pub const CACHED_DOCUMENTS: &str = "cachedDocuments";
/// JSON object with the last KYC status returned by the backend.
pub const KYC_DATA: &str = "kycData";
/// JSON object with the local KYC progress record.
pub const KYC_PROGRESS: &str = "kycProgress";
/// JSON map of document type to uploaded document.
pub const UPLOADED_DOCUMENTS: &str = "uploadedDocuments";
/// JSON object with the app settings.
pub const APP_SETTINGS: &str = "appSettings";

/// Entries that make up the session. Cleared on logout and on 401 responses.
pub const SESSION_KEYS: [&str; 4] = [TOKEN, USER, USER_PROFILE, LAST_LOGIN_TIME];

/// Cached per-user data, cleared together with the session on account deletion.
pub const USER_DATA_KEYS: [&str; 4] =
    [CACHED_DOCUMENTS, KYC_DATA, KYC_PROGRESS, UPLOADED_DOCUMENTS];
