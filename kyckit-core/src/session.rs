//! Session store: token, user profile, settings and KYC progress entries.

use std::sync::Arc;

use chrono::{SecondsFormat, Utc};

use crate::kyc::KycProgress;
use crate::storage::{keys, KeyValueBackend, KeyValueStore, StorageResult};
use crate::types::{AppSettings, Session, UserProfile};

/// Owns the session-related entries of the key-value store.
///
/// A single instance is shared (behind an `Arc`) by the request pipeline, the
/// cache mirrors and the KYC flow, which gives one session per process without
/// any global state.
#[derive(Debug, uniffi::Object)]
pub struct SessionStore {
    store: KeyValueStore,
}

impl SessionStore {
    /// Creates a session store over an existing key-value store.
    #[must_use]
    pub const fn with_store(store: KeyValueStore) -> Self {
        Self { store }
    }

    /// Returns the underlying key-value store.
    #[must_use]
    pub const fn store(&self) -> &KeyValueStore {
        &self.store
    }
}

#[uniffi::export]
impl SessionStore {
    /// Creates a session store over a platform backend.
    #[uniffi::constructor]
    #[must_use]
    pub fn new(backend: Arc<dyn KeyValueBackend>) -> Self {
        Self::with_store(KeyValueStore::new(backend))
    }

    /// Persists a freshly authenticated session.
    ///
    /// The token, profile and login time are written one after the other. A
    /// failure part way leaves a partial session behind, which a new login
    /// overwrites.
    ///
    /// # Errors
    ///
    /// Returns the first storage write failure.
    pub fn set_session(&self, user: UserProfile, token: String) -> StorageResult<()> {
        self.store.set_raw(keys::TOKEN, &token)?;
        self.update_user(user)?;
        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        self.store.set(keys::LAST_LOGIN_TIME, &now)
    }

    /// Replaces the bearer token, keeping the rest of the session.
    ///
    /// # Errors
    ///
    /// Returns an error if the token cannot be written.
    pub fn set_token(&self, token: String) -> StorageResult<()> {
        self.store.set_raw(keys::TOKEN, &token)
    }

    /// Reads the current session. Missing entries are `None`.
    #[must_use]
    pub fn get_session(&self) -> Session {
        Session {
            token: self.token(),
            user: self.user(),
            last_login_time: self.store.get(keys::LAST_LOGIN_TIME),
        }
    }

    /// Removes the session entries. Settings and caches are left in place.
    ///
    /// # Errors
    ///
    /// Returns the first storage removal failure.
    pub fn clear_session(&self) -> StorageResult<()> {
        self.store.remove_many(keys::SESSION_KEYS)
    }

    /// Removes the session together with every cached per-user entry.
    ///
    /// # Errors
    ///
    /// Returns the first storage removal failure.
    pub fn clear_user_data(&self) -> StorageResult<()> {
        self.clear_session()?;
        self.store.remove_many(keys::USER_DATA_KEYS)
    }

    /// Returns the bearer token, if any.
    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.store
            .get::<String>(keys::TOKEN)
            .filter(|token| !token.is_empty())
    }

    /// Returns the stored user profile, if any.
    #[must_use]
    pub fn user(&self) -> Option<UserProfile> {
        self.store
            .get(keys::USER)
            .or_else(|| self.store.get(keys::USER_PROFILE))
    }

    /// Replaces the stored user profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the profile cannot be written.
    pub fn update_user(&self, user: UserProfile) -> StorageResult<()> {
        self.store.set(keys::USER, &user)?;
        self.store.set(keys::USER_PROFILE, &user)
    }

    /// Returns `true` when a token is present.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    /// Returns the app settings, falling back to defaults.
    #[must_use]
    pub fn app_settings(&self) -> AppSettings {
        self.store.get(keys::APP_SETTINGS).unwrap_or_default()
    }

    /// Replaces the app settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings cannot be written.
    pub fn set_app_settings(&self, settings: AppSettings) -> StorageResult<()> {
        self.store.set(keys::APP_SETTINGS, &settings)
    }

    /// Returns the persisted KYC progress, if any.
    #[must_use]
    pub fn kyc_progress(&self) -> Option<KycProgress> {
        self.store.get(keys::KYC_PROGRESS)
    }

    /// Persists the KYC progress record.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be written.
    pub fn save_kyc_progress(&self, progress: KycProgress) -> StorageResult<()> {
        self.store.set(keys::KYC_PROGRESS, &progress)
    }
}
