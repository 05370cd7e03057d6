use std::sync::Arc;

use serde_json::{json, Value};

use crate::api::ApiClient;
use crate::cache::ValueMirror;
use crate::error::KycKitError;
use crate::storage::keys;
use crate::types::{AppSettings, ProfileUpdate, UserProfile};

/// Wire names of the [`AppSettings`] fields.
const SETTINGS_FIELDS: [&str; 4] = ["notifications", "biometricAuth", "language", "theme"];

/// Profile, password, settings and account endpoints.
#[derive(Debug, uniffi::Object)]
pub struct UserService {
    api: Arc<ApiClient>,
}

#[uniffi::export(async_runtime = "tokio")]
impl UserService {
    /// Creates the service over `api`.
    #[uniffi::constructor]
    #[must_use]
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    /// Updates profile fields and stores the returned profile.
    ///
    /// # Errors
    ///
    /// Returns the backend failure, or a storage error if the profile cannot be persisted.
    pub async fn update_profile(&self, update: ProfileUpdate) -> Result<UserProfile, KycKitError> {
        let user: UserProfile = self.api.put("/api/user/profile", &update).await?;
        self.api.sessions().update_user(user.clone())?;
        Ok(user)
    }

    /// Changes the account password.
    ///
    /// # Errors
    ///
    /// Returns the backend failure.
    pub async fn change_password(
        &self,
        current_password: String,
        new_password: String,
    ) -> Result<(), KycKitError> {
        self.api
            .put_unit(
                "/api/users/password",
                &json!({
                    "currentPassword": current_password,
                    "newPassword": new_password,
                }),
            )
            .await?;
        Ok(())
    }

    /// Fetches the settings, mirroring them locally. Falls back to the local
    /// copy when the backend cannot be reached.
    ///
    /// # Errors
    ///
    /// Returns the backend failure when no local copy exists.
    pub async fn settings(&self) -> Result<AppSettings, KycKitError> {
        let api = &self.api;
        self.settings_mirror()
            .read_through(|| async move {
                api.get::<AppSettings>("/api/users/settings")
                    .await
                    .map_err(KycKitError::from)
            })
            .await
    }

    /// Saves the settings remotely, then locally. The backend's copy is kept
    /// when it echoes the settings back, otherwise the sent settings are.
    ///
    /// # Errors
    ///
    /// Returns the backend failure, or a storage error if the settings cannot be persisted.
    pub async fn update_settings(&self, settings: AppSettings) -> Result<AppSettings, KycKitError> {
        let returned: Value = self.api.put("/api/users/settings", &settings).await?;
        let echoed = returned
            .as_object()
            .is_some_and(|fields| SETTINGS_FIELDS.iter().any(|field| fields.contains_key(*field)));
        let saved = if echoed {
            serde_json::from_value(returned).unwrap_or(settings)
        } else {
            settings
        };
        self.api.sessions().set_app_settings(saved.clone())?;
        Ok(saved)
    }

    /// Deletes the account and wipes the session and every cached per-user entry.
    ///
    /// # Errors
    ///
    /// Returns the backend failure (local data is kept in that case), or a
    /// storage error if local data cannot be removed.
    pub async fn delete_account(&self) -> Result<(), KycKitError> {
        self.api.delete_unit("/api/users/account").await?;
        self.api.sessions().clear_user_data()?;
        Ok(())
    }
}

impl UserService {
    fn settings_mirror(&self) -> ValueMirror<AppSettings> {
        ValueMirror::new(self.api.sessions().store().clone(), keys::APP_SETTINGS)
    }
}
