use std::sync::Arc;

use serde::Deserialize;
use serde_json::json;

use crate::api::ApiClient;
use crate::error::KycKitError;
use crate::types::{AuthSession, LoginRequest, RegisterRequest, UserProfile};

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    token: String,
    #[serde(default)]
    user: Option<UserProfile>,
}

/// Login, registration and password flows (`/api/auth/*`).
///
/// Successful authentication is persisted through the session store of the
/// underlying [`ApiClient`], so every later call carries the new credentials.
#[derive(Debug, uniffi::Object)]
pub struct AuthService {
    api: Arc<ApiClient>,
}

#[uniffi::export(async_runtime = "tokio")]
impl AuthService {
    /// Creates the service over `api`.
    #[uniffi::constructor]
    #[must_use]
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    /// Logs in and persists the session.
    ///
    /// # Errors
    ///
    /// Returns the backend failure, or a storage error if the session cannot be persisted.
    pub async fn login(&self, request: LoginRequest) -> Result<AuthSession, KycKitError> {
        let session: AuthSession = self.api.post("/api/auth/login", &request).await?;
        self.persist(&session)?;
        Ok(session)
    }

    /// Creates an account and persists the resulting session.
    ///
    /// # Errors
    ///
    /// Returns the backend failure, or a storage error if the session cannot be persisted.
    pub async fn register(&self, request: RegisterRequest) -> Result<AuthSession, KycKitError> {
        let session: AuthSession = self.api.post("/api/auth/register", &request).await?;
        self.persist(&session)?;
        Ok(session)
    }

    /// Logs out. The local session is cleared even when the backend call fails.
    ///
    /// # Errors
    ///
    /// Returns an error only if the local session cannot be cleared.
    pub async fn logout(&self) -> Result<(), KycKitError> {
        if let Err(err) = self
            .api
            .post_unit("/api/auth/logout", &json!({}))
            .await
        {
            log::warn!("remote logout failed, clearing local session anyway: {err}");
        }
        self.api.sessions().clear_session()?;
        Ok(())
    }

    /// Exchanges the current token for a fresh one and returns it.
    ///
    /// # Errors
    ///
    /// Returns the backend failure, or a storage error if the token cannot be persisted.
    pub async fn refresh_token(&self) -> Result<String, KycKitError> {
        let refreshed: RefreshResponse = self.api.post("/api/auth/refresh", &json!({})).await?;
        let sessions = self.api.sessions();
        sessions.set_token(refreshed.token.clone())?;
        if let Some(user) = refreshed.user {
            sessions.update_user(user)?;
        }
        Ok(refreshed.token)
    }

    /// Requests a password reset email.
    ///
    /// # Errors
    ///
    /// Returns the backend failure.
    pub async fn forgot_password(&self, email: String) -> Result<(), KycKitError> {
        self.api
            .post_unit("/api/auth/forgot-password", &json!({ "email": email }))
            .await?;
        Ok(())
    }

    /// Sets a new password using the token from the reset email.
    ///
    /// # Errors
    ///
    /// Returns the backend failure.
    pub async fn reset_password(&self, token: String, password: String) -> Result<(), KycKitError> {
        self.api
            .post_unit(
                "/api/auth/reset-password",
                &json!({ "token": token, "password": password }),
            )
            .await?;
        Ok(())
    }

    /// Confirms the email address using the token from the verification email.
    ///
    /// # Errors
    ///
    /// Returns the backend failure.
    pub async fn verify_email(&self, token: String) -> Result<(), KycKitError> {
        self.api
            .post_unit("/api/auth/verify-email", &json!({ "token": token }))
            .await?;
        Ok(())
    }

    /// Fetches the signed-in user and refreshes the stored profile.
    ///
    /// # Errors
    ///
    /// Returns the backend failure, or a storage error if the profile cannot be persisted.
    pub async fn current_user(&self) -> Result<UserProfile, KycKitError> {
        let user: UserProfile = self.api.get("/api/auth/me").await?;
        self.api.sessions().update_user(user.clone())?;
        Ok(user)
    }

    /// Returns `true` when a token is stored.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.api.sessions().is_authenticated()
    }
}

impl AuthService {
    fn persist(&self, session: &AuthSession) -> Result<(), KycKitError> {
        self.api
            .sessions()
            .set_session(session.user.clone(), session.token.clone())?;
        log::info!("session established for user {}", session.user.id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ErrorKind;
    use crate::defaults::ClientConfig;
    use crate::session::SessionStore;
    use crate::storage::MemoryBackend;
    use mockito::{Matcher, Server};

    fn service(base_url: &str) -> AuthService {
        let sessions = Arc::new(SessionStore::new(Arc::new(MemoryBackend::new())));
        AuthService::new(Arc::new(ApiClient::new(
            ClientConfig::with_base_url(base_url),
            sessions,
        )))
    }

    fn login_request() -> LoginRequest {
        LoginRequest {
            email: "a@x.com".to_string(),
            password: "p".to_string(),
        }
    }

    #[tokio::test]
    async fn test_login_persists_session() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/api/auth/login")
            .match_body(Matcher::Json(
                serde_json::json!({"email": "a@x.com", "password": "p"}),
            ))
            .with_status(200)
            .with_body(r#"{"success":true,"data":{"user":{"id":"1"},"token":"eyJ..."}}"#)
            .create_async()
            .await;

        let auth = service(&server.url());
        assert!(!auth.is_authenticated());

        let session = auth.login(login_request()).await.unwrap();
        mock.assert_async().await;
        assert_eq!(session.token, "eyJ...");

        let stored = auth.api.sessions().get_session();
        assert_eq!(stored.token.as_deref(), Some("eyJ..."));
        assert_eq!(stored.user.map(|user| user.id).as_deref(), Some("1"));
        assert!(auth.is_authenticated());
    }

    #[tokio::test]
    async fn test_failed_login_leaves_no_session() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/api/auth/login")
            .with_status(400)
            .with_body(r#"{"success":false,"message":"Invalid credentials"}"#)
            .create_async()
            .await;

        let auth = service(&server.url());
        let err = auth.login(login_request()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.to_string(), "validation error: Invalid credentials");
        assert!(!auth.is_authenticated());
    }

    #[tokio::test]
    async fn test_logout_clears_session_when_backend_fails() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/api/auth/logout")
            .with_status(500)
            .create_async()
            .await;

        let auth = service(&server.url());
        auth.api
            .sessions()
            .set_session(UserProfile::with_id("1"), "t".to_string())
            .unwrap();

        auth.logout().await.unwrap();
        assert!(!auth.is_authenticated());
    }

    #[tokio::test]
    async fn test_refresh_token_replaces_token_only() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/api/auth/refresh")
            .match_header("authorization", "Bearer old")
            .with_status(200)
            .with_body(r#"{"success":true,"data":{"token":"new"}}"#)
            .create_async()
            .await;

        let auth = service(&server.url());
        auth.api
            .sessions()
            .set_session(UserProfile::with_id("1"), "old".to_string())
            .unwrap();

        assert_eq!(auth.refresh_token().await.unwrap(), "new");
        let stored = auth.api.sessions().get_session();
        assert_eq!(stored.token.as_deref(), Some("new"));
        assert_eq!(stored.user, Some(UserProfile::with_id("1")));
    }

    #[tokio::test]
    async fn test_current_user_updates_profile() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/api/auth/me")
            .with_status(200)
            .with_body(
                r#"{"success":true,"data":{"id":"1","email":"a@x.com","isEmailVerified":true}}"#,
            )
            .create_async()
            .await;

        let auth = service(&server.url());
        let user = auth.current_user().await.unwrap();
        assert!(user.is_email_verified);
        assert_eq!(auth.api.sessions().user(), Some(user));
    }

    #[tokio::test]
    async fn test_register_sends_profile_and_persists_session() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/api/auth/register")
            .match_body(Matcher::Json(serde_json::json!({
                "email": "b@x.com",
                "password": "secret",
                "firstName": "Ada",
                "lastName": "Lovelace",
                "phoneNumber": "+15551234567"
            })))
            .with_status(201)
            .with_body(r#"{"success":true,"data":{"user":{"id":"2"},"token":"reg"}}"#)
            .create_async()
            .await;

        let auth = service(&server.url());
        let session = auth
            .register(RegisterRequest {
                email: "b@x.com".to_string(),
                password: "secret".to_string(),
                first_name: "Ada".to_string(),
                last_name: "Lovelace".to_string(),
                phone_number: Some("+15551234567".to_string()),
            })
            .await
            .unwrap();
        mock.assert_async().await;

        assert_eq!(session.user.id, "2");
        let stored = auth.api.sessions().get_session();
        assert_eq!(stored.token.as_deref(), Some("reg"));
        assert_eq!(stored.user.map(|user| user.id).as_deref(), Some("2"));
    }

    #[tokio::test]
    async fn test_forgot_password_sends_email() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/api/auth/forgot-password")
            .match_body(Matcher::Json(serde_json::json!({"email": "a@x.com"})))
            .with_status(200)
            .with_body(r#"{"success":true,"message":"Reset email sent"}"#)
            .create_async()
            .await;

        service(&server.url())
            .forgot_password("a@x.com".to_string())
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_reset_password_sends_token_and_password() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/api/auth/reset-password")
            .match_body(Matcher::Json(
                serde_json::json!({"token": "reset-1", "password": "n3w"}),
            ))
            .with_status(200)
            .with_body(r#"{"success":true,"data":{"reset":true}}"#)
            .create_async()
            .await;

        service(&server.url())
            .reset_password("reset-1".to_string(), "n3w".to_string())
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_verify_email_sends_token() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/api/auth/verify-email")
            .match_body(Matcher::Json(serde_json::json!({"token": "mail-1"})))
            .with_status(200)
            .with_body(r#"{"success":true}"#)
            .create_async()
            .await;

        service(&server.url())
            .verify_email("mail-1".to_string())
            .await
            .unwrap();
        mock.assert_async().await;
    }
}
