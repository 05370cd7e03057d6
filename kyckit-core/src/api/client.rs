use std::sync::Arc;

use reqwest::{Method, RequestBuilder};
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::Serialize;

use super::envelope::unwrap_payload;
use super::{ApiError, ApiResult};
use crate::defaults::ClientConfig;
use crate::http_request::Request;
use crate::session::SessionStore;

/// Header carrying the id of the signed-in user.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Client for the onboarding backend.
///
/// Every call reads the token and user from the [`SessionStore`] and attaches
/// them as `Authorization: Bearer <token>` and `x-user-id`. Responses are
/// unwrapped to their payload; failures are normalized into [`ApiError`]. A
/// 401 from any endpoint evicts the session before the error is returned.
#[derive(Debug, uniffi::Object)]
pub struct ApiClient {
    base_url: String,
    request: Request,
    sessions: Arc<SessionStore>,
}

#[uniffi::export]
impl ApiClient {
    /// Creates a client for `config` that authenticates from `sessions`.
    #[uniffi::constructor]
    #[must_use]
    pub fn new(config: ClientConfig, sessions: Arc<SessionStore>) -> Self {
        if !config.base_url.starts_with("https://") {
            log::warn!("backend {} is not served over https", config.base_url);
        }
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            request: Request::new(config.timeout),
            sessions,
        }
    }

    /// Returns the backend base URL.
    #[must_use]
    pub fn base_url(&self) -> String {
        self.base_url.clone()
    }
}

impl ApiClient {
    /// Returns the session store this client authenticates from.
    #[must_use]
    pub const fn sessions(&self) -> &Arc<SessionStore> {
        &self.sessions
    }

    /// Issues a `GET`.
    ///
    /// # Errors
    ///
    /// Returns the normalized failure of the call.
    pub async fn get<T>(&self, path: &str) -> ApiResult<T>
    where
        T: DeserializeOwned,
    {
        self.send(Method::GET, path, None::<&()>).await
    }

    /// Issues a `POST` with a JSON body.
    ///
    /// # Errors
    ///
    /// Returns the normalized failure of the call.
    pub async fn post<B, T>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        self.send(Method::POST, path, Some(body)).await
    }

    /// Issues a `PUT` with a JSON body.
    ///
    /// # Errors
    ///
    /// Returns the normalized failure of the call.
    pub async fn put<B, T>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        self.send(Method::PUT, path, Some(body)).await
    }

    /// Issues a `DELETE`.
    ///
    /// # Errors
    ///
    /// Returns the normalized failure of the call.
    pub async fn delete<T>(&self, path: &str) -> ApiResult<T>
    where
        T: DeserializeOwned,
    {
        self.send(Method::DELETE, path, None::<&()>).await
    }

    /// Issues a `POST` and discards whatever payload the backend returns.
    ///
    /// # Errors
    ///
    /// Returns the normalized failure of the call.
    pub async fn post_unit<B>(&self, path: &str, body: &B) -> ApiResult<()>
    where
        B: Serialize + ?Sized + Sync,
    {
        self.post::<B, IgnoredAny>(path, body).await.map(|_| ())
    }

    /// Issues a `PUT` and discards whatever payload the backend returns.
    ///
    /// # Errors
    ///
    /// Returns the normalized failure of the call.
    pub async fn put_unit<B>(&self, path: &str, body: &B) -> ApiResult<()>
    where
        B: Serialize + ?Sized + Sync,
    {
        self.put::<B, IgnoredAny>(path, body).await.map(|_| ())
    }

    /// Issues a `DELETE` and discards whatever payload the backend returns.
    ///
    /// # Errors
    ///
    /// Returns the normalized failure of the call.
    pub async fn delete_unit(&self, path: &str) -> ApiResult<()> {
        self.delete::<IgnoredAny>(path).await.map(|_| ())
    }

    async fn send<B, T>(&self, method: Method, path: &str, body: Option<&B>) -> ApiResult<T>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let url = format!("{}{path}", self.base_url);
        let mut builder = self.authorize(self.request.req(method.clone(), &url));
        if let Some(body) = body {
            builder = builder.json(body);
        }

        log::debug!("{method} {path}");
        let response = self.request.handle(builder).await?;
        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|err| ApiError::network(format!("failed to read response from {url}: {err}")))?;
        log::debug!("{method} {path} -> {status}");

        self.process_response(status, &text)
    }

    /// Attaches whatever credentials the session store can provide. Storage
    /// read failures surface as missing entries, so the request always goes out.
    fn authorize(&self, mut builder: RequestBuilder) -> RequestBuilder {
        if let Some(token) = self.sessions.token() {
            builder = builder.bearer_auth(token);
        }
        if let Some(user) = self.sessions.user() {
            builder = builder.header(USER_ID_HEADER, user.id);
        }
        builder
    }

    fn process_response<T>(&self, status: u16, body: &str) -> ApiResult<T>
    where
        T: DeserializeOwned,
    {
        if (200..300).contains(&status) {
            return unwrap_payload(status, body);
        }

        let error = ApiError::from_response(status, body);
        if status == 401 {
            log::info!("received 401, evicting session");
            if let Err(err) = self.sessions.clear_session() {
                log::error!("failed to evict session after 401: {err}");
            }
        }
        Err(error)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::api::ErrorKind;
    use crate::storage::{KeyValueBackend, MemoryBackend, StorageError, StorageResult};
    use crate::types::UserProfile;
    use mockito::{Matcher, Server};
    use serde_json::{json, Value};

    fn client(base_url: &str) -> ApiClient {
        let sessions = Arc::new(SessionStore::new(Arc::new(MemoryBackend::new())));
        ApiClient::new(ClientConfig::with_base_url(base_url), sessions)
    }

    #[tokio::test]
    async fn test_credentials_are_attached() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/api/auth/me")
            .match_header("authorization", "Bearer eyJ.token")
            .match_header("x-user-id", "1")
            .match_header("user-agent", Matcher::Regex("^kyckit-core/".to_string()))
            .with_status(200)
            .with_body(r#"{"success":true,"data":{"id":"1"}}"#)
            .create_async()
            .await;

        let client = client(&server.url());
        client
            .sessions()
            .set_session(UserProfile::with_id("1"), "eyJ.token".to_string())
            .unwrap();

        let user: UserProfile = client.get("/api/auth/me").await.unwrap();
        assert_eq!(user.id, "1");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_anonymous_request_has_no_credentials() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/health")
            .match_header("authorization", Matcher::Missing)
            .match_header("x-user-id", Matcher::Missing)
            .with_status(200)
            .with_body(r#"{"status":"ok"}"#)
            .create_async()
            .await;

        let body: Value = client(&server.url()).get("/health").await.unwrap();
        assert_eq!(body, json!({"status": "ok"}));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_post_sends_json_body() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/api/kyc/send-phone-code")
            .match_body(Matcher::Json(json!({"phoneNumber": "+15550100"})))
            .with_status(200)
            .with_body(r#"{"success":true}"#)
            .create_async()
            .await;

        client(&server.url())
            .post_unit(
                "/api/kyc/send-phone-code",
                &json!({"phoneNumber": "+15550100"}),
            )
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_unit_calls_ignore_returned_data() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/api/auth/logout")
            .with_status(200)
            .with_body(r#"{"success":true,"data":{"revoked":["t1","t2"]}}"#)
            .create_async()
            .await;
        server
            .mock("PUT", "/api/users/password")
            .with_status(200)
            .with_body(r#"{"success":true,"data":"updated"}"#)
            .create_async()
            .await;
        server
            .mock("DELETE", "/api/documents/d1")
            .with_status(204)
            .create_async()
            .await;

        let client = client(&server.url());
        client.post_unit("/api/auth/logout", &json!({})).await.unwrap();
        client
            .put_unit("/api/users/password", &json!({}))
            .await
            .unwrap();
        client.delete_unit("/api/documents/d1").await.unwrap();
    }

    #[tokio::test]
    async fn test_unit_calls_still_report_failures() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/api/kyc/send-phone-code")
            .with_status(200)
            .with_body(r#"{"success":false,"message":"Invalid phone number"}"#)
            .create_async()
            .await;

        let err = client(&server.url())
            .post_unit("/api/kyc/send-phone-code", &json!({}))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            ApiError::Validation {
                message: "Invalid phone number".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_401_evicts_session() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/api/kyc/status")
            .with_status(401)
            .with_body(r#"{"success":false,"message":"Token expired"}"#)
            .create_async()
            .await;

        let client = client(&server.url());
        client
            .sessions()
            .set_session(UserProfile::with_id("1"), "stale".to_string())
            .unwrap();

        let err = client.get::<Value>("/api/kyc/status").await.unwrap_err();
        assert_eq!(
            err,
            ApiError::Auth {
                message: "Token expired".to_string()
            }
        );
        let session = client.sessions().get_session();
        assert_eq!(session.token, None);
        assert_eq!(session.user, None);
    }

    #[tokio::test]
    async fn test_other_failures_keep_session() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/api/kyc/status")
            .with_status(403)
            .create_async()
            .await;

        let client = client(&server.url());
        client
            .sessions()
            .set_session(UserProfile::with_id("1"), "t".to_string())
            .unwrap();

        let err = client.get::<Value>("/api/kyc/status").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Permission);
        assert!(client.sessions().is_authenticated());
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_network_error() {
        // Nothing listens on port 9 (discard) on test machines.
        let sessions = Arc::new(SessionStore::new(Arc::new(MemoryBackend::new())));
        let config = ClientConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            timeout: Duration::from_secs(2),
        };
        let err = ApiClient::new(config, sessions)
            .get::<Value>("/health")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Network);
    }

    #[tokio::test]
    async fn test_timeout_is_network_error() {
        // Accepts connections into the backlog but never answers.
        let silent = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let config = ClientConfig {
            base_url: format!("http://{}", silent.local_addr().unwrap()),
            timeout: Duration::from_millis(500),
        };
        let sessions = Arc::new(SessionStore::new(Arc::new(MemoryBackend::new())));

        let err = ApiClient::new(config, sessions)
            .get::<Value>("/health")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Network);
        assert!(err.message().contains("timed out"), "{err}");
        drop(silent);
    }

    struct LockedKeychain;

    impl KeyValueBackend for LockedKeychain {
        fn read(&self, _key: String) -> StorageResult<Option<String>> {
            Err(StorageError::Read("keychain locked".to_string()))
        }

        fn write(&self, _key: String, _value: String) -> StorageResult<()> {
            Ok(())
        }

        fn delete(&self, _key: String) -> StorageResult<()> {
            Ok(())
        }

        fn keys(&self) -> StorageResult<Vec<String>> {
            Err(StorageError::Read("keychain locked".to_string()))
        }
    }

    #[tokio::test]
    async fn test_unreadable_credentials_do_not_block_request() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/api/kyc/status")
            .match_header("authorization", Matcher::Missing)
            .match_header("x-user-id", Matcher::Missing)
            .with_status(200)
            .with_body(r#"{"success":true,"data":{"status":"pending"}}"#)
            .create_async()
            .await;

        let sessions = Arc::new(SessionStore::new(Arc::new(LockedKeychain)));
        let client = ApiClient::new(ClientConfig::with_base_url(server.url()), sessions);

        let status: Value = client.get("/api/kyc/status").await.unwrap();
        assert_eq!(status, json!({"status": "pending"}));
        mock.assert_async().await;
    }
}
