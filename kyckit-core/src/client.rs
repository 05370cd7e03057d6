use std::sync::Arc;

use crate::api::ApiClient;
use crate::defaults::ClientConfig;
use crate::kyc::KycFlow;
use crate::services::{AuthService, DocumentService, KycService, UserService};
use crate::session::SessionStore;
use crate::storage::KeyValueBackend;

/// Entry point for host applications.
///
/// Wires one [`SessionStore`] into the [`ApiClient`], every service and the
/// [`KycFlow`], so they all share the same credentials and storage.
#[derive(Debug, uniffi::Object)]
pub struct KycClient {
    sessions: Arc<SessionStore>,
    api: Arc<ApiClient>,
    auth: Arc<AuthService>,
    user: Arc<UserService>,
    kyc: Arc<KycService>,
    documents: Arc<DocumentService>,
    flow: Arc<KycFlow>,
}

#[uniffi::export]
impl KycClient {
    /// Builds the client for `config`, persisting into `backend`.
    #[uniffi::constructor]
    #[must_use]
    pub fn new(config: ClientConfig, backend: Arc<dyn KeyValueBackend>) -> Self {
        let sessions = Arc::new(SessionStore::new(backend));
        let api = Arc::new(ApiClient::new(config, sessions.clone()));
        let kyc = Arc::new(KycService::new(api.clone()));
        let documents = Arc::new(DocumentService::new(api.clone()));
        let flow = Arc::new(KycFlow::new(
            sessions.clone(),
            kyc.clone(),
            documents.clone(),
        ));
        log::debug!("kyckit client ready for {}", api.base_url());

        Self {
            auth: Arc::new(AuthService::new(api.clone())),
            user: Arc::new(UserService::new(api.clone())),
            sessions,
            api,
            kyc,
            documents,
            flow,
        }
    }

    /// Persisted session, settings and progress.
    #[must_use]
    pub fn sessions(&self) -> Arc<SessionStore> {
        self.sessions.clone()
    }

    /// Raw backend client, also used for health checks.
    #[must_use]
    pub fn api(&self) -> Arc<ApiClient> {
        self.api.clone()
    }

    /// Login, registration and password flows.
    #[must_use]
    pub fn auth(&self) -> Arc<AuthService> {
        self.auth.clone()
    }

    /// Profile, settings and account management.
    #[must_use]
    pub fn user(&self) -> Arc<UserService> {
        self.user.clone()
    }

    /// KYC endpoints.
    #[must_use]
    pub fn kyc(&self) -> Arc<KycService> {
        self.kyc.clone()
    }

    /// Document endpoints.
    #[must_use]
    pub fn documents(&self) -> Arc<DocumentService> {
        self.documents.clone()
    }

    /// Onboarding progress controller.
    #[must_use]
    pub fn flow(&self) -> Arc<KycFlow> {
        self.flow.clone()
    }
}
