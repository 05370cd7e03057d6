use std::sync::Arc;

use serde_json::json;

use crate::api::ApiClient;
use crate::cache::ValueMirror;
use crate::error::KycKitError;
use crate::kyc::{
    IdentityVerificationRequest, IdentityVerificationResult, KycStatus,
    PhoneVerificationResult, RiskAssessment,
};
use crate::storage::keys;

/// KYC endpoints (`/api/kyc/*`).
///
/// These are plain backend calls; progress bookkeeping lives in
/// [`crate::kyc::KycFlow`].
#[derive(Debug, uniffi::Object)]
pub struct KycService {
    api: Arc<ApiClient>,
}

#[uniffi::export(async_runtime = "tokio")]
impl KycService {
    /// Creates the service over `api`.
    #[uniffi::constructor]
    #[must_use]
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    /// Opens a KYC case for the signed-in user.
    ///
    /// # Errors
    ///
    /// Returns the backend failure, or a storage error if the status cannot be mirrored.
    pub async fn start(&self) -> Result<KycStatus, KycKitError> {
        let status: KycStatus = self.api.post("/api/kyc/start", &json!({})).await?;
        self.status_mirror().write(&status)?;
        Ok(status)
    }

    /// Fetches the KYC status, falling back to the last known status when the
    /// backend cannot be reached.
    ///
    /// # Errors
    ///
    /// Returns the backend failure when no status was ever mirrored.
    pub async fn status(&self) -> Result<KycStatus, KycKitError> {
        let api = &self.api;
        self.status_mirror()
            .read_through(|| async move {
                api.get::<KycStatus>("/api/kyc/status")
                    .await
                    .map_err(KycKitError::from)
            })
            .await
    }

    /// Returns the last mirrored status without calling the backend.
    #[must_use]
    pub fn cached_status(&self) -> Option<KycStatus> {
        self.status_mirror().read()
    }

    /// Sends a verification code by SMS.
    ///
    /// # Errors
    ///
    /// Returns the backend failure.
    pub async fn send_phone_code(&self, phone_number: String) -> Result<(), KycKitError> {
        self.api
            .post_unit(
                "/api/kyc/send-phone-code",
                &json!({ "phoneNumber": phone_number }),
            )
            .await?;
        Ok(())
    }

    /// Checks a verification code.
    ///
    /// # Errors
    ///
    /// Returns the backend failure.
    pub async fn verify_phone(
        &self,
        phone_number: String,
        code: String,
    ) -> Result<PhoneVerificationResult, KycKitError> {
        Ok(self
            .api
            .post(
                "/api/kyc/verify-phone",
                &json!({ "phoneNumber": phone_number, "code": code }),
            )
            .await?)
    }

    /// Submits selfie and chip evidence for identity verification.
    ///
    /// # Errors
    ///
    /// Returns the backend failure.
    pub async fn verify_identity(
        &self,
        request: IdentityVerificationRequest,
    ) -> Result<IdentityVerificationResult, KycKitError> {
        Ok(self.api.post("/api/kyc/verify-identity", &request).await?)
    }

    /// Asks the backend to compute the risk score of the case.
    ///
    /// # Errors
    ///
    /// Returns the backend failure.
    pub async fn risk_score(&self) -> Result<RiskAssessment, KycKitError> {
        Ok(self.api.post("/api/kyc/risk-score", &json!({})).await?)
    }
}

impl KycService {
    fn status_mirror(&self) -> ValueMirror<KycStatus> {
        ValueMirror::new(self.api.sessions().store().clone(), keys::KYC_DATA)
    }
}
