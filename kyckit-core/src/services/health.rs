use crate::api::ApiClient;
use crate::error::KycKitError;
use crate::types::HealthStatus;

#[uniffi::export(async_runtime = "tokio")]
impl ApiClient {
    /// Calls `GET /health`.
    ///
    /// # Errors
    ///
    /// Returns the backend failure.
    pub async fn health(&self) -> Result<HealthStatus, KycKitError> {
        Ok(self.get("/health").await?)
    }
}
