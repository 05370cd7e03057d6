use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD, Engine};
use serde::Serialize;

use crate::api::ApiClient;
use crate::cache::CacheMirror;
use crate::error::KycKitError;
use crate::storage::keys;
use crate::types::Document;

/// A document file to upload.
#[derive(Debug, Clone, uniffi::Record)]
pub struct DocumentUpload {
    /// Document type (`passport`, `drivers_license`, `national_id`, ...).
    pub document_type: String,
    /// File name shown to reviewers.
    pub filename: String,
    /// MIME type of `content`.
    pub mime_type: String,
    /// Raw file bytes.
    pub content: Vec<u8>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UploadBody<'a> {
    #[serde(rename = "type")]
    document_type: &'a str,
    filename: &'a str,
    mime_type: &'a str,
    content: String,
}

/// Document endpoints, mirrored into the `cachedDocuments` entry.
#[derive(Debug, uniffi::Object)]
pub struct DocumentService {
    api: Arc<ApiClient>,
}

#[uniffi::export(async_runtime = "tokio")]
impl DocumentService {
    /// Creates the service over `api`.
    #[uniffi::constructor]
    #[must_use]
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    /// Lists the user's documents. The local mirror is replaced on success and
    /// served when the backend cannot be reached.
    ///
    /// # Errors
    ///
    /// Returns the backend failure when nothing is mirrored.
    pub async fn list(&self) -> Result<Vec<Document>, KycKitError> {
        let api = &self.api;
        self.mirror()
            .read_through(|| async move {
                api.get::<Vec<Document>>("/api/documents")
                    .await
                    .map_err(KycKitError::from)
            })
            .await
    }

    /// Returns the mirrored documents without calling the backend.
    #[must_use]
    pub fn cached(&self) -> Vec<Document> {
        self.mirror().read()
    }

    /// Uploads a document and mirrors the record the backend returns.
    ///
    /// # Errors
    ///
    /// Returns [`KycKitError::InvalidInput`] for an empty file or type, the
    /// backend failure, or a storage error if the record cannot be mirrored.
    pub async fn upload(&self, upload: DocumentUpload) -> Result<Document, KycKitError> {
        validate_upload(&upload)?;

        let body = UploadBody {
            document_type: &upload.document_type,
            filename: &upload.filename,
            mime_type: &upload.mime_type,
            content: STANDARD.encode(&upload.content),
        };
        let document: Document = self.api.post("/api/documents", &body).await?;
        self.mirror().upsert(document.clone())?;
        log::info!(
            "uploaded {} document {}",
            document.document_type,
            document.id
        );
        Ok(document)
    }

    /// Deletes a document and drops it from the mirror.
    ///
    /// # Errors
    ///
    /// Returns [`KycKitError::InvalidInput`] for an id that cannot be used in a
    /// path, the backend failure, or a storage error.
    pub async fn delete(&self, id: String) -> Result<(), KycKitError> {
        let path_safe = id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if id.is_empty() || !path_safe {
            return Err(KycKitError::invalid_input(format!(
                "invalid document id '{id}'"
            )));
        }
        self.api.delete_unit(&format!("/api/documents/{id}")).await?;
        self.mirror().remove(&id)?;
        Ok(())
    }
}

impl DocumentService {
    fn mirror(&self) -> CacheMirror<Document> {
        CacheMirror::new(self.api.sessions().store().clone(), keys::CACHED_DOCUMENTS)
    }
}

/// Rejects uploads the backend would refuse anyway.
pub(crate) fn validate_upload(upload: &DocumentUpload) -> Result<(), KycKitError> {
    if upload.document_type.trim().is_empty() {
        return Err(KycKitError::invalid_input(
            "document type must not be empty".to_string(),
        ));
    }
    if upload.content.is_empty() {
        return Err(KycKitError::invalid_input(format!(
            "{} is empty",
            upload.filename
        )));
    }
    Ok(())
}
