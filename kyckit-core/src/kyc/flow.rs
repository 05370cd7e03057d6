use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use super::machine::KycEvent;
use super::types::{
    IdentityVerificationRequest, IdentityVerificationResult, KycProgress, KycStep,
    RiskAssessment,
};
use crate::api::ApiError;
use crate::error::KycKitError;
use crate::services::{validate_upload, DocumentService, DocumentUpload, KycService};
use crate::session::SessionStore;
use crate::storage::keys;
use crate::types::Document;

/// Receives every KYC progress change. Implemented by the host to drive its UI.
///
/// Callbacks run synchronously on the thread that caused the change and must
/// not call back into the [`KycFlow`] that notified them.
#[uniffi::export(with_foreign)]
pub trait KycObserver: Send + Sync {
    /// Called after a transition has been committed.
    fn on_progress_changed(&self, progress: KycProgress);

    /// Called after a failed operation was recorded as the current error.
    fn on_error(&self, message: String);
}

#[derive(Default)]
struct FlowState {
    progress: KycProgress,
    last_error: Option<String>,
}

/// Drives the onboarding flow.
///
/// Holds the current [`KycProgress`] and the last error. Transitions
/// acknowledged by the backend are persisted before they become visible;
/// upload percentages stay in memory. Failed backend calls leave the
/// progress unchanged.
#[derive(uniffi::Object)]
pub struct KycFlow {
    sessions: Arc<SessionStore>,
    kyc: Arc<KycService>,
    documents: Arc<DocumentService>,
    state: Mutex<FlowState>,
    observers: RwLock<Vec<Arc<dyn KycObserver>>>,
}

impl fmt::Debug for KycFlow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KycFlow")
            .field("progress", &self.progress())
            .field("last_error", &self.last_error())
            .finish_non_exhaustive()
    }
}

#[uniffi::export(async_runtime = "tokio")]
impl KycFlow {
    /// Creates the controller, resuming any progress persisted in `sessions`.
    #[uniffi::constructor]
    #[must_use]
    pub fn new(
        sessions: Arc<SessionStore>,
        kyc: Arc<KycService>,
        documents: Arc<DocumentService>,
    ) -> Self {
        let progress = sessions.kyc_progress().unwrap_or_default();
        Self {
            sessions,
            kyc,
            documents,
            state: Mutex::new(FlowState {
                progress,
                last_error: None,
            }),
            observers: RwLock::new(Vec::new()),
        }
    }

    /// Returns a snapshot of the current progress.
    #[must_use]
    pub fn progress(&self) -> KycProgress {
        self.lock()
            .map(|state| state.progress.clone())
            .unwrap_or_default()
    }

    /// Returns the message of the last failed operation, if not cleared.
    #[must_use]
    pub fn last_error(&self) -> Option<String> {
        self.lock().ok().and_then(|state| state.last_error.clone())
    }

    /// Forgets the last error.
    pub fn clear_error(&self) {
        if let Ok(mut state) = self.lock() {
            state.last_error = None;
        }
    }

    /// Registers `observer` for every subsequent change.
    pub fn add_observer(&self, observer: Arc<dyn KycObserver>) {
        match self.observers.write() {
            Ok(mut observers) => observers.push(observer),
            Err(_) => log::error!("observer list poisoned, observer dropped"),
        }
    }

    /// Reloads the persisted progress, replacing the in-memory one.
    ///
    /// # Errors
    ///
    /// Returns [`KycKitError::State`] if the state lock is poisoned.
    pub fn restore(&self) -> Result<KycProgress, KycKitError> {
        let progress = self.sessions.kyc_progress().unwrap_or_default();
        self.lock()?.progress = progress.clone();
        self.notify(&progress);
        Ok(progress)
    }

    /// Marks `step` as finished and advances the current step.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the progress cannot be persisted.
    pub fn complete_step(&self, step: KycStep) -> Result<KycProgress, KycKitError> {
        self.commit([KycEvent::CompleteStep(step)])
    }

    /// Discards all progress.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the progress cannot be persisted.
    pub fn reset(&self) -> Result<KycProgress, KycKitError> {
        self.commit([KycEvent::Reset])
    }

    /// Records the percentage of an upload in flight.
    ///
    /// # Errors
    ///
    /// Returns [`KycKitError::State`] if the state lock is poisoned.
    pub fn report_upload_progress(
        &self,
        document_type: String,
        percent: u8,
    ) -> Result<KycProgress, KycKitError> {
        self.update(KycEvent::UploadProgress {
            document_type,
            percent,
        })
    }

    /// Uploads a document and records it against its type.
    ///
    /// # Errors
    ///
    /// Returns the upload failure after resetting the type's progress to 0.
    pub async fn upload_document(&self, upload: DocumentUpload) -> Result<Document, KycKitError> {
        validate_upload(&upload).map_err(|err| self.fail(err))?;
        let document_type = upload.document_type.clone();
        self.update(KycEvent::UploadStarted {
            document_type: document_type.clone(),
        })?;

        match self.documents.upload(upload).await {
            Ok(document) => {
                self.record_uploaded(&document)
                    .map_err(|err| self.fail(err))?;
                self.commit([KycEvent::DocumentUploaded(document.clone())])?;
                Ok(document)
            }
            Err(err) => {
                self.update(KycEvent::UploadFailed { document_type })?;
                Err(self.fail(err))
            }
        }
    }

    /// Submits identity evidence and, once accepted, completes the identity
    /// verification step.
    ///
    /// # Errors
    ///
    /// Returns the backend failure, or a validation error if the evidence was
    /// rejected.
    pub async fn verify_identity(
        &self,
        request: IdentityVerificationRequest,
    ) -> Result<IdentityVerificationResult, KycKitError> {
        let result = self
            .kyc
            .verify_identity(request)
            .await
            .map_err(|err| self.fail(err))?;
        if !result.is_verified {
            return Err(self.fail(
                ApiError::Validation {
                    message: "identity could not be verified".to_string(),
                }
                .into(),
            ));
        }

        self.commit([
            KycEvent::IdentityVerified {
                face_match_score: result.face_match_score,
                nfc_verified: result.nfc_verified,
            },
            KycEvent::CompleteStep(KycStep::IdentityVerification),
        ])?;
        Ok(result)
    }

    /// Sends a verification code to `phone_number` and remembers the number.
    ///
    /// # Errors
    ///
    /// Returns the backend failure.
    pub async fn send_phone_code(&self, phone_number: String) -> Result<(), KycKitError> {
        self.kyc
            .send_phone_code(phone_number.clone())
            .await
            .map_err(|err| self.fail(err))?;
        self.commit([KycEvent::PhoneCodeSent { phone_number }])?;
        Ok(())
    }

    /// Confirms the code sent by [`Self::send_phone_code`] and completes the
    /// phone verification step.
    ///
    /// # Errors
    ///
    /// Returns [`KycKitError::InvalidInput`] if no code was sent, the backend
    /// failure, or a validation error if the code was wrong.
    pub async fn verify_phone(&self, code: String) -> Result<KycProgress, KycKitError> {
        if code.trim().is_empty() {
            return Err(self.fail(KycKitError::invalid_input(
                "verification code must not be empty".to_string(),
            )));
        }
        let Some(phone_number) = self.progress().phone_verification.phone_number else {
            return Err(self.fail(KycKitError::invalid_input(
                "a code must be sent before verifying".to_string(),
            )));
        };

        let result = self
            .kyc
            .verify_phone(phone_number, code)
            .await
            .map_err(|err| self.fail(err))?;
        if !result.verified {
            return Err(self.fail(
                ApiError::Validation {
                    message: "invalid verification code".to_string(),
                }
                .into(),
            ));
        }

        self.commit([
            KycEvent::PhoneVerified,
            KycEvent::CompleteStep(KycStep::PhoneVerification),
        ])
    }

    /// Asks the backend for the risk score of the case and records it.
    ///
    /// # Errors
    ///
    /// Returns the backend failure.
    pub async fn calculate_risk_score(&self) -> Result<RiskAssessment, KycKitError> {
        let assessment = self
            .kyc
            .risk_score()
            .await
            .map_err(|err| self.fail(err))?;
        self.commit([KycEvent::RiskAssessed(assessment.clone())])?;
        Ok(assessment)
    }
}

impl KycFlow {
    fn lock(&self) -> Result<MutexGuard<'_, FlowState>, KycKitError> {
        self.state
            .lock()
            .map_err(|_| KycKitError::State {
                message: "kyc state lock poisoned".to_string(),
            })
    }

    /// Applies `events`, persists the result and only then commits it.
    fn commit<I>(&self, events: I) -> Result<KycProgress, KycKitError>
    where
        I: IntoIterator<Item = KycEvent>,
    {
        let next = {
            let mut state = self.lock()?;
            let next = events
                .into_iter()
                .fold(state.progress.clone(), KycProgress::apply);
            if let Err(err) = self.sessions.save_kyc_progress(next.clone()) {
                let err = KycKitError::from(err);
                state.last_error = Some(err.to_string());
                drop(state);
                self.notify_error(&err);
                return Err(err);
            }
            state.progress = next.clone();
            next
        };
        self.notify(&next);
        Ok(next)
    }

    /// Applies `event` in memory only.
    fn update(&self, event: KycEvent) -> Result<KycProgress, KycKitError> {
        let next = {
            let mut state = self.lock()?;
            let next = state.progress.clone().apply(event);
            state.progress = next.clone();
            next
        };
        self.notify(&next);
        Ok(next)
    }

    /// Records `err` as the current error and hands it back.
    fn fail(&self, err: KycKitError) -> KycKitError {
        log::warn!("kyc operation failed: {err}");
        if let Ok(mut state) = self.lock() {
            state.last_error = Some(err.to_string());
        }
        self.notify_error(&err);
        err
    }

    fn record_uploaded(&self, document: &Document) -> Result<(), KycKitError> {
        let store = self.sessions.store();
        let mut uploaded: HashMap<String, Document> =
            store.get(keys::UPLOADED_DOCUMENTS).unwrap_or_default();
        uploaded.insert(document.document_type.clone(), document.clone());
        store.set(keys::UPLOADED_DOCUMENTS, &uploaded)?;
        Ok(())
    }

    fn observers(&self) -> Vec<Arc<dyn KycObserver>> {
        self.observers
            .read()
            .map(|observers| observers.clone())
            .unwrap_or_default()
    }

    fn notify(&self, progress: &KycProgress) {
        for observer in self.observers() {
            observer.on_progress_changed(progress.clone());
        }
    }

    fn notify_error(&self, err: &KycKitError) {
        let message = err.to_string();
        for observer in self.observers() {
            observer.on_error(message.clone());
        }
    }
}
