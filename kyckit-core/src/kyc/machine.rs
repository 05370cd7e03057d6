//! Transition function of the KYC progress state machine.

use super::types::{KycProgress, KycStep, RiskAssessment};
use crate::types::Document;

/// Input to [`KycProgress::apply`].
#[derive(Debug, Clone, PartialEq)]
pub enum KycEvent {
    /// A step was finished.
    CompleteStep(KycStep),
    /// Back to the initial state.
    Reset,
    /// A document upload began.
    UploadStarted {
        /// Document type being uploaded.
        document_type: String,
    },
    /// A document upload advanced.
    UploadProgress {
        /// Document type being uploaded.
        document_type: String,
        /// Percentage, clamped to 100.
        percent: u8,
    },
    /// A document upload failed.
    UploadFailed {
        /// Document type whose upload failed.
        document_type: String,
    },
    /// A document upload was acknowledged by the backend.
    DocumentUploaded(Document),
    /// A verification code was sent.
    PhoneCodeSent {
        /// Number the code was sent to.
        phone_number: String,
    },
    /// The verification code was confirmed.
    PhoneVerified,
    /// The backend accepted the identity evidence.
    IdentityVerified {
        /// Face match score, 0.0 to 1.0.
        face_match_score: Option<f64>,
        /// Whether the document chip validated.
        nfc_verified: bool,
    },
    /// The backend computed a risk score.
    RiskAssessed(RiskAssessment),
}

impl KycProgress {
    /// Returns the state after `event`. Pure: no I/O, no observers.
    ///
    /// Completing a step is idempotent and never moves `current_step`
    /// backwards; completing `Completed` is a no-op.
    #[must_use]
    pub fn apply(mut self, event: KycEvent) -> Self {
        match event {
            KycEvent::CompleteStep(KycStep::Completed) => {}
            KycEvent::CompleteStep(step) => {
                if let Err(position) = self.completed_steps.binary_search(&step) {
                    self.completed_steps.insert(position, step);
                }
                self.current_step = self
                    .completed_steps
                    .last()
                    .map_or(KycStep::ProfileSetup, |highest| highest.successor());
            }
            KycEvent::Reset => return Self::default(),
            KycEvent::UploadStarted { document_type }
            | KycEvent::UploadFailed { document_type } => {
                self.upload_progress.insert(document_type, 0);
            }
            KycEvent::UploadProgress {
                document_type,
                percent,
            } => {
                self.upload_progress.insert(document_type, percent.min(100));
            }
            KycEvent::DocumentUploaded(document) => {
                self.upload_progress
                    .insert(document.document_type.clone(), 100);
                self.documents
                    .insert(document.document_type.clone(), document);
            }
            KycEvent::PhoneCodeSent { phone_number } => {
                self.phone_verification.phone_number = Some(phone_number);
                self.phone_verification.code_sent = true;
                self.phone_verification.is_verified = false;
            }
            KycEvent::PhoneVerified => {
                self.phone_verification.is_verified = true;
            }
            KycEvent::IdentityVerified {
                face_match_score,
                nfc_verified,
            } => {
                self.identity_verification.is_verified = true;
                self.identity_verification.face_match_score = face_match_score;
                self.identity_verification.nfc_verified = nfc_verified;
            }
            KycEvent::RiskAssessed(assessment) => {
                self.risk_assessment = Some(assessment);
            }
        }
        self
    }
}
