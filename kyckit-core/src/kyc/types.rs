//! KYC progress records.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::types::Document;

/// Steps of the onboarding flow, in the order they must be completed.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    uniffi::Enum,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum KycStep {
    /// Personal details.
    ProfileSetup,
    /// Identity document upload.
    DocumentUpload,
    /// Selfie face match and NFC chip read.
    IdentityVerification,
    /// SMS code verification.
    PhoneVerification,
    /// Review before submission.
    FinalReview,
    /// Terminal state.
    Completed,
}

impl KycStep {
    /// Every step, in order.
    pub const ALL: [Self; 6] = [
        Self::ProfileSetup,
        Self::DocumentUpload,
        Self::IdentityVerification,
        Self::PhoneVerification,
        Self::FinalReview,
        Self::Completed,
    ];

    /// Step that follows `self`. `Completed` is its own successor.
    #[must_use]
    pub const fn successor(self) -> Self {
        match self {
            Self::ProfileSetup => Self::DocumentUpload,
            Self::DocumentUpload => Self::IdentityVerification,
            Self::IdentityVerification => Self::PhoneVerification,
            Self::PhoneVerification => Self::FinalReview,
            Self::FinalReview | Self::Completed => Self::Completed,
        }
    }
}

/// Phone verification sub-state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, uniffi::Record)]
#[serde(rename_all = "camelCase", default)]
pub struct PhoneVerification {
    /// Number the code was sent to.
    pub phone_number: Option<String>,
    /// Whether the code was confirmed.
    pub is_verified: bool,
    /// Whether a code has been sent.
    pub code_sent: bool,
}

/// Identity verification sub-state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, uniffi::Record)]
#[serde(rename_all = "camelCase", default)]
pub struct IdentityVerification {
    /// Whether the backend accepted the identity.
    pub is_verified: bool,
    /// Selfie to document face match score, 0.0 to 1.0.
    pub face_match_score: Option<f64>,
    /// Whether the document chip was read over NFC.
    pub nfc_verified: bool,
}

/// Risk bucket of an assessment.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, uniffi::Enum,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RiskLevel {
    /// Low risk.
    Low,
    /// Medium risk, may require manual review.
    Medium,
    /// High risk.
    High,
}

/// Risk score computed by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, uniffi::Record)]
#[serde(rename_all = "camelCase")]
pub struct RiskAssessment {
    /// Score, 0 to 100.
    pub score: f64,
    /// Bucket of the score.
    pub level: RiskLevel,
    /// Factors that contributed to the score.
    #[serde(default)]
    pub factors: Vec<String>,
}

/// Local KYC progress record.
///
/// `completed_steps` is kept sorted in step order and without duplicates, and
/// `current_step` always follows the highest completed step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, uniffi::Record)]
#[serde(rename_all = "camelCase")]
pub struct KycProgress {
    /// Step the user is on.
    pub current_step: KycStep,
    /// Steps done so far.
    pub completed_steps: Vec<KycStep>,
    /// Uploaded documents by document type.
    #[serde(default)]
    pub documents: HashMap<String, Document>,
    /// Upload percentage by document type.
    #[serde(default)]
    pub upload_progress: HashMap<String, u8>,
    /// Phone verification sub-state.
    #[serde(default)]
    pub phone_verification: PhoneVerification,
    /// Identity verification sub-state.
    #[serde(default)]
    pub identity_verification: IdentityVerification,
    /// Latest risk assessment.
    #[serde(default)]
    pub risk_assessment: Option<RiskAssessment>,
}

impl Default for KycProgress {
    fn default() -> Self {
        Self {
            current_step: KycStep::ProfileSetup,
            completed_steps: Vec::new(),
            documents: HashMap::new(),
            upload_progress: HashMap::new(),
            phone_verification: PhoneVerification::default(),
            identity_verification: IdentityVerification::default(),
            risk_assessment: None,
        }
    }
}

impl KycProgress {
    /// Returns `true` once `step` has been completed.
    #[must_use]
    pub fn is_completed(&self, step: KycStep) -> bool {
        self.completed_steps.contains(&step)
    }
}

/// KYC status as reported by `GET /api/kyc/status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, uniffi::Record)]
#[serde(rename_all = "camelCase")]
pub struct KycStatus {
    /// Backend status (`not_started`, `pending`, `approved`, `rejected`, ...).
    pub status: String,
    /// Reason given for a rejection or a pending review.
    #[serde(default)]
    pub reason: Option<String>,
    /// Last status change (RFC 3339).
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Result of `POST /api/kyc/verify-phone`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, uniffi::Record)]
#[serde(rename_all = "camelCase")]
pub struct PhoneVerificationResult {
    /// Whether the code matched.
    pub verified: bool,
}

/// Evidence submitted to `POST /api/kyc/verify-identity`.
#[derive(Debug, Clone, Serialize, uniffi::Record)]
#[serde(rename_all = "camelCase")]
pub struct IdentityVerificationRequest {
    /// Base64 encoded selfie.
    pub selfie: String,
    /// Id of the uploaded document to match against.
    pub document_id: String,
    /// Base64 encoded data read from the document chip, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nfc_data: Option<String>,
}

/// Result of `POST /api/kyc/verify-identity`.
#[derive(Debug, Clone, PartialEq, Deserialize, uniffi::Record)]
#[serde(rename_all = "camelCase")]
pub struct IdentityVerificationResult {
    /// Whether the identity was accepted.
    pub is_verified: bool,
    /// Face match score, 0.0 to 1.0.
    #[serde(default)]
    pub face_match_score: Option<f64>,
    /// Whether the NFC chip data validated.
    #[serde(default)]
    pub nfc_verified: bool,
}
