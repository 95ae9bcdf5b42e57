use crate::models::domain::{ProviderListing, TriageResult};
use serde::{Deserialize, Serialize};

/// Response for the find-doctor endpoint
///
/// Only built once triage has succeeded. `provider_lookup_degraded` is set
/// when the place search failed and the listing sequence was emptied rather
/// than failing the whole request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FindDoctorResponse {
    pub triage: TriageResult,
    pub providers: Vec<ProviderListing>,
    #[serde(rename = "providerLookupDegraded")]
    pub provider_lookup_degraded: bool,
}

/// Response for the speech-to-text endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeechToTextResponse {
    pub text: String,
    pub language: String,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub gemini_configured: bool,
    pub sarvam_configured: bool,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
