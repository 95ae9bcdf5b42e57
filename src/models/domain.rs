use serde::{Deserialize, Serialize};

/// How quickly the user should seek care, as judged by the triage model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Low,
    Medium,
    High,
}

impl Urgency {
    /// Parse a free-text urgency mention from the model output.
    /// Anything unrecognized is treated as medium.
    pub fn from_model_text(text: &str) -> Self {
        let lower = text.to_lowercase();
        if lower.contains("high") || lower.contains("emergen") || lower.contains("urgent") {
            Urgency::High
        } else if lower.contains("low") {
            Urgency::Low
        } else {
            Urgency::Medium
        }
    }
}

/// Geographic coordinates used to anchor the place search
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// Structured triage recommendation produced once per request
///
/// Immutable after the triage step; the resolved symptom/location fields
/// carry what the extraction pass actually understood from the user input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriageResult {
    pub specialty: String,
    pub rationale: String,
    pub urgency: Urgency,
    #[serde(rename = "resolvedSymptoms")]
    pub resolved_symptoms: String,
    #[serde(rename = "resolvedLocation")]
    pub resolved_location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<GeoPoint>,
}

/// A single provider returned by the place search, in upstream relevance order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderListing {
    pub name: String,
    pub address: String,
    pub rating: Option<f64>,
    #[serde(rename = "mapUrl")]
    pub map_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Recognized speech plus the detected language code
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transcription {
    pub text: String,
    pub language: String,
}
