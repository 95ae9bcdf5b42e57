use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request to analyze symptoms and find doctors
///
/// Symptoms arrive either as text or as a base64 audio clip, never both;
/// when audio is present the transcription step resolves the text.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct FindDoctorRequest {
    #[serde(default)]
    pub symptoms: String,
    #[validate(length(min = 1, message = "location is required"))]
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio: Option<String>,
    #[serde(
        alias = "audio_mime_type",
        rename = "audioMimeType",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub audio_mime_type: Option<String>,
    #[serde(
        alias = "language_hint",
        rename = "languageHint",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub language_hint: Option<String>,
}

impl FindDoctorRequest {
    /// Exactly one symptom source must be present: text or audio
    pub fn check_symptom_source(&self) -> Result<(), &'static str> {
        let has_text = !self.symptoms.trim().is_empty();
        match (&self.audio, has_text) {
            (None, false) => Err("Either symptoms text or an audio payload is required"),
            (Some(_), true) => Err("Symptoms text and audio are mutually exclusive"),
            _ => Ok(()),
        }
    }
}
