use crate::models::{FindDoctorResponse, GeoPoint, ProviderListing, Transcription, TriageResult};
use crate::services::{PlacesError, TranscribeError, TriageError};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Speech-to-text seam
#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(
        &self,
        audio: &[u8],
        mime_type: &str,
        language_hint: Option<&str>,
    ) -> Result<Transcription, TranscribeError>;
}

/// Symptom triage seam
#[async_trait]
pub trait SymptomTriage: Send + Sync {
    async fn triage(&self, symptoms: &str, location: &str) -> Result<TriageResult, TriageError>;
}

/// Place search seam
#[async_trait]
pub trait PlaceFinder: Send + Sync {
    async fn find_providers(
        &self,
        specialty: &str,
        location: &str,
        coordinates: Option<GeoPoint>,
    ) -> Result<Vec<ProviderListing>, PlacesError>;
}

/// Typed failures the pipeline can surface to the HTTP layer
///
/// A provider-lookup failure only appears here when the degrade policy is
/// disabled; with the default policy it is absorbed into a degraded response.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Speech transcription failed: {0}")]
    TranscriptionFailed(#[from] TranscribeError),

    #[error("Symptom triage failed: {0}")]
    TriageFailed(#[from] TriageError),

    #[error("Provider lookup failed: {0}")]
    ProviderLookupFailed(#[from] PlacesError),
}

impl PipelineError {
    /// Stable machine-readable error kind for the JSON error body
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::TranscriptionFailed(_) => "transcription_failed",
            PipelineError::TriageFailed(_) => "triage_failed",
            PipelineError::ProviderLookupFailed(_) => "provider_lookup_failed",
        }
    }
}

/// Audio attachment resolved from the request body
#[derive(Debug, Clone)]
pub struct AudioPayload {
    pub bytes: Vec<u8>,
    pub mime_type: String,
    pub language_hint: Option<String>,
}

/// Everything the pipeline needs for one invocation; owned exclusively by it
#[derive(Debug, Clone)]
pub struct PipelineInput {
    pub symptoms: String,
    pub location: String,
    pub audio: Option<AudioPayload>,
}

/// Symptom-to-recommendation orchestration pipeline
///
/// Sequences transcription, triage and place search strictly in that order;
/// each step's output feeds the next, so there is nothing to run in
/// parallel. Transcription and triage failures abort the request; a place
/// search failure degrades it instead (configurable), because triage is the
/// primary value and the listing is best-effort.
pub struct Pipeline {
    transcriber: Arc<dyn Transcriber>,
    triage: Arc<dyn SymptomTriage>,
    places: Arc<dyn PlaceFinder>,
    degrade_on_provider_failure: bool,
}

impl Pipeline {
    pub fn new(
        transcriber: Arc<dyn Transcriber>,
        triage: Arc<dyn SymptomTriage>,
        places: Arc<dyn PlaceFinder>,
        degrade_on_provider_failure: bool,
    ) -> Self {
        Self {
            transcriber,
            triage,
            places,
            degrade_on_provider_failure,
        }
    }

    pub async fn run(&self, input: PipelineInput) -> Result<FindDoctorResponse, PipelineError> {
        // Step 1: resolve spoken symptoms to text when audio was supplied
        let symptoms = match &input.audio {
            Some(audio) => {
                let transcription = self
                    .transcriber
                    .transcribe(
                        &audio.bytes,
                        &audio.mime_type,
                        audio.language_hint.as_deref(),
                    )
                    .await?;
                tracing::info!(
                    "Transcribed audio to {} chars ({})",
                    transcription.text.len(),
                    transcription.language
                );
                transcription.text
            }
            None => input.symptoms,
        };

        // Step 2: triage is authoritative; its failure fails the request
        let triage = self.triage.triage(&symptoms, &input.location).await?;

        tracing::info!(
            "Triage suggests {} ({:?}) in {}",
            triage.specialty,
            triage.urgency,
            triage.resolved_location
        );

        // Step 3: best-effort place search against the resolved location
        let lookup = self
            .places
            .find_providers(&triage.specialty, &triage.resolved_location, triage.coordinates)
            .await;

        match lookup {
            Ok(providers) => Ok(FindDoctorResponse {
                triage,
                providers,
                provider_lookup_degraded: false,
            }),
            Err(e) if self.degrade_on_provider_failure => {
                tracing::warn!("Provider lookup failed, degrading response: {}", e);
                Ok(FindDoctorResponse {
                    triage,
                    providers: Vec::new(),
                    provider_lookup_degraded: true,
                })
            }
            Err(e) => Err(e.into()),
        }
    }
}
