//! AayuCare - symptom triage and doctor finder service
//!
//! A thin orchestration layer over three external AI services: speech-to-text
//! (Sarvam), symptom triage (Gemini) and map-grounded place search (Gemini
//! with the Google Maps tool). The pipeline in `core` sequences the calls and
//! owns the degrade-not-fail policy for the provider lookup.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{
    AudioPayload, Pipeline, PipelineError, PipelineInput, PlaceFinder, SymptomTriage, Transcriber,
};
pub use models::{
    FindDoctorRequest, FindDoctorResponse, GeoPoint, ProviderListing, Transcription, TriageResult,
    Urgency,
};
