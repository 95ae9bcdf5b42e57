// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{GeoPoint, ProviderListing, Transcription, TriageResult, Urgency};
pub use requests::FindDoctorRequest;
pub use responses::{ErrorResponse, FindDoctorResponse, HealthResponse, SpeechToTextResponse};
