// Service exports
pub mod places;
pub mod transcribe;
pub mod triage;

pub use places::{GeminiPlacesClient, PlacesError};
pub use transcribe::{SarvamClient, TranscribeError};
pub use triage::{GeminiTriageClient, TriageError};
