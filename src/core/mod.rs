// Core orchestration exports
pub mod pipeline;

pub use pipeline::{
    AudioPayload, Pipeline, PipelineError, PipelineInput, PlaceFinder, SymptomTriage, Transcriber,
};
