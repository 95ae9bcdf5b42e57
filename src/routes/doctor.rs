use crate::core::{AudioPayload, Pipeline, PipelineError, PipelineInput, Transcriber};
use crate::models::{ErrorResponse, FindDoctorRequest, HealthResponse, SpeechToTextResponse};
use actix_multipart::form::{bytes::Bytes, text::Text, MultipartForm};
use actix_web::{web, HttpResponse, Responder};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use std::sync::Arc;
use validator::Validate;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
    pub transcriber: Arc<dyn Transcriber>,
    pub gemini_configured: bool,
    pub sarvam_configured: bool,
}

/// Configure all API routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        .route("/speech-to-text", web::post().to(speech_to_text))
        .route("/find-doctor", web::post().to(find_doctor));
}

/// Serve the frontend page
pub async fn index() -> impl Responder {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(include_str!("../../static/index.html"))
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
        gemini_configured: state.gemini_configured,
        sarvam_configured: state.sarvam_configured,
    })
}

/// Multipart body for the speech-to-text endpoint
#[derive(MultipartForm)]
pub struct SpeechToTextForm {
    pub audio: Bytes,
    #[multipart(rename = "language_hint")]
    pub language_hint: Option<Text<String>>,
}

/// Speech-to-text endpoint
///
/// POST /api/speech-to-text
///
/// Multipart form with an `audio` file part and an optional `language_hint`
/// text part. Returns the recognized text and detected language.
async fn speech_to_text(
    state: web::Data<AppState>,
    form: MultipartForm<SpeechToTextForm>,
) -> impl Responder {
    if form.audio.data.is_empty() {
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "empty_audio".to_string(),
            message: "The audio part contains no data".to_string(),
            status_code: 400,
        });
    }

    let mime_type = form
        .audio
        .content_type
        .as_ref()
        .map(|m| m.to_string())
        .unwrap_or_else(|| "application/octet-stream".to_string());

    let hint = form.language_hint.as_ref().map(|h| h.as_str());

    match state
        .transcriber
        .transcribe(&form.audio.data, &mime_type, hint)
        .await
    {
        Ok(transcription) => HttpResponse::Ok().json(SpeechToTextResponse {
            text: transcription.text,
            language: transcription.language,
        }),
        Err(e) => {
            tracing::error!("Speech to text failed: {}", e);
            HttpResponse::BadGateway().json(ErrorResponse {
                error: "transcription_failed".to_string(),
                message: e.to_string(),
                status_code: 502,
            })
        }
    }
}

/// Find doctor endpoint
///
/// POST /api/find-doctor
///
/// Request body:
/// ```json
/// {
///   "symptoms": "chest pain and breathing difficulty",
///   "location": "Mumbai",
///   "audio": "<base64, instead of symptoms>",
///   "audioMimeType": "audio/wav",
///   "languageHint": "hi-IN"
/// }
/// ```
async fn find_doctor(
    state: web::Data<AppState>,
    req: web::Json<FindDoctorRequest>,
) -> impl Responder {
    // Validate request
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for find_doctor request: {:?}", errors);
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "validation_failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    if let Err(reason) = req.check_symptom_source() {
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "validation_failed".to_string(),
            message: reason.to_string(),
            status_code: 400,
        });
    }

    let audio = match decode_audio(&req) {
        Ok(audio) => audio,
        Err(e) => {
            return HttpResponse::BadRequest().json(ErrorResponse {
                error: "invalid_audio".to_string(),
                message: format!("Audio payload is not valid base64: {}", e),
                status_code: 400,
            });
        }
    };

    let input = PipelineInput {
        symptoms: req.symptoms.clone(),
        location: req.location.clone(),
        audio,
    };

    tracing::info!("Finding doctor for location: {}", input.location);

    match state.pipeline.run(input).await {
        Ok(response) => {
            tracing::info!(
                "Returning {} ({} providers, degraded: {})",
                response.triage.specialty,
                response.providers.len(),
                response.provider_lookup_degraded
            );
            HttpResponse::Ok().json(response)
        }
        Err(e) => {
            tracing::error!("Pipeline failed: {}", e);
            pipeline_error_response(&e)
        }
    }
}

fn decode_audio(req: &FindDoctorRequest) -> Result<Option<AudioPayload>, base64::DecodeError> {
    let Some(encoded) = &req.audio else {
        return Ok(None);
    };

    let bytes = BASE64.decode(encoded)?;
    Ok(Some(AudioPayload {
        bytes,
        mime_type: req
            .audio_mime_type
            .clone()
            .unwrap_or_else(|| "application/octet-stream".to_string()),
        language_hint: req.language_hint.clone(),
    }))
}

/// Map the pipeline taxonomy to a status code and stable error kind
fn pipeline_error_response(e: &PipelineError) -> HttpResponse {
    HttpResponse::BadGateway().json(ErrorResponse {
        error: e.kind().to_string(),
        message: e.to_string(),
        status_code: 502,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_audio_none() {
        let req = FindDoctorRequest {
            symptoms: "fever".to_string(),
            location: "Mumbai".to_string(),
            audio: None,
            audio_mime_type: None,
            language_hint: None,
        };
        assert!(decode_audio(&req).unwrap().is_none());
    }

    #[test]
    fn test_decode_audio_base64() {
        let req = FindDoctorRequest {
            symptoms: String::new(),
            location: "Mumbai".to_string(),
            audio: Some(BASE64.encode(b"RIFF")),
            audio_mime_type: Some("audio/wav".to_string()),
            language_hint: Some("hi-IN".to_string()),
        };
        let audio = decode_audio(&req).unwrap().unwrap();
        assert_eq!(audio.bytes, b"RIFF");
        assert_eq!(audio.mime_type, "audio/wav");
        assert_eq!(audio.language_hint.as_deref(), Some("hi-IN"));
    }

    #[test]
    fn test_decode_audio_invalid() {
        let req = FindDoctorRequest {
            symptoms: String::new(),
            location: "Mumbai".to_string(),
            audio: Some("not base64!!".to_string()),
            audio_mime_type: None,
            language_hint: None,
        };
        assert!(decode_audio(&req).is_err());
    }
}
