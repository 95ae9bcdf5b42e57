use crate::core::pipeline::Transcriber;
use crate::models::Transcription;
use async_trait::async_trait;
use reqwest::multipart;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when talking to the speech service
#[derive(Debug, Error)]
pub enum TranscribeError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Speech service returned {status}: {detail}")]
    ApiError { status: u16, detail: String },

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Sarvam AI speech-to-text client
///
/// Sends recorded audio to the speech-to-text-translate endpoint and maps
/// the transcript plus detected language into the local model. Stateless;
/// retry policy, if any, belongs to the caller.
pub struct SarvamClient {
    base_url: String,
    api_key: String,
    model: String,
    prompt: String,
    client: Client,
}

impl SarvamClient {
    pub fn new(
        base_url: String,
        api_key: String,
        model: String,
        prompt: String,
        timeout_secs: u64,
    ) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url,
            api_key,
            model,
            prompt,
            client,
        }
    }

    async fn transcribe_inner(
        &self,
        audio: &[u8],
        mime_type: &str,
        language_hint: Option<&str>,
    ) -> Result<Transcription, TranscribeError> {
        let url = format!(
            "{}/speech-to-text-translate",
            self.base_url.trim_end_matches('/')
        );

        let file_part = multipart::Part::bytes(audio.to_vec())
            .file_name("audio")
            .mime_str(mime_type)?;

        let mut form = multipart::Form::new()
            .part("file", file_part)
            .text("model", self.model.clone())
            .text("prompt", self.prompt.clone());

        if let Some(hint) = language_hint {
            form = form.text("language_code", hint.to_string());
        }

        tracing::debug!("Transcribing {} bytes of {} audio", audio.len(), mime_type);

        let response = self
            .client
            .post(&url)
            .header("api-subscription-key", &self.api_key)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read body".to_string());
            return Err(TranscribeError::ApiError {
                status: status.as_u16(),
                detail,
            });
        }

        let json: Value = response.json().await?;
        parse_transcript(&json)
    }
}

/// Map the Sarvam response body into the local model
pub(crate) fn parse_transcript(json: &Value) -> Result<Transcription, TranscribeError> {
    let text = json
        .get("transcript")
        .and_then(|t| t.as_str())
        .ok_or_else(|| TranscribeError::InvalidResponse("Missing transcript field".into()))?;

    let language = json
        .get("language_code")
        .and_then(|l| l.as_str())
        .unwrap_or("en");

    Ok(Transcription {
        text: text.to_string(),
        language: language.to_string(),
    })
}

#[async_trait]
impl Transcriber for SarvamClient {
    async fn transcribe(
        &self,
        audio: &[u8],
        mime_type: &str,
        language_hint: Option<&str>,
    ) -> Result<Transcription, TranscribeError> {
        self.transcribe_inner(audio, mime_type, language_hint).await
    }
}
