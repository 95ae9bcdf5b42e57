use crate::core::pipeline::SymptomTriage;
use crate::models::{GeoPoint, TriageResult, Urgency};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when talking to the triage model
#[derive(Debug, Error)]
pub enum TriageError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Language model returned {status}: {detail}")]
    ApiError { status: u16, detail: String },

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Gemini-backed symptom triage client
///
/// Runs two sequential model calls per request: an extraction pass that
/// normalizes the symptom phrase and geocodes the location, then a
/// recommendation pass that maps symptoms to a specialty, a rationale and
/// an urgency level. The single upstream answer is treated as authoritative;
/// no retries.
pub struct GeminiTriageClient {
    base_url: String,
    api_key: String,
    model: String,
    default_location: String,
    default_coordinates: GeoPoint,
    client: Client,
}

impl GeminiTriageClient {
    pub fn new(
        base_url: String,
        api_key: String,
        model: String,
        default_location: String,
        default_coordinates: GeoPoint,
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
            default_location,
            default_coordinates,
            client,
        }
    }

    /// Single generateContent call, returning the first candidate's text
    async fn generate(&self, prompt: &str) -> Result<String, TriageError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        );

        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }]
        });

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read body".to_string());
            return Err(TriageError::ApiError {
                status: status.as_u16(),
                detail,
            });
        }

        let json: Value = response.json().await?;
        candidate_text(&json)
            .map(str::to_string)
            .ok_or_else(|| TriageError::InvalidResponse("Missing candidate text".into()))
    }

    async fn triage_inner(
        &self,
        symptoms: &str,
        location: &str,
    ) -> Result<TriageResult, TriageError> {
        let extraction_prompt = format!(
            "Extract the symptoms and location from the following user input.\n\n\
             Symptoms: {symptoms}\n\
             Location: {location}\n\n\
             Provide the response in this exact format:\n\
             SYMPTOMS: [extracted symptoms]\n\
             LOCATION: [city name, or \"{default}\" if not mentioned]\n\
             LATITUDE: [latitude of the location]\n\
             LONGITUDE: [longitude of the location]",
            symptoms = symptoms,
            location = location,
            default = self.default_location,
        );

        let extraction_text = self.generate(&extraction_prompt).await?;
        let extraction = parse_extraction(
            &extraction_text,
            &self.default_location,
            self.default_coordinates,
        );

        tracing::debug!(
            "Extracted symptoms '{}' at '{}'",
            extraction.symptoms,
            extraction.location
        );

        let recommendation_prompt = format!(
            "You are a helpful healthcare assistant for rural areas.\n\n\
             User Symptoms: {symptoms}\n\
             User Location: {location}\n\n\
             Please provide:\n\
             1. What type of doctor they should see (e.g., General Physician, Cardiologist, Dermatologist)\n\
             2. A brief, simple explanation (1-2 sentences)\n\
             3. How urgent it is (low, medium, or high)\n\
             4. What to tell the doctor when they visit\n\n\
             Keep it simple and in plain language. Don't give medical advice, just help them find the right doctor type.\n\n\
             Format your response as:\n\
             Doctor Type: [type]\n\
             Urgency: [low/medium/high]\n\
             Reason: [simple explanation]\n\
             What to mention: [key symptoms to tell doctor]",
            symptoms = extraction.symptoms,
            location = extraction.location,
        );

        let recommendation_text = self.generate(&recommendation_prompt).await?;

        Ok(build_triage_result(&recommendation_text, extraction))
    }
}

/// Extract the first candidate's text from a generateContent response
pub(crate) fn candidate_text(json: &Value) -> Option<&str> {
    json.get("candidates")?
        .as_array()?
        .first()?
        .get("content")?
        .get("parts")?
        .as_array()?
        .first()?
        .get("text")?
        .as_str()
}

/// Output of the extraction pass
#[derive(Debug, Clone)]
pub(crate) struct Extraction {
    pub symptoms: String,
    pub location: String,
    pub coordinates: Option<GeoPoint>,
}

/// Parse the line-oriented extraction output, falling back to the
/// configured defaults when the model omits a field
pub(crate) fn parse_extraction(
    text: &str,
    default_location: &str,
    default_coordinates: GeoPoint,
) -> Extraction {
    let mut symptoms = "General symptoms".to_string();
    let mut location = default_location.to_string();
    let mut latitude = default_coordinates.latitude;
    let mut longitude = default_coordinates.longitude;

    for line in text.lines() {
        let line = line.trim();
        if let Some(value) = line.strip_prefix("SYMPTOMS:") {
            symptoms = value.trim().to_string();
        } else if let Some(value) = line.strip_prefix("LOCATION:") {
            location = value.trim().trim_matches('"').to_string();
        } else if let Some(value) = line.strip_prefix("LATITUDE:") {
            if let Ok(parsed) = value.trim().parse::<f64>() {
                latitude = parsed;
            }
        } else if let Some(value) = line.strip_prefix("LONGITUDE:") {
            if let Ok(parsed) = value.trim().parse::<f64>() {
                longitude = parsed;
            }
        }
    }

    Extraction {
        symptoms,
        location,
        coordinates: Some(GeoPoint {
            latitude,
            longitude,
        }),
    }
}

/// Normalize the model's free text into a canonical specialty label
pub(crate) fn canonical_specialty(text: &str) -> String {
    let lower = text.to_lowercase();

    let label = if lower.contains("cardiologist") {
        "Cardiologist"
    } else if lower.contains("pulmonologist") {
        "Pulmonologist"
    } else if lower.contains("dermatologist") {
        "Dermatologist"
    } else if lower.contains("orthopedic") {
        "Orthopedic"
    } else if lower.contains("neurologist") {
        "Neurologist"
    } else if lower.contains("gastroenterologist") {
        "Gastroenterologist"
    } else if lower.contains("ent") || lower.contains("ear") {
        "ENT Specialist"
    } else if lower.contains("pediatrician") {
        "Pediatrician"
    } else {
        "General Physician"
    };

    label.to_string()
}

pub(crate) fn build_triage_result(recommendation: &str, extraction: Extraction) -> TriageResult {
    let urgency = recommendation
        .lines()
        .find_map(|line| line.trim().strip_prefix("Urgency:"))
        .map(Urgency::from_model_text)
        .unwrap_or(Urgency::Medium);

    // Prefer the explicit Doctor Type line, fall back to scanning the whole answer
    let specialty = recommendation
        .lines()
        .find_map(|line| line.trim().strip_prefix("Doctor Type:"))
        .map(canonical_specialty)
        .unwrap_or_else(|| canonical_specialty(recommendation));

    TriageResult {
        specialty,
        rationale: recommendation.trim().to_string(),
        urgency,
        resolved_symptoms: extraction.symptoms,
        resolved_location: extraction.location,
        coordinates: extraction.coordinates,
    }
}

#[async_trait]
impl SymptomTriage for GeminiTriageClient {
    async fn triage(&self, symptoms: &str, location: &str) -> Result<TriageResult, TriageError> {
        self.triage_inner(symptoms, location).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const DEFAULT_COORDS: GeoPoint = GeoPoint {
        latitude: 19.0760,
        longitude: 72.8777,
    };

    #[test]
    fn test_candidate_text_extraction() {
        let body = json!({
            "candidates": [{"content": {"parts": [{"text": "hello"}]}}]
        });
        assert_eq!(candidate_text(&body), Some("hello"));
        assert_eq!(candidate_text(&json!({"candidates": []})), None);
    }

    #[test]
    fn test_parse_extraction_full() {
        let text = "SYMPTOMS: chest pain and breathing difficulty\n\
                    LOCATION: Mumbai\n\
                    LATITUDE: 19.0760\n\
                    LONGITUDE: 72.8777";
        let extraction = parse_extraction(text, "Mumbai", DEFAULT_COORDS);
        assert_eq!(extraction.symptoms, "chest pain and breathing difficulty");
        assert_eq!(extraction.location, "Mumbai");
        let coords = extraction.coordinates.unwrap();
        assert!((coords.latitude - 19.0760).abs() < 1e-9);
    }

    #[test]
    fn test_parse_extraction_falls_back_to_defaults() {
        let extraction = parse_extraction("no structure at all", "Mumbai", DEFAULT_COORDS);
        assert_eq!(extraction.symptoms, "General symptoms");
        assert_eq!(extraction.location, "Mumbai");
        let coords = extraction.coordinates.unwrap();
        assert!((coords.longitude - 72.8777).abs() < 1e-9);
    }

    #[test]
    fn test_parse_extraction_ignores_bad_coordinates() {
        let text = "LATITUDE: not-a-number\nLONGITUDE: 73.0";
        let extraction = parse_extraction(text, "Mumbai", DEFAULT_COORDS);
        let coords = extraction.coordinates.unwrap();
        assert!((coords.latitude - 19.0760).abs() < 1e-9);
        assert!((coords.longitude - 73.0).abs() < 1e-9);
    }

    #[test]
    fn test_canonical_specialty() {
        assert_eq!(canonical_specialty("see a Cardiologist soon"), "Cardiologist");
        assert_eq!(canonical_specialty("a pulmonologist can help"), "Pulmonologist");
        assert_eq!(canonical_specialty("ear trouble"), "ENT Specialist");
        assert_eq!(canonical_specialty("nothing specific"), "General Physician");
    }

    #[test]
    fn test_build_triage_result() {
        let recommendation = "Doctor Type: Pulmonologist\n\
                              Urgency: high\n\
                              Reason: Breathing difficulty needs a lung specialist.\n\
                              What to mention: chest pain, shortness of breath";
        let extraction = Extraction {
            symptoms: "chest pain and breathing difficulty".to_string(),
            location: "Mumbai".to_string(),
            coordinates: Some(DEFAULT_COORDS),
        };

        let result = build_triage_result(recommendation, extraction);
        assert_eq!(result.specialty, "Pulmonologist");
        assert_eq!(result.urgency, Urgency::High);
        assert!(result.rationale.contains("lung specialist"));
        assert_eq!(result.resolved_location, "Mumbai");
    }

    #[test]
    fn test_build_triage_result_defaults() {
        let extraction = Extraction {
            symptoms: "fever".to_string(),
            location: "Pune".to_string(),
            coordinates: None,
        };
        let result = build_triage_result("Rest and see a doctor.", extraction);
        assert_eq!(result.specialty, "General Physician");
        assert_eq!(result.urgency, Urgency::Medium);
    }
}
