use crate::core::pipeline::PlaceFinder;
use crate::models::{GeoPoint, ProviderListing};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during the place search
#[derive(Debug, Error)]
pub enum PlacesError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Places service returned {status}: {detail}")]
    ApiError { status: u16, detail: String },

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Gemini place-finder client using the Google Maps grounding tool
///
/// Asks the model for nearby providers of a given specialty and reads the
/// listings out of the grounding metadata rather than the answer text.
/// Relevance order is preserved as returned; zero grounding chunks is a
/// valid, empty result, not an error.
pub struct GeminiPlacesClient {
    base_url: String,
    api_key: String,
    model: String,
    max_providers: usize,
    client: Client,
}

impl GeminiPlacesClient {
    pub fn new(
        base_url: String,
        api_key: String,
        model: String,
        max_providers: usize,
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
            max_providers,
            client,
        }
    }

    async fn find_providers_inner(
        &self,
        specialty: &str,
        location: &str,
        coordinates: Option<GeoPoint>,
    ) -> Result<Vec<ProviderListing>, PlacesError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        );

        let prompt = format!(
            "Find the best {} doctors or clinics in {}. \
             List top {} options with their name, address, rating, and distance.",
            specialty, location, self.max_providers
        );

        let mut body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "tools": [{ "google_maps": {} }]
        });

        // Anchor the grounding search when triage resolved coordinates
        if let Some(point) = coordinates {
            body["toolConfig"] = json!({
                "retrievalConfig": {
                    "latLng": {
                        "latitude": point.latitude,
                        "longitude": point.longitude
                    }
                }
            });
        }

        tracing::debug!("Searching providers: {} in {}", specialty, location);

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
            return Err(PlacesError::ApiError {
                status: status.as_u16(),
                detail,
            });
        }

        let json: Value = response.json().await?;
        Ok(parse_grounding_chunks(&json, location, self.max_providers))
    }
}

/// Pull provider listings out of the maps grounding metadata
///
/// The address often only appears in the answer text, so listings without
/// one fall back to the searched location. Ratings are left unset when the
/// grounding chunk does not carry one.
pub(crate) fn parse_grounding_chunks(
    json: &Value,
    location: &str,
    limit: usize,
) -> Vec<ProviderListing> {
    let chunks = json
        .get("candidates")
        .and_then(|c| c.as_array())
        .and_then(|c| c.first())
        .and_then(|c| c.get("groundingMetadata"))
        .and_then(|g| g.get("groundingChunks"))
        .and_then(|g| g.as_array());

    let Some(chunks) = chunks else {
        return Vec::new();
    };

    chunks
        .iter()
        .filter_map(|chunk| chunk.get("maps"))
        .map(|maps| ProviderListing {
            name: maps
                .get("title")
                .and_then(|t| t.as_str())
                .unwrap_or("Medical Center")
                .to_string(),
            address: maps
                .get("text")
                .and_then(|t| t.as_str())
                .unwrap_or(location)
                .to_string(),
            rating: maps.get("rating").and_then(|r| r.as_f64()),
            map_url: maps
                .get("uri")
                .and_then(|u| u.as_str())
                .unwrap_or("")
                .to_string(),
            phone: maps
                .get("phoneNumber")
                .and_then(|p| p.as_str())
                .map(str::to_string),
        })
        .take(limit)
        .collect()
}

#[async_trait]
impl PlaceFinder for GeminiPlacesClient {
    async fn find_providers(
        &self,
        specialty: &str,
        location: &str,
        coordinates: Option<GeoPoint>,
    ) -> Result<Vec<ProviderListing>, PlacesError> {
        self.find_providers_inner(specialty, location, coordinates)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn grounded_response(chunks: Value) -> Value {
        json!({
            "candidates": [{
                "content": {"parts": [{"text": "Here are some options."}]},
                "groundingMetadata": {"groundingChunks": chunks}
            }]
        })
    }

    #[test]
    fn test_parse_grounding_chunks_preserves_order() {
        let body = grounded_response(json!([
            {"maps": {"title": "Dr. A", "uri": "https://maps.example/a"}},
            {"maps": {"title": "Dr. B", "uri": "https://maps.example/b", "rating": 4.2}},
        ]));

        let listings = parse_grounding_chunks(&body, "Mumbai", 5);
        assert_eq!(listings.len(), 2);
        assert_eq!(listings[0].name, "Dr. A");
        assert_eq!(listings[0].address, "Mumbai");
        assert_eq!(listings[0].rating, None);
        assert_eq!(listings[1].name, "Dr. B");
        assert_eq!(listings[1].rating, Some(4.2));
    }

    #[test]
    fn test_parse_grounding_chunks_caps_at_limit() {
        let body = grounded_response(json!([
            {"maps": {"title": "1"}},
            {"maps": {"title": "2"}},
            {"maps": {"title": "3"}},
        ]));

        let listings = parse_grounding_chunks(&body, "Mumbai", 2);
        assert_eq!(listings.len(), 2);
        assert_eq!(listings[1].name, "2");
    }

    #[test]
    fn test_parse_grounding_chunks_skips_non_maps_chunks() {
        let body = grounded_response(json!([
            {"web": {"uri": "https://example.com"}},
            {"maps": {"title": "Dr. C"}},
        ]));

        let listings = parse_grounding_chunks(&body, "Mumbai", 5);
        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].name, "Dr. C");
    }

    #[test]
    fn test_missing_grounding_is_empty() {
        let body = json!({
            "candidates": [{"content": {"parts": [{"text": "no grounding here"}]}}]
        });
        assert!(parse_grounding_chunks(&body, "Mumbai", 5).is_empty());
    }
}
