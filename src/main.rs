mod config;
mod core;
mod models;
mod routes;
mod services;

use actix_cors::Cors;
use actix_web::{error, http::StatusCode, middleware, web, App, HttpResponse, HttpServer};
use config::Settings;
use models::GeoPoint;
use routes::doctor::AppState;
use services::{GeminiPlacesClient, GeminiTriageClient, SarvamClient};
use std::sync::Arc;
use tracing::{error, info};

/// JSON error response for JSON payload errors
#[derive(Debug, serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

impl std::fmt::Display for JsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl std::error::Error for JsonError {}

impl error::ResponseError for JsonError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::BAD_REQUEST))
            .content_type("application/json")
            .body(serde_json::to_string(self).unwrap())
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &actix_web::HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    JsonError {
        error: "invalid_json".to_string(),
        message: format!("Invalid JSON: {}", err),
        status_code: 400,
    }
    .into()
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    // Initialize logging
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "json".to_string());

    let subscriber = tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true);

    if log_format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.init();
    }

    info!("Starting AayuCare API...");

    // Load configuration; missing credentials are fatal here, never per request
    let settings = Settings::load().unwrap_or_else(|e| {
        error!("Failed to load configuration: {}", e);
        panic!("Configuration error: {}", e);
    });

    info!("Configuration loaded successfully");

    let default_coordinates = GeoPoint {
        latitude: settings.pipeline.default_latitude,
        longitude: settings.pipeline.default_longitude,
    };

    // Initialize the three upstream clients
    let transcriber = Arc::new(SarvamClient::new(
        settings.sarvam.base_url,
        settings.sarvam.api_key.clone(),
        settings.sarvam.model,
        settings.sarvam.stt_prompt,
        settings.sarvam.timeout_secs,
    ));

    info!("Sarvam speech client initialized");

    let triage = Arc::new(GeminiTriageClient::new(
        settings.gemini.base_url.clone(),
        settings.gemini.api_key.clone(),
        settings.gemini.model.clone(),
        settings.pipeline.default_location,
        default_coordinates,
        settings.gemini.timeout_secs,
    ));

    let places = Arc::new(GeminiPlacesClient::new(
        settings.gemini.base_url,
        settings.gemini.api_key.clone(),
        settings.gemini.model,
        settings.pipeline.max_providers,
        settings.gemini.timeout_secs,
    ));

    info!("Gemini triage and places clients initialized");

    let pipeline = Arc::new(crate::core::Pipeline::new(
        transcriber.clone(),
        triage,
        places,
        settings.pipeline.degrade_on_provider_failure,
    ));

    // Build application state
    let app_state = AppState {
        pipeline,
        transcriber,
        gemini_configured: !settings.gemini.api_key.is_empty(),
        sarvam_configured: !settings.sarvam.api_key.is_empty(),
    };

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
