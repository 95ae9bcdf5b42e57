use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub gemini: GeminiSettings,
    #[serde(default)]
    pub sarvam: SarvamSettings,
    #[serde(default)]
    pub pipeline: PipelineSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub workers: Option<usize>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: None,
        }
    }
}

fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8000 }

/// Gemini language-model service (triage and place grounding)
#[derive(Debug, Clone, Deserialize)]
pub struct GeminiSettings {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_gemini_base_url")]
    pub base_url: String,
    #[serde(default = "default_gemini_model")]
    pub model: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for GeminiSettings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_gemini_base_url(),
            model: default_gemini_model(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_gemini_base_url() -> String { "https://generativelanguage.googleapis.com".to_string() }
fn default_gemini_model() -> String { "gemini-2.0-flash".to_string() }

/// Sarvam speech-to-text service
#[derive(Debug, Clone, Deserialize)]
pub struct SarvamSettings {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_sarvam_base_url")]
    pub base_url: String,
    #[serde(default = "default_sarvam_model")]
    pub model: String,
    #[serde(default = "default_stt_prompt")]
    pub stt_prompt: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SarvamSettings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_sarvam_base_url(),
            model: default_sarvam_model(),
            stt_prompt: default_stt_prompt(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_sarvam_base_url() -> String { "https://api.sarvam.ai".to_string() }
fn default_sarvam_model() -> String { "saaras:v2".to_string() }
fn default_stt_prompt() -> String { "medical symptoms healthcare".to_string() }
fn default_timeout_secs() -> u64 { 15 }

/// Orchestration pipeline policy
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineSettings {
    /// Location assumed when the user input does not mention one
    #[serde(default = "default_location")]
    pub default_location: String,
    #[serde(default = "default_latitude")]
    pub default_latitude: f64,
    #[serde(default = "default_longitude")]
    pub default_longitude: f64,
    /// When true, a provider-lookup failure degrades the response instead
    /// of failing the whole request
    #[serde(default = "default_true")]
    pub degrade_on_provider_failure: bool,
    #[serde(default = "default_max_providers")]
    pub max_providers: usize,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            default_location: default_location(),
            default_latitude: default_latitude(),
            default_longitude: default_longitude(),
            degrade_on_provider_failure: true,
            max_providers: default_max_providers(),
        }
    }
}

fn default_location() -> String { "Mumbai".to_string() }
fn default_latitude() -> f64 { 19.0760 }
fn default_longitude() -> f64 { 72.8777 }
fn default_true() -> bool { true }
fn default_max_providers() -> usize { 5 }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Environment variables (prefixed with AAYU_)
    pub fn load() -> Result<Self, ConfigError> {
        let mut settings = Config::builder()
            // Add default config file
            .add_source(File::with_name("config/default").required(false))
            // Add local config file (for development overrides)
            .add_source(File::with_name("config/local").required(false))
            // Add environment variables (prefixed with AAYU_)
            // e.g., AAYU_SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("AAYU")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        // Apply the bare credential variables the original deployment used
        settings = substitute_env_vars(settings)?;

        let settings: Settings = settings.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Both upstream credentials are required before the service can serve
    /// traffic; a missing key is a startup error, not a per-request one.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.gemini.api_key.trim().is_empty() {
            return Err(ConfigError::Message(
                "Gemini API key not configured: set GEMINI_API_KEY (get one at https://ai.google.dev/)"
                    .to_string(),
            ));
        }
        if self.sarvam.api_key.trim().is_empty() {
            return Err(ConfigError::Message(
                "Sarvam API key not configured: set SARVAM_API_KEY (get one at https://www.sarvam.ai/)"
                    .to_string(),
            ));
        }
        Ok(())
    }
}

/// Overlay the bare credential variables onto the nested config keys
/// GEMINI_API_KEY -> gemini.api_key, SARVAM_API_KEY -> sarvam.api_key
fn substitute_env_vars(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let gemini_key = env::var("GEMINI_API_KEY")
        .or_else(|_| env::var("AAYU_GEMINI__API_KEY"))
        .ok();
    let sarvam_key = env::var("SARVAM_API_KEY")
        .or_else(|_| env::var("AAYU_SARVAM__API_KEY"))
        .ok();

    let mut builder = Config::builder().add_source(settings);

    if let Some(key) = gemini_key {
        builder = builder.set_override("gemini.api_key", key)?;
    }
    if let Some(key) = sarvam_key {
        builder = builder.set_override("sarvam.api_key", key)?;
    }

    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_pipeline_policy() {
        let pipeline = PipelineSettings::default();
        assert!(pipeline.degrade_on_provider_failure);
        assert_eq!(pipeline.default_location, "Mumbai");
        assert_eq!(pipeline.max_providers, 5);
        assert!((pipeline.default_latitude - 19.0760).abs() < 1e-9);
        assert!((pipeline.default_longitude - 72.8777).abs() < 1e-9);
    }

    #[test]
    fn test_default_upstream_endpoints() {
        let gemini = GeminiSettings::default();
        let sarvam = SarvamSettings::default();
        assert_eq!(gemini.model, "gemini-2.0-flash");
        assert_eq!(sarvam.model, "saaras:v2");
        assert!(gemini.base_url.starts_with("https://"));
        assert!(sarvam.base_url.starts_with("https://"));
        assert_eq!(gemini.timeout_secs, 15);
    }

    #[test]
    fn test_missing_keys_fail_validation() {
        let settings = Settings {
            server: ServerSettings::default(),
            gemini: GeminiSettings::default(),
            sarvam: SarvamSettings::default(),
            pipeline: PipelineSettings::default(),
            logging: LoggingSettings::default(),
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_default_logging() {
        let logging = LoggingSettings::default();
        assert_eq!(logging.level, "info");
        assert_eq!(logging.format, "json");
    }
}
