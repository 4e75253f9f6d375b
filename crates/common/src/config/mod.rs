//! Configuration management for FoodEvents services
//!
//! Supports loading configuration from:
//! - Environment variables (prefixed with APP__)
//! - The conventional `OPENAI_API_KEY` and `FDA_API_URL` variables
//! - Configuration files (config/default, config/{APP_ENV}, config/local)
//! - Default values

use crate::errors::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default openFDA food adverse-event endpoint
pub const DEFAULT_OPENFDA_URL: &str = "https://api.fda.gov/food/event.json";

/// Default chat-completions endpoint
pub const DEFAULT_LLM_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";

/// Main application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// openFDA reporting API configuration
    #[serde(default)]
    pub openfda: OpenFdaConfig,

    /// Generation service configuration
    #[serde(default)]
    pub llm: LlmConfig,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Request timeout in seconds. Raised at runtime to outlast both
    /// upstream calls of a query.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OpenFdaConfig {
    /// Food adverse-event endpoint; query strings are appended after `?`
    #[serde(default = "default_openfda_url")]
    pub base_url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_openfda_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LlmConfig {
    /// API key for the generation service. Empty disables generation.
    #[serde(default)]
    pub api_key: String,

    /// Chat-completions endpoint
    #[serde(default = "default_llm_endpoint")]
    pub endpoint: String,

    /// Model to use
    #[serde(default = "default_llm_model")]
    pub model: String,

    /// Sampling temperature
    #[serde(default = "default_llm_temperature")]
    pub temperature: f32,

    /// Request timeout in seconds
    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level (debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default = "default_json_logging")]
    pub json_logging: bool,

    /// Metrics port (0 to disable)
    #[serde(default = "default_metrics_port")]
    pub metrics_port: u16,

    /// Service name reported in logs
    #[serde(default = "default_service_name")]
    pub service_name: String,
}

// Default value functions
fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8080 }
fn default_request_timeout() -> u64 { 45 }
fn default_openfda_url() -> String { DEFAULT_OPENFDA_URL.to_string() }
fn default_openfda_timeout() -> u64 { 10 }
fn default_llm_endpoint() -> String { DEFAULT_LLM_ENDPOINT.to_string() }
fn default_llm_model() -> String { "gpt-4o".to_string() }
fn default_llm_temperature() -> f32 { 0.3 }
fn default_llm_timeout() -> u64 { 30 }
fn default_log_level() -> String { "info".to_string() }
fn default_json_logging() -> bool { true }
fn default_metrics_port() -> u16 { 9090 }
fn default_service_name() -> String { "foodevents".to_string() }

impl AppConfig {
    /// Load configuration from environment and files
    pub fn load() -> Result<Self> {
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        let config = Config::builder()
            // Load base config file
            .add_source(File::with_name("config/default").required(false))

            // Load environment-specific config
            .add_source(File::with_name(&format!("config/{}", env)).required(false))

            // Load local overrides
            .add_source(File::with_name("config/local").required(false))

            // Load from environment variables with APP__ prefix
            // e.g., APP__SERVER__PORT=8081
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true)
            )

            // Conventional unprefixed variables win over everything else
            .set_override_option("llm.api_key", std::env::var("OPENAI_API_KEY").ok())?
            .set_override_option("openfda.base_url", std::env::var("FDA_API_URL").ok())?

            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// Get request timeout as Duration.
    ///
    /// Never shorter than the openFDA and generation timeouts back to back,
    /// so a slow upstream ends as an answer rather than a cut-off request.
    pub fn request_timeout(&self) -> Duration {
        let upstream = self.openfda.timeout_secs + self.llm.timeout_secs + 1;
        Duration::from_secs(self.server.request_timeout_secs.max(upstream))
    }

    /// Whether a generation credential is present
    pub fn llm_configured(&self) -> bool {
        self.llm.is_configured()
    }
}

impl OpenFdaConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl LlmConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn is_configured(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl Default for OpenFdaConfig {
    fn default() -> Self {
        Self {
            base_url: default_openfda_url(),
            timeout_secs: default_openfda_timeout(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            endpoint: default_llm_endpoint(),
            model: default_llm_model(),
            temperature: default_llm_temperature(),
            timeout_secs: default_llm_timeout(),
        }
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logging: default_json_logging(),
            metrics_port: default_metrics_port(),
            service_name: default_service_name(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            openfda: OpenFdaConfig::default(),
            llm: LlmConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}
