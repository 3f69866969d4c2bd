//! # Environment-Based Configuration
//!
//! Loads the HTTP runtime configuration from environment variables so a
//! deployment can change provider settings and limits without a rebuild.
//!
//! ## Environment Variables
//!
//! ### Vision Provider
//! - `OPENAI_API_KEY` - Provider credential. When unset the live endpoint answers
//!   with a configuration error; demo mode keeps working
//! - `VERISNAP_OPENAI_BASE_URL` - Chat completions base URL (default: `https://api.openai.com/v1`)
//! - `VERISNAP_OPENAI_MODEL` - Vision model (default: `gpt-4o`)
//! - `VERISNAP_OPENAI_MAX_TOKENS` - Output token cap (default: 1000)
//! - `VERISNAP_OPENAI_TEMPERATURE` - Sampling temperature 0.0-2.0 (default: 0.3)
//! - `VERISNAP_PROVIDER_TIMEOUT_SECS` - Per-request provider timeout (default: none)
//!
//! ### HTTP Runtime
//! - `VERISNAP_MAX_IMAGE_BYTES` - Largest accepted image (default: 20971520 / 20MB)
//! - `VERISNAP_MAX_BODY_SIZE` - Maximum request body size in bytes (default: 26214400 / 25MB)
//! - `VERISNAP_DEMO_DELAY_MS` - Artificial latency of the demo endpoint (default: 2000)
//! - `VERISNAP_ENABLE_CORS` - Enable CORS (default: true)
//! - `VERISNAP_ENABLE_OPENAPI` - Enable OpenAPI docs (default: true)

use std::{env, time::Duration};
use verisnap_core::DEFAULT_DEMO_DELAY;
use verisnap_vision::{
    DEFAULT_BASE_URL, DEFAULT_MAX_TOKENS, DEFAULT_MODEL, DEFAULT_TEMPERATURE, OpenAiConfig,
};

/// Largest image the live endpoint accepts.
pub const DEFAULT_MAX_IMAGE_BYTES: usize = 20 * 1024 * 1024;

/// Body limit; kept above the image cap so oversize images get a domain error.
pub const DEFAULT_MAX_BODY_SIZE: usize = 25 * 1024 * 1024;

const MAX_BODY_SIZE_CEILING: usize = 100 * 1024 * 1024;
const MAX_DEMO_DELAY_MS: u64 = 60_000;
const MAX_PROVIDER_TIMEOUT_SECS: u64 = 600;

/// Error type for configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid environment variable '{key}': {message}")]
    InvalidEnvVar { key: String, message: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

/// Validated runtime configuration
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Provider settings; `None` when no credential is configured
    pub provider: Option<OpenAiConfig>,
    pub max_image_bytes: usize,
    pub max_body_size: usize,
    pub demo_delay: Duration,
    pub enable_cors: bool,
    pub enable_openapi: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            provider: None,
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
            max_body_size: DEFAULT_MAX_BODY_SIZE,
            demo_delay: DEFAULT_DEMO_DELAY,
            enable_cors: true,
            enable_openapi: true,
        }
    }
}

impl RuntimeConfig {
    pub fn provider_configured(&self) -> bool {
        self.provider.is_some()
    }
}

/// Builder for [`RuntimeConfig`] with environment variable support
#[derive(Clone)]
pub struct RuntimeConfigBuilder {
    api_key: Option<String>,
    base_url: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
    provider_timeout_secs: Option<u64>,
    max_image_bytes: usize,
    max_body_size: usize,
    demo_delay_ms: u64,
    enable_cors: bool,
    enable_openapi: bool,
}

impl std::fmt::Debug for RuntimeConfigBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuntimeConfigBuilder")
            .field("api_key_set", &self.api_key.is_some())
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("provider_timeout_secs", &self.provider_timeout_secs)
            .field("max_image_bytes", &self.max_image_bytes)
            .field("max_body_size", &self.max_body_size)
            .field("demo_delay_ms", &self.demo_delay_ms)
            .field("enable_cors", &self.enable_cors)
            .field("enable_openapi", &self.enable_openapi)
            .finish()
    }
}

impl Default for RuntimeConfigBuilder {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            provider_timeout_secs: None,
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
            max_body_size: DEFAULT_MAX_BODY_SIZE,
            demo_delay_ms: u64::try_from(DEFAULT_DEMO_DELAY.as_millis()).unwrap_or(2000),
            enable_cors: true,
            enable_openapi: true,
        }
    }
}

impl RuntimeConfigBuilder {
    /// Create a new builder with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if any environment variable has an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut builder = Self::default();

        // Vision provider
        if let Some(key) = get_env_string("OPENAI_API_KEY") {
            builder = builder.api_key(key);
        }
        if let Some(url) = get_env_string("VERISNAP_OPENAI_BASE_URL") {
            builder = builder.base_url(url);
        }
        if let Some(model) = get_env_string("VERISNAP_OPENAI_MODEL") {
            builder = builder.model(model);
        }
        if let Some(tokens) = get_env_u32("VERISNAP_OPENAI_MAX_TOKENS")? {
            builder = builder.max_tokens(tokens);
        }
        if let Some(temperature) = get_env_f32("VERISNAP_OPENAI_TEMPERATURE")? {
            builder = builder.temperature(temperature);
        }
        if let Some(timeout) = get_env_u64("VERISNAP_PROVIDER_TIMEOUT_SECS")? {
            builder = builder.provider_timeout_secs(timeout);
        }

        // HTTP runtime
        if let Some(bytes) = get_env_usize("VERISNAP_MAX_IMAGE_BYTES")? {
            builder = builder.max_image_bytes(bytes);
        }
        if let Some(max_size) = get_env_usize("VERISNAP_MAX_BODY_SIZE")? {
            builder = builder.max_body_size(max_size);
        }
        if let Some(delay) = get_env_u64("VERISNAP_DEMO_DELAY_MS")? {
            builder = builder.demo_delay_ms(delay);
        }
        if let Some(cors) = get_env_bool("VERISNAP_ENABLE_CORS")? {
            builder = builder.enable_cors(cors);
        }
        if let Some(openapi) = get_env_bool("VERISNAP_ENABLE_OPENAPI")? {
            builder = builder.enable_openapi(openapi);
        }

        Ok(builder)
    }

    /// Set the provider credential. Blank keys count as unset.
    #[must_use]
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        let key = key.into();
        self.api_key = if key.trim().is_empty() {
            None
        } else {
            Some(key)
        };
        self
    }

    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    #[must_use]
    pub fn max_tokens(mut self, tokens: u32) -> Self {
        self.max_tokens = tokens;
        self
    }

    #[must_use]
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the provider request timeout in seconds
    #[must_use]
    pub fn provider_timeout_secs(mut self, timeout: u64) -> Self {
        self.provider_timeout_secs = Some(timeout);
        self
    }

    /// Set the largest accepted image in bytes
    #[must_use]
    pub fn max_image_bytes(mut self, bytes: usize) -> Self {
        self.max_image_bytes = bytes;
        self
    }

    /// Set maximum request body size in bytes
    #[must_use]
    pub fn max_body_size(mut self, size: usize) -> Self {
        self.max_body_size = size;
        self
    }

    #[must_use]
    pub fn demo_delay_ms(mut self, delay: u64) -> Self {
        self.demo_delay_ms = delay;
        self
    }

    /// Enable or disable CORS
    #[must_use]
    pub fn enable_cors(mut self, enable: bool) -> Self {
        self.enable_cors = enable;
        self
    }

    /// Enable or disable `OpenAPI` documentation
    #[must_use]
    pub fn enable_openapi(mut self, enable: bool) -> Self {
        self.enable_openapi = enable;
        self
    }

    /// Validate configuration and build [`RuntimeConfig`]
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` if the configuration is invalid.
    pub fn build(self) -> Result<RuntimeConfig, ConfigError> {
        self.validate()?;

        let provider = self.api_key.map(|key| {
            let mut provider = OpenAiConfig::new(key)
                .with_base_url(self.base_url)
                .with_model(self.model)
                .with_max_tokens(self.max_tokens)
                .with_temperature(self.temperature);
            if let Some(secs) = self.provider_timeout_secs {
                provider = provider.with_timeout(Duration::from_secs(secs));
            }
            provider
        });

        Ok(RuntimeConfig {
            provider,
            max_image_bytes: self.max_image_bytes,
            max_body_size: self.max_body_size,
            demo_delay: Duration::from_millis(self.demo_delay_ms),
            enable_cors: self.enable_cors,
            enable_openapi: self.enable_openapi,
        })
    }

    fn validate(&self) -> Result<(), ConfigError> {
        // Provider validation
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "base_url cannot be empty".to_string(),
            ));
        }
        if self.model.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "model cannot be empty".to_string(),
            ));
        }
        if self.max_tokens == 0 {
            return Err(ConfigError::ValidationError(
                "max_tokens must be greater than 0".to_string(),
            ));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::ValidationError(
                "temperature must be between 0.0 and 2.0".to_string(),
            ));
        }
        if let Some(timeout) = self.provider_timeout_secs {
            if timeout == 0 {
                return Err(ConfigError::ValidationError(
                    "provider_timeout_secs must be greater than 0".to_string(),
                ));
            }
            if timeout > MAX_PROVIDER_TIMEOUT_SECS {
                return Err(ConfigError::ValidationError(format!(
                    "provider_timeout_secs must be <= {MAX_PROVIDER_TIMEOUT_SECS}"
                )));
            }
        }

        // Size limits
        if self.max_image_bytes == 0 {
            return Err(ConfigError::ValidationError(
                "max_image_bytes must be greater than 0".to_string(),
            ));
        }
        if self.max_body_size > MAX_BODY_SIZE_CEILING {
            return Err(ConfigError::ValidationError(
                "max_body_size must be <= 100MB".to_string(),
            ));
        }
        if self.max_body_size < self.max_image_bytes {
            return Err(ConfigError::ValidationError(
                "max_body_size must be >= max_image_bytes".to_string(),
            ));
        }

        if self.demo_delay_ms > MAX_DEMO_DELAY_MS {
            return Err(ConfigError::ValidationError(format!(
                "demo_delay_ms must be <= {MAX_DEMO_DELAY_MS}"
            )));
        }

        Ok(())
    }
}

// Environment variable helper functions

fn get_env_string(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn get_env_bool(key: &str) -> Result<Option<bool>, ConfigError> {
    match env::var(key) {
        Ok(val) => match val.to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(Some(true)),
            "false" | "0" | "no" | "off" => Ok(Some(false)),
            _ => Err(ConfigError::InvalidEnvVar {
                key: key.to_string(),
                message: format!(
                    "invalid boolean value '{val}', expected true/false/1/0/yes/no/on/off"
                ),
            }),
        },
        Err(_) => Ok(None),
    }
}

fn get_env_u64(key: &str) -> Result<Option<u64>, ConfigError> {
    match env::var(key) {
        Ok(val) => val
            .parse::<u64>()
            .map(Some)
            .map_err(|e| ConfigError::InvalidEnvVar {
                key: key.to_string(),
                message: format!("invalid u64 value '{val}': {e}"),
            }),
        Err(_) => Ok(None),
    }
}

fn get_env_u32(key: &str) -> Result<Option<u32>, ConfigError> {
    match env::var(key) {
        Ok(val) => val
            .parse::<u32>()
            .map(Some)
            .map_err(|e| ConfigError::InvalidEnvVar {
                key: key.to_string(),
                message: format!("invalid u32 value '{val}': {e}"),
            }),
        Err(_) => Ok(None),
    }
}

fn get_env_usize(key: &str) -> Result<Option<usize>, ConfigError> {
    match env::var(key) {
        Ok(val) => val
            .parse::<usize>()
            .map(Some)
            .map_err(|e| ConfigError::InvalidEnvVar {
                key: key.to_string(),
                message: format!("invalid usize value '{val}': {e}"),
            }),
        Err(_) => Ok(None),
    }
}

fn get_env_f32(key: &str) -> Result<Option<f32>, ConfigError> {
    match env::var(key) {
        Ok(val) => val
            .parse::<f32>()
            .map(Some)
            .map_err(|e| ConfigError::InvalidEnvVar {
                key: key.to_string(),
                message: format!("invalid f32 value '{val}': {e}"),
            }),
        Err(_) => Ok(None),
    }
}
