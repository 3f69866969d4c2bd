//! OpenAI-compatible vision client
//!
//! Sends one chat completion per image: a single user turn holding the fixed
//! analysis prompt and the image as a base64 data URI.
//!
//! # Connection Behavior
//!
//! | Setting | Default | Notes |
//! |---------|---------|-------|
//! | Timeout | none | Only applied when configured |
//! | Retries | none | One attempt per analysis |
//! | Model | `gpt-4o` | Any vision-capable chat model |
//! | `max_tokens` | 1000 | |
//! | `temperature` | 0.3 | |
//!
//! The client uses `reqwest`'s connection pooling and is cheap to clone.
//!
//! # Error Handling
//!
//! | Status | Error Type |
//! |--------|------------|
//! | 401 | `Unauthorized` |
//! | 429 | `TooManyRequests` |
//! | other non-2xx | `Api` |
//! | 2xx without text | `EmptyResponse` |

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;
use verisnap_core::{ANALYSIS_PROMPT, ProviderError, VisionProvider, image_data_uri};

use crate::error::{VisionError, VisionResult};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o";
pub const DEFAULT_MAX_TOKENS: u32 = 1000;
pub const DEFAULT_TEMPERATURE: f32 = 0.3;

/// Connection and sampling settings for [`OpenAiVisionClient`]
#[derive(Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout: Option<Duration>,
}

impl OpenAiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            timeout: None,
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    #[must_use]
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

impl std::fmt::Debug for OpenAiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiConfig")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: [ContentPart<'a>; 2],
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart<'a> {
    Text { text: &'a str },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// Vision provider backed by an OpenAI-compatible chat completions API
#[derive(Clone)]
pub struct OpenAiVisionClient {
    http: Client,
    completions_url: Url,
    config: OpenAiConfig,
}

impl std::fmt::Debug for OpenAiVisionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiVisionClient")
            .field("completions_url", &self.completions_url.as_str())
            .field("model", &self.config.model)
            .finish()
    }
}

impl OpenAiVisionClient {
    pub fn new(config: OpenAiConfig) -> VisionResult<Self> {
        let mut builder =
            Client::builder().user_agent(format!("verisnap/{}", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| VisionError::ClientBuild(e.to_string()))?;
        Self::with_http_client(config, http)
    }

    /// Use a preconfigured `reqwest::Client`.
    pub fn with_http_client(config: OpenAiConfig, http: Client) -> VisionResult<Self> {
        let completions_url = completions_url(&config.base_url)?;
        Ok(Self {
            http,
            completions_url,
            config,
        })
    }

    pub fn completions_url(&self) -> &Url {
        &self.completions_url
    }

    pub fn config(&self) -> &OpenAiConfig {
        &self.config
    }

    /// Ask the model to analyse one image and return its text answer.
    pub async fn describe(&self, image: &[u8], mime_type: &str) -> VisionResult<String> {
        let body = ChatCompletionRequest {
            model: &self.config.model,
            messages: [ChatMessage {
                role: "user",
                content: [
                    ContentPart::Text {
                        text: ANALYSIS_PROMPT,
                    },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl {
                            url: image_data_uri(image, mime_type),
                        },
                    },
                ],
            }],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        info!(
            model = %self.config.model,
            image_bytes = image.len(),
            mime_type,
            "Requesting vision analysis"
        );

        let response = self
            .http
            .post(self.completions_url.clone())
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(handle_error_response(status, response).await);
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| VisionError::Decode(e.to_string()))?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|text| !text.trim().is_empty())
            .ok_or(VisionError::EmptyResponse)?;

        debug!(chars = content.len(), "Received vision analysis");
        Ok(content)
    }

    fn transport_error(&self, error: reqwest::Error) -> VisionError {
        match self.config.timeout {
            Some(timeout) if error.is_timeout() => VisionError::Timeout {
                timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            },
            _ => VisionError::Connection(error.to_string()),
        }
    }
}

#[async_trait]
impl VisionProvider for OpenAiVisionClient {
    async fn analyze_image(&self, image: &[u8], mime_type: &str) -> Result<String, ProviderError> {
        self.describe(image, mime_type)
            .await
            .map_err(ProviderError::new)
    }

    fn name(&self) -> String {
        format!("openai:{}", self.config.model)
    }
}

/// `{base}/chat/completions`, tolerating a base with or without trailing slash.
fn completions_url(base_url: &str) -> VisionResult<Url> {
    let mut base = Url::parse(base_url)?;
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    Ok(base.join("chat/completions")?)
}

async fn handle_error_response(status: StatusCode, response: reqwest::Response) -> VisionError {
    let text = response.text().await.unwrap_or_default();
    let message = match serde_json::from_str::<ApiErrorBody>(&text) {
        Ok(body) => body.error.message,
        Err(_) if text.trim().is_empty() => status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_string(),
        Err(_) => text,
    };
    warn!(status = status.as_u16(), %message, "Vision provider returned an error");
    VisionError::from_status(status.as_u16(), message)
}
