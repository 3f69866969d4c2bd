//! Client for a running verisnap server

use reqwest::{Client, multipart};
use serde::Deserialize;
use thiserror::Error;
use url::Url;
use verisnap_core::{AnalysisRequest, AnalysisResult, IMAGE_FIELD};

#[derive(Debug, Error)]
pub enum ClientError {
    /// The server answered with an error body; `message` is its `error` field
    #[error("{message}")]
    Server { status: u16, message: String },

    #[error("Could not reach server: {0}")]
    Transport(String),

    #[error("Unexpected response from server: {0}")]
    Decode(String),
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Debug, Clone)]
pub struct AnalysisClient {
    http: Client,
    base: Url,
}

impl AnalysisClient {
    /// `base` may carry a path prefix; endpoints are resolved beneath it.
    pub fn new(mut base: Url) -> Self {
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Self {
            http: Client::new(),
            base,
        }
    }

    fn endpoint_url(&self, endpoint: &str) -> Result<Url, url::ParseError> {
        self.base.join(endpoint.trim_start_matches('/'))
    }

    /// Upload the request's image to the endpoint its mode selects.
    pub async fn analyze(&self, request: &AnalysisRequest<'_>) -> Result<AnalysisResult, ClientError> {
        let url = self
            .endpoint_url(request.endpoint())
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        let part = multipart::Part::bytes(request.image.bytes.clone())
            .file_name(request.image.name.clone())
            .mime_str(&request.image.mime_type)
            .map_err(|e| ClientError::Transport(e.to_string()))?;
        let form = multipart::Form::new().part(IMAGE_FIELD, part);

        tracing::info!(
            %url,
            file = %request.image.name,
            bytes = request.image.bytes.len(),
            "Uploading image for analysis"
        );

        let response = self
            .http
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return response
                .json::<AnalysisResult>()
                .await
                .map_err(|e| ClientError::Decode(e.to_string()));
        }

        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&text)
            .map(|body| body.error)
            .unwrap_or_default();
        Err(ClientError::Server {
            status: status.as_u16(),
            message,
        })
    }
}
