//! Live analysis handler

use axum::{
    extract::{Multipart, State, multipart::MultipartRejection},
    response::Json,
};
use verisnap_core::{AnalysisResult, InterpretationPath, interpret_provider_text};

use crate::runtime::{
    error::{ErrorResponse, RequestId, RuntimeError, RuntimeResult},
    http::AnalysisRuntime,
    upload::read_image,
};

/// Multipart body accepted by both analysis endpoints
#[derive(utoipa::ToSchema)]
pub struct ImageUpload {
    /// Product photo
    #[schema(value_type = String, format = Binary)]
    pub image: Vec<u8>,
}

/// POST /api/analyze - Judge a product photo with the configured vision provider
#[utoipa::path(
    post,
    path = "/api/analyze",
    tag = "analysis",
    request_body(content = ImageUpload, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Analysis result", body = AnalysisResult),
        (status = 400, description = "Missing or oversized image", body = ErrorResponse),
        (status = 401, description = "Provider rejected the API key", body = ErrorResponse),
        (status = 429, description = "Provider quota or rate limit hit", body = ErrorResponse),
        (status = 500, description = "Provider not configured or failed", body = ErrorResponse)
    )
)]
pub async fn analyze_image(
    State(runtime): State<AnalysisRuntime>,
    request_id: RequestId,
    multipart: Result<Multipart, MultipartRejection>,
) -> RuntimeResult<Json<AnalysisResult>> {
    let config = runtime.config();
    let image = read_image(
        multipart,
        Some(config.max_image_bytes),
        config.max_body_size,
        &request_id,
    )
    .await?;

    let provider = runtime
        .provider()
        .ok_or_else(|| RuntimeError::provider_not_configured(request_id.clone()))?;

    tracing::info!(
        %request_id,
        provider = %provider.name(),
        file_name = image.file_name.as_deref().unwrap_or(""),
        image_bytes = image.len(),
        mime_type = image.mime_type(),
        "Analyzing image"
    );

    let text = provider
        .analyze_image(&image.bytes, image.mime_type())
        .await
        .map_err(|e| RuntimeError::provider(e.to_string(), request_id.clone()))?;

    let (result, path) = interpret_provider_text(&text);
    match path {
        InterpretationPath::Structured => tracing::info!(
            %request_id,
            prediction = %result.prediction,
            confidence = result.confidence,
            "Provider answered with structured JSON"
        ),
        InterpretationPath::Fallback => tracing::warn!(
            %request_id,
            prediction = %result.prediction,
            response_chars = text.len(),
            "No JSON in provider answer, classified by keywords"
        ),
    }

    Ok(Json(result))
}
