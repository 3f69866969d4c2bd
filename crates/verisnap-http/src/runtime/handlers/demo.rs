//! Demo analysis handler

use axum::{
    extract::{Multipart, State, multipart::MultipartRejection},
    response::Json,
};
use verisnap_core::{AnalysisResult, generate_demo_result};

use crate::runtime::{
    error::{ErrorResponse, RequestId, RuntimeResult},
    http::AnalysisRuntime,
    upload::read_image,
};

/// POST /api/demo-analyze - Randomized result for use without a provider key
///
/// The image must be present but its content is never inspected.
#[utoipa::path(
    post,
    path = "/api/demo-analyze",
    tag = "analysis",
    request_body(content = super::analyze::ImageUpload, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Randomized analysis result", body = AnalysisResult),
        (status = 400, description = "Missing image or body over the limit", body = ErrorResponse),
        (status = 500, description = "Unexpected failure", body = ErrorResponse)
    )
)]
pub async fn demo_analyze(
    State(runtime): State<AnalysisRuntime>,
    request_id: RequestId,
    multipart: Result<Multipart, MultipartRejection>,
) -> RuntimeResult<Json<AnalysisResult>> {
    let body_limit = runtime.config().max_body_size;
    let image = read_image(multipart, None, body_limit, &request_id).await?;

    let delay = runtime.config().demo_delay;
    tracing::info!(
        %request_id,
        image_bytes = image.len(),
        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
        "Generating demo analysis"
    );
    tokio::time::sleep(delay).await;

    let result = generate_demo_result(&mut rand::rng());
    tracing::debug!(
        %request_id,
        prediction = %result.prediction,
        confidence = result.confidence,
        "Demo analysis ready"
    );

    Ok(Json(result))
}
