//! API documentation handlers
//!
//! OpenAPI specification and Swagger UI endpoints for the analysis API.

use axum::response::{Html, Json};
use utoipa::OpenApi;
use verisnap_core::{AnalysisDetails, AnalysisResult, Prediction};

use crate::runtime::{
    error::{ErrorCode, ErrorResponse, RequestId},
    handlers::{HealthResponse, ImageUpload},
};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::runtime::handlers::analyze::analyze_image,
        crate::runtime::handlers::demo::demo_analyze,
        crate::runtime::handlers::health::health_check
    ),
    components(
        schemas(
            AnalysisResult,
            AnalysisDetails,
            Prediction,
            ImageUpload,
            ErrorResponse,
            ErrorCode,
            RequestId,
            HealthResponse
        )
    ),
    tags(
        (name = "analysis", description = "Product photo authenticity analysis"),
        (name = "health", description = "Health check endpoints")
    ),
    info(
        title = "verisnap API",
        description = "Upload a product photo and get a Real/Fake judgment with confidence and reasoning"
    ),
    servers(
        (url = "http://localhost:3000", description = "Local development server")
    )
)]
pub struct ApiDoc;

/// GET /docs - Swagger UI for interactive API documentation
pub async fn swagger_ui() -> Html<&'static str> {
    Html(
        r#"
<!DOCTYPE html>
<html>
<head>
    <title>verisnap API Documentation</title>
    <link rel="stylesheet" type="text/css" href="https://unpkg.com/swagger-ui-dist@5.17.14/swagger-ui.css" />
</head>
<body>
    <div id="swagger-ui"></div>
    <script src="https://unpkg.com/swagger-ui-dist@5.17.14/swagger-ui-bundle.js"></script>
    <script>
        SwaggerUIBundle({
            url: '/api-docs/openapi.json',
            dom_id: '#swagger-ui',
            presets: [
                SwaggerUIBundle.presets.apis,
                SwaggerUIBundle.presets.standalone
            ]
        });
    </script>
</body>
</html>
        "#,
    )
}

/// GET /api-docs/openapi.json - OpenAPI specification endpoint
pub async fn openapi_spec() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
