//! HTTP router configuration
//!
//! Route registration and the middleware stack for the analysis runtime.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::{catch_panic::CatchPanicLayer, cors::CorsLayer, trace::TraceLayer};
use verisnap_core::{DEMO_ANALYZE_PATH, LIVE_ANALYZE_PATH};

use crate::runtime::{
    docs::{openapi_spec, swagger_ui},
    error::{panic_response, request_id_middleware},
    handlers::{analyze_image, demo_analyze, health_check, index},
    http::AnalysisRuntime,
};

impl AnalysisRuntime {
    /// Create the Axum router with all endpoints and middleware
    pub fn router(self) -> Router {
        let config = self.config().clone();

        // The body limit is enforced while `Multipart` streams, so overruns reach
        // the handler and come back as `image_too_large` JSON.
        let api_routes = Router::new()
            .route(LIVE_ANALYZE_PATH, post(analyze_image))
            .route(DEMO_ANALYZE_PATH, post(demo_analyze))
            .layer(DefaultBodyLimit::max(config.max_body_size));

        let public_routes = Router::new()
            .route("/", get(index))
            .route("/health", get(health_check));

        let mut router = Router::new()
            .merge(public_routes)
            .merge(api_routes)
            .with_state(self);

        if config.enable_openapi {
            router = router.merge(create_openapi_router());
        }

        router = router.layer(CatchPanicLayer::custom(panic_response));

        router = router.layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http()),
        );

        if config.enable_cors {
            router = router.layer(CorsLayer::permissive());
        }

        router
    }
}

/// Create OpenAPI documentation router
fn create_openapi_router() -> Router {
    Router::new()
        .route("/docs", get(swagger_ui))
        .route("/api-docs/openapi.json", get(openapi_spec))
}
