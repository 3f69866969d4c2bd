//! # verisnap HTTP Runtime
//!
//! Serves the product photo authenticity checker:
//!
//! - **Live analysis** (`POST /api/analyze`): forwards the image to a vision
//!   provider and normalizes its answer
//! - **Demo analysis** (`POST /api/demo-analyze`): randomized results, no key needed
//! - **Browser UI** (`GET /`): upload, preview, analyze and report download
//! - **Operations**: health check, OpenAPI document, request ids, graceful shutdown

pub mod runtime;

// Re-export main types for public API
pub use runtime::*;
