//! HTTP request handlers organized by functionality.

pub mod analyze;
pub mod demo;
pub mod health;
pub mod ui;

pub use analyze::{ImageUpload, analyze_image};
pub use demo::demo_analyze;
pub use health::{HealthResponse, health_check};
pub use ui::index;
