//! # verisnap vision
//!
//! An OpenAI-compatible chat completions client that implements
//! [`verisnap_core::VisionProvider`]. Any endpoint speaking the same protocol
//! (Azure OpenAI proxies, local gateways) can be targeted via the base URL.

pub mod client;
pub mod error;

pub use client::{
    DEFAULT_BASE_URL, DEFAULT_MAX_TOKENS, DEFAULT_MODEL, DEFAULT_TEMPERATURE, OpenAiConfig,
    OpenAiVisionClient,
};
pub use error::{VisionError, VisionResult};
