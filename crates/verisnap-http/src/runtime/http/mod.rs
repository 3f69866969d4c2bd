//! # HTTP Runtime
//!
//! Shared state behind the router: validated configuration, the optional vision
//! provider and the process start time. Requests never mutate it, so clones are
//! handed to every handler.


use std::{sync::Arc, time::Instant};
use verisnap_core::VisionProvider;
use verisnap_vision::{OpenAiVisionClient, VisionResult};

use crate::runtime::config::RuntimeConfig;

#[derive(Clone)]
pub struct AnalysisRuntime {
    config: Arc<RuntimeConfig>,
    provider: Option<Arc<dyn VisionProvider>>,
    started_at: Instant,
}

impl std::fmt::Debug for AnalysisRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalysisRuntime")
            .field("provider", &self.provider.as_ref().map(|p| p.name()))
            .field("max_image_bytes", &self.config.max_image_bytes)
            .field("demo_delay", &self.config.demo_delay)
            .finish_non_exhaustive()
    }
}

impl AnalysisRuntime {
    /// Runtime without a provider; the live endpoint reports it as unconfigured.
    pub fn new(config: RuntimeConfig) -> Self {
        Self {
            config: Arc::new(config),
            provider: None,
            started_at: Instant::now(),
        }
    }

    /// Build the runtime, creating an OpenAI client when a credential is configured.
    ///
    /// # Errors
    ///
    /// Fails when the provider base URL or HTTP client cannot be set up.
    pub fn from_config(config: RuntimeConfig) -> VisionResult<Self> {
        let provider = match &config.provider {
            Some(openai) => {
                let client = OpenAiVisionClient::new(openai.clone())?;
                tracing::info!(
                    provider = %client.name(),
                    endpoint = %client.completions_url(),
                    "Vision provider configured"
                );
                Some(Arc::new(client) as Arc<dyn VisionProvider>)
            }
            None => {
                tracing::warn!("OPENAI_API_KEY not set; live analysis disabled, demo mode only");
                None
            }
        };

        let mut runtime = Self::new(config);
        runtime.provider = provider;
        Ok(runtime)
    }

    /// Replace the provider, e.g. with a stub in tests.
    #[must_use]
    pub fn with_provider(mut self, provider: Arc<dyn VisionProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn provider(&self) -> Option<&Arc<dyn VisionProvider>> {
        self.provider.as_ref()
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
