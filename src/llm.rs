//! LLM provider abstraction
//!
//! `LlmService` is the provider seam; `ModelGateway` turns a system prompt and
//! user messages into generated text on top of it.

mod azure;
mod error;
mod types;

pub use azure::{AzureConfig, DEFAULT_API_VERSION, DEFAULT_DEPLOYMENT};
use azure::AzureOpenAIService;
pub use error::{LlmError, LlmErrorKind};
pub use types::*;

use async_trait::async_trait;
use std::sync::Arc;

/// Common interface for LLM providers
#[async_trait]
pub trait LlmService: Send + Sync {
    /// Make a completion request
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError>;

    /// Get the model ID
    fn model_id(&self) -> &str;
}

/// Logging wrapper for LLM services
pub struct LoggingService {
    inner: Arc<dyn LlmService>,
    model_id: String,
}

impl LoggingService {
    pub fn new(inner: Arc<dyn LlmService>) -> Self {
        let model_id = inner.model_id().to_string();
        Self { inner, model_id }
    }
}

#[async_trait]
impl LlmService for LoggingService {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        let start = std::time::Instant::now();
        let result = self.inner.complete(request).await;
        let duration = start.elapsed();

        match &result {
            Ok(response) => {
                tracing::info!(
                    model = %self.model_id,
                    duration_ms = %duration.as_millis(),
                    input_tokens = response.usage.input_tokens,
                    output_tokens = response.usage.output_tokens,
                    "LLM request completed"
                );
            }
            Err(e) => {
                tracing::error!(
                    model = %self.model_id,
                    duration_ms = %duration.as_millis(),
                    error = %e.message,
                    kind = e.kind.as_str(),
                    "LLM request failed"
                );
            }
        }

        result
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

/// Request/response adapter over the configured backend.
///
/// No retries and no caching: every call goes upstream.
#[derive(Clone)]
pub struct ModelGateway {
    service: Option<Arc<dyn LlmService>>,
}

impl ModelGateway {
    /// Wrap a provider with request logging
    pub fn new(service: Arc<dyn LlmService>) -> Self {
        Self {
            service: Some(Arc::new(LoggingService::new(service))),
        }
    }

    /// Build from config. Without an API key every call fails with an auth error.
    pub fn from_config(config: &AzureConfig) -> Self {
        match AzureOpenAIService::from_config(config) {
            Some(service) => Self::new(Arc::new(service)),
            None => Self { service: None },
        }
    }

    pub fn is_configured(&self) -> bool {
        self.service.is_some()
    }

    pub fn model_id(&self) -> Option<&str> {
        self.service.as_deref().map(|s| s.model_id())
    }

    /// Generate text for one system instruction and ordered user messages
    pub async fn generate(
        &self,
        system_prompt: &str,
        user_messages: &[String],
    ) -> Result<String, LlmError> {
        let service = self.service.as_ref().ok_or_else(|| {
            LlmError::auth("No generative backend configured (set AZURE_OPENAI_API_KEY)")
        })?;

        let request = LlmRequest::from_prompt(system_prompt, user_messages);
        let response = service.complete(&request).await?;

        if response.text.trim().is_empty() {
            return Err(LlmError::malformed("Model returned an empty reply"));
        }
        Ok(response.text)
    }
}
