//! Trait abstractions for runtime I/O
//!
//! These traits enable testing the session manager with mock implementations.

use crate::llm::{LlmError, ModelGateway};
use async_trait::async_trait;
use std::sync::Arc;

/// Produces model text for a system prompt and ordered user messages
#[async_trait]
pub trait ReplyGenerator: Send + Sync {
    async fn generate(
        &self,
        system_prompt: &str,
        user_messages: &[String],
    ) -> Result<String, LlmError>;
}

#[async_trait]
impl ReplyGenerator for ModelGateway {
    async fn generate(
        &self,
        system_prompt: &str,
        user_messages: &[String],
    ) -> Result<String, LlmError> {
        ModelGateway::generate(self, system_prompt, user_messages).await
    }
}

// ============================================================================
// Arc implementations for trait objects
// ============================================================================

#[async_trait]
impl<T: ReplyGenerator + ?Sized> ReplyGenerator for Arc<T> {
    async fn generate(
        &self,
        system_prompt: &str,
        user_messages: &[String],
    ) -> Result<String, LlmError> {
        (**self).generate(system_prompt, user_messages).await
    }
}
