//! Azure `OpenAI` chat completions provider

use super::types::{LlmMessage, LlmRequest, LlmResponse, Usage};
use super::{LlmError, LlmService};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

pub const DEFAULT_DEPLOYMENT: &str = "grace-first-project-gpt-4";
pub const DEFAULT_API_VERSION: &str = "2024-10-21";

/// Connection settings for an Azure `OpenAI` deployment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AzureConfig {
    /// Resource endpoint, e.g. `https://my-resource.openai.azure.com`
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    pub deployment: String,
    pub api_version: String,
}

impl Default for AzureConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_key: None,
            deployment: DEFAULT_DEPLOYMENT.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
        }
    }
}

/// Azure `OpenAI` service implementation
pub struct AzureOpenAIService {
    client: Client,
    api_key: String,
    url: String,
    deployment: String,
}

impl AzureOpenAIService {
    /// Returns `None` unless both endpoint and key are set and non-empty
    pub fn from_config(config: &AzureConfig) -> Option<Self> {
        let endpoint = config.endpoint.as_deref().filter(|e| !e.is_empty())?;
        let api_key = config.api_key.as_deref().filter(|k| !k.is_empty())?;
        Some(Self::new(
            endpoint,
            api_key.to_string(),
            &config.deployment,
            &config.api_version,
        ))
    }

    pub fn new(endpoint: &str, api_key: String, deployment: &str, api_version: &str) -> Self {
        Self {
            client: Client::new(),
            api_key,
            url: chat_completions_url(endpoint, deployment, api_version),
            deployment: deployment.to_string(),
        }
    }

    fn translate_request(request: &LlmRequest) -> ChatRequest {
        ChatRequest {
            messages: request.messages.iter().map(translate_message).collect(),
        }
    }

    fn normalize_response(resp: ChatResponse) -> Result<LlmResponse, LlmError> {
        let choice = resp
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::malformed("No choices in response"))?;

        let text = choice
            .message
            .content
            .ok_or_else(|| LlmError::malformed("Response message has no content"))?;

        let usage = resp.usage.map_or_else(Usage::default, |u| Usage {
            input_tokens: u64::from(u.prompt_tokens),
            output_tokens: u64::from(u.completion_tokens),
        });

        Ok(LlmResponse { text, usage })
    }
}

fn chat_completions_url(endpoint: &str, deployment: &str, api_version: &str) -> String {
    format!(
        "{}/openai/deployments/{deployment}/chat/completions?api-version={api_version}",
        endpoint.trim_end_matches('/')
    )
}

fn translate_message(msg: &LlmMessage) -> ChatMessage {
    ChatMessage {
        role: msg.role.as_str().to_string(),
        content: Some(msg.content.clone()),
    }
}

fn classify_status(status: reqwest::StatusCode, message: &str) -> LlmError {
    match status.as_u16() {
        401 | 403 => LlmError::auth(format!("Authentication failed: {message}")),
        429 => LlmError::rate_limit(format!("Rate limit exceeded: {message}")),
        400 => LlmError::invalid_request(format!("Invalid request: {message}")),
        500..=599 => LlmError::server_error(format!("Server error: {message}")),
        _ => LlmError::unknown(format!("HTTP {status}: {message}")),
    }
}

#[async_trait]
impl LlmService for AzureOpenAIService {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        let chat_request = Self::translate_request(request);

        let response = self
            .client
            .post(&self.url)
            .header("api-key", &self.api_key)
            .json(&chat_request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::network(format!("Request timeout: {e}"))
                } else if e.is_connect() {
                    LlmError::network(format!("Connection failed: {e}"))
                } else {
                    LlmError::unknown(format!("Request failed: {e}"))
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| LlmError::network(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            if let Ok(error_resp) = serde_json::from_str::<ErrorResponse>(&body) {
                return Err(classify_status(status, &error_resp.error.message));
            }
            return Err(classify_status(status, &body));
        }

        let chat_response: ChatResponse = serde_json::from_str(&body).map_err(|e| {
            LlmError::malformed(format!("Failed to parse response: {e} - body: {body}"))
        })?;

        Self::normalize_response(chat_response)
    }

    fn model_id(&self) -> &str {
        &self.deployment
    }
}

// Azure OpenAI wire types

#[derive(Debug, Serialize)]
struct ChatRequest {
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
#[allow(clippy::struct_field_names)]
struct ChatUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}
