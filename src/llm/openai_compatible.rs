// ABOUTME: OpenAI-compatible chat-completions provider for the OpenAI cloud and local servers
// ABOUTME: Supports plain completion and json_schema-constrained completion with reasoning hints
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Jarvis Contributors

//! # `OpenAI`-Compatible Provider
//!
//! One implementation for every endpoint that speaks the `OpenAI` chat
//! completions API: the `OpenAI` cloud itself, Ollama, vLLM, `LocalAI`.
//!
//! ## Configuration
//!
//! `JARVIS_LLM_PROVIDER=openai` (default):
//! - `OPENAI_API_KEY`: API key (required)
//! - `OPENAI_BASE_URL`: Base URL (default: <https://api.openai.com/v1>)
//!
//! `JARVIS_LLM_PROVIDER=local`:
//! - `LOCAL_LLM_BASE_URL`: Base URL (default: <http://localhost:11434/v1> for Ollama)
//! - `LOCAL_LLM_MODEL`: Fallback model (default: `qwen2.5:14b-instruct`)
//! - `LOCAL_LLM_API_KEY`: API key (optional, empty for local servers)
//!
//! ## Structured output
//!
//! Providers with `STRUCTURED_OUTPUT` receive `response_format: json_schema`.
//! Providers with only `JSON_MODE` receive `response_format: json_object`
//! plus the schema as an extra system message.
//!
//! ## Example
//!
//! ```rust,no_run
//! use jarvis_core::config::LlmProviderType;
//! use jarvis_core::llm::{ChatMessage, ChatRequest, LlmProvider, OpenAiCompatibleProvider};
//! use jarvis_core::errors::AppError;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), AppError> {
//!     let provider = OpenAiCompatibleProvider::from_env(LlmProviderType::Local)?;
//!     let request = ChatRequest::new(vec![ChatMessage::user("Name a French stew.")]);
//!     let response = provider.complete(&request).await?;
//!     println!("{}", response.content);
//!     Ok(())
//! }
//! ```

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::env;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};

use super::{
    ChatMessage, ChatRequest, ChatResponse, LlmCapabilities, LlmProvider, OutputSchema,
    StructuredResponse, TokenUsage,
};
use crate::config::LlmProviderType;
use crate::constants::logging::{MAX_BODY_LOG_CHARS, MAX_PROMPT_LOG_CHARS};
use crate::errors::{AppError, AppResult, ErrorCode};

// ============================================================================
// Configuration Constants
// ============================================================================

/// Environment variable for the `OpenAI` API key
const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Environment variable overriding the `OpenAI` base URL
const OPENAI_BASE_URL_ENV: &str = "OPENAI_BASE_URL";

/// Environment variable for local LLM base URL
const LOCAL_LLM_BASE_URL_ENV: &str = "LOCAL_LLM_BASE_URL";

/// Environment variable for local LLM model
const LOCAL_LLM_MODEL_ENV: &str = "LOCAL_LLM_MODEL";

/// Environment variable for local LLM API key (optional)
const LOCAL_LLM_API_KEY_ENV: &str = "LOCAL_LLM_API_KEY";

/// `OpenAI` cloud base URL
const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Default base URL for local inference (Ollama)
const DEFAULT_LOCAL_BASE_URL: &str = "http://localhost:11434/v1";

/// Default model for local inference
const DEFAULT_LOCAL_MODEL: &str = "qwen2.5:14b-instruct";

/// Connection timeout
const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Request timeout (reasoning models and local inference can be slow)
const REQUEST_TIMEOUT_SECS: u64 = 300;

// ============================================================================
// API Request/Response Types (OpenAI-compatible format)
// ============================================================================

/// OpenAI-compatible API request structure
#[derive(Debug, Serialize)]
struct OpenAiRequest<'a> {
    model: &'a str,
    messages: Vec<OpenAiMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reasoning_effort: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat<'a>>,
}

/// `response_format` field
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ResponseFormat<'a> {
    JsonSchema { json_schema: JsonSchemaSpec<'a> },
    JsonObject,
}

/// Named schema inside `response_format`
///
/// `strict` stays off: strict mode rejects optional properties, which the
/// recipe schema relies on.
#[derive(Debug, Serialize)]
struct JsonSchemaSpec<'a> {
    name: &'a str,
    schema: &'a Value,
    strict: bool,
}

/// Message structure for OpenAI-compatible API
#[derive(Debug, Clone, Serialize, Deserialize)]
struct OpenAiMessage {
    role: String,
    content: String,
}

impl From<&ChatMessage> for OpenAiMessage {
    fn from(msg: &ChatMessage) -> Self {
        Self {
            role: msg.role.as_str().to_owned(),
            content: msg.content.clone(),
        }
    }
}

/// OpenAI-compatible API response structure
#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
    #[serde(default)]
    usage: Option<OpenAiUsage>,
    model: String,
}

/// Choice in response
#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiResponseMessage,
    finish_reason: Option<String>,
}

/// Message in response
#[derive(Debug, Deserialize)]
struct OpenAiResponseMessage {
    content: Option<String>,
    #[serde(default)]
    refusal: Option<String>,
}

/// Usage statistics in response
#[derive(Debug, Deserialize)]
struct OpenAiUsage {
    #[serde(rename = "prompt_tokens")]
    prompt: u32,
    #[serde(rename = "completion_tokens")]
    completion: u32,
    #[serde(rename = "total_tokens")]
    total: u32,
}

impl From<OpenAiUsage> for TokenUsage {
    fn from(u: OpenAiUsage) -> Self {
        Self {
            prompt_tokens: u.prompt,
            completion_tokens: u.completion,
            total_tokens: u.total,
        }
    }
}

/// Error response structure
#[derive(Debug, Deserialize)]
struct OpenAiErrorResponse {
    error: OpenAiErrorDetail,
}

/// Error detail structure
#[derive(Debug, Deserialize)]
struct OpenAiErrorDetail {
    message: String,
    #[serde(rename = "type")]
    error_type: Option<String>,
}

// ============================================================================
// Provider Configuration
// ============================================================================

/// Configuration for the `OpenAI`-compatible provider
#[derive(Debug, Clone)]
pub struct OpenAiCompatibleConfig {
    /// Base URL for the API (e.g., <http://localhost:11434/v1>)
    pub base_url: String,
    /// API key (optional for local servers)
    pub api_key: Option<String>,
    /// Model used when a request names none
    pub default_model: String,
    /// Provider identifier for logging
    pub provider_name: &'static str,
    /// Provider display name
    pub display_name: &'static str,
    /// Capabilities of this provider
    pub capabilities: LlmCapabilities,
}

impl OpenAiCompatibleConfig {
    /// Create configuration for the `OpenAI` cloud
    #[must_use]
    pub fn openai(api_key: impl Into<String>) -> Self {
        Self {
            base_url: OPENAI_BASE_URL.to_owned(),
            api_key: Some(api_key.into()),
            default_model: crate::constants::models::DEFAULT_CHEF_MODEL.to_owned(),
            provider_name: "openai",
            display_name: "OpenAI",
            capabilities: LlmCapabilities::full_featured(),
        }
    }

    /// Create configuration for a local Ollama instance
    #[must_use]
    pub fn ollama(model: &str) -> Self {
        Self {
            base_url: DEFAULT_LOCAL_BASE_URL.to_owned(),
            api_key: None,
            default_model: model.to_owned(),
            provider_name: "ollama",
            display_name: "Ollama (Local)",
            capabilities: Self::local_capabilities(),
        }
    }

    /// Create configuration for a local vLLM instance
    #[must_use]
    pub fn vllm(model: &str) -> Self {
        Self {
            base_url: "http://localhost:8000/v1".to_owned(),
            api_key: None,
            default_model: model.to_owned(),
            provider_name: "vllm",
            display_name: "vLLM (Local)",
            capabilities: Self::local_capabilities(),
        }
    }

    /// Point the configuration at another base URL
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Override the capabilities
    #[must_use]
    pub const fn with_capabilities(mut self, capabilities: LlmCapabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Resolve configuration for `provider` from environment variables
    ///
    /// # Errors
    ///
    /// Returns `ConfigMissing` if `OPENAI_API_KEY` is unset for the `OpenAI` provider.
    pub fn from_env(provider: LlmProviderType) -> AppResult<Self> {
        match provider {
            LlmProviderType::OpenAi => {
                let api_key = env::var(OPENAI_API_KEY_ENV)
                    .ok()
                    .filter(|k| !k.trim().is_empty())
                    .ok_or_else(|| {
                        AppError::new(
                            ErrorCode::ConfigMissing,
                            format!("{OPENAI_API_KEY_ENV} must be set to use the OpenAI provider"),
                        )
                    })?;
                let base_url = env::var(OPENAI_BASE_URL_ENV)
                    .ok()
                    .filter(|u| !u.trim().is_empty())
                    .unwrap_or_else(|| OPENAI_BASE_URL.to_owned());
                Ok(Self::openai(api_key).with_base_url(base_url))
            }
            LlmProviderType::Local => {
                let base_url = env::var(LOCAL_LLM_BASE_URL_ENV)
                    .ok()
                    .filter(|u| !u.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_LOCAL_BASE_URL.to_owned());
                let default_model = env::var(LOCAL_LLM_MODEL_ENV)
                    .ok()
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_LOCAL_MODEL.to_owned());
                let api_key = env::var(LOCAL_LLM_API_KEY_ENV)
                    .ok()
                    .filter(|k| !k.is_empty());

                // Detect provider type from URL for better display names
                let (provider_name, display_name) = if base_url.contains(":11434") {
                    ("ollama", "Ollama (Local)")
                } else if base_url.contains(":8000") {
                    ("vllm", "vLLM (Local)")
                } else if base_url.contains(":8080") {
                    ("localai", "LocalAI")
                } else {
                    ("local", "Local LLM")
                };

                Ok(Self {
                    base_url,
                    api_key,
                    default_model,
                    provider_name,
                    display_name,
                    capabilities: Self::local_capabilities(),
                })
            }
        }
    }

    const fn local_capabilities() -> LlmCapabilities {
        LlmCapabilities::SYSTEM_MESSAGES
            .union(LlmCapabilities::JSON_MODE)
            .union(LlmCapabilities::STRUCTURED_OUTPUT)
    }
}

impl Default for OpenAiCompatibleConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_LOCAL_BASE_URL.to_owned(),
            api_key: None,
            default_model: DEFAULT_LOCAL_MODEL.to_owned(),
            provider_name: "local",
            display_name: "Local LLM",
            capabilities: Self::local_capabilities(),
        }
    }
}

// ============================================================================
// Provider Implementation
// ============================================================================

/// Generic `OpenAI`-compatible LLM provider
///
/// Works with any endpoint that implements the `OpenAI` chat completions API.
pub struct OpenAiCompatibleProvider {
    client: Client,
    config: OpenAiCompatibleConfig,
}

impl OpenAiCompatibleProvider {
    /// Create a new provider with the given configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: OpenAiCompatibleConfig) -> AppResult<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| AppError::internal(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    /// Create a provider from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if configuration is missing or the HTTP client cannot be created.
    pub fn from_env(provider: LlmProviderType) -> AppResult<Self> {
        let config = OpenAiCompatibleConfig::from_env(provider)?;

        info!(
            provider = config.provider_name,
            base_url = %config.base_url,
            default_model = %config.default_model,
            "Initializing {} provider",
            config.display_name
        );

        Self::new(config)
    }

    /// Build the API URL for a given endpoint
    fn api_url(&self, endpoint: &str) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            endpoint
        )
    }

    /// Convert internal messages to `OpenAI` format
    fn convert_messages(messages: &[ChatMessage]) -> Vec<OpenAiMessage> {
        messages.iter().map(OpenAiMessage::from).collect()
    }

    /// Log message details for debugging LLM interactions
    fn log_messages_debug(messages: &[OpenAiMessage], provider_name: &str, structured: bool) {
        for (i, msg) in messages.iter().enumerate() {
            debug!(
                "Message[{i}] role={}, content_len={}",
                msg.role,
                msg.content.len()
            );
            debug!(
                "Message[{i}] preview: {}...",
                msg.content
                    .chars()
                    .take(MAX_PROMPT_LOG_CHARS)
                    .collect::<String>()
            );
        }
        debug!(
            "Sending chat completion request to {provider_name} with {} messages, structured={structured}",
            messages.len()
        );
    }

    /// Build the wire request for `request`
    fn build_request<'a>(
        &'a self,
        request: &'a ChatRequest,
        schema: Option<&'a OutputSchema>,
    ) -> OpenAiRequest<'a> {
        let caps = self.config.capabilities;
        let mut messages = Self::convert_messages(&request.messages);

        let response_format = schema.map(|schema| {
            if caps.supports_structured_output() {
                ResponseFormat::JsonSchema {
                    json_schema: JsonSchemaSpec {
                        name: &schema.name,
                        schema: &schema.schema,
                        strict: false,
                    },
                }
            } else {
                messages.push(OpenAiMessage {
                    role: "system".to_owned(),
                    content: format!(
                        "Answer with a single JSON object conforming to this JSON schema:\n{}",
                        schema.schema
                    ),
                });
                ResponseFormat::JsonObject
            }
        });

        let reasoning_effort = request
            .reasoning_effort
            .filter(|_| caps.supports_reasoning_effort())
            .map(|e| e.as_str());

        OpenAiRequest {
            model: request
                .model
                .as_deref()
                .unwrap_or(&self.config.default_model),
            messages,
            reasoning_effort,
            response_format,
        }
    }

    /// Map a transport failure onto the external-call error codes
    fn map_send_error(&self, e: &reqwest::Error) -> AppError {
        error!(
            "Failed to send request to {}: {}",
            self.config.provider_name, e
        );
        if e.is_timeout() {
            AppError::new(
                ErrorCode::ExternalServiceUnavailable,
                format!("{} did not answer in time", self.config.display_name),
            )
        } else if e.is_connect() {
            AppError::new(
                ErrorCode::ExternalServiceUnavailable,
                format!(
                    "Cannot connect to {}. Is the server running at {}?",
                    self.config.display_name, self.config.base_url
                ),
            )
        } else {
            AppError::external_service(self.config.display_name, format!("Failed to connect: {e}"))
        }
    }

    /// Parse error response from API
    fn parse_error_response(&self, status: StatusCode, body: &str) -> AppError {
        let service = self.config.display_name;
        if let Ok(error_response) = serde_json::from_str::<OpenAiErrorResponse>(body) {
            let error_type = error_response
                .error
                .error_type
                .unwrap_or_else(|| "unknown".to_owned());

            match status.as_u16() {
                401 | 403 => AppError::new(
                    ErrorCode::ExternalAuthFailed,
                    format!(
                        "API authentication failed: {}",
                        error_response.error.message
                    ),
                ),
                429 => AppError::new(
                    ErrorCode::ExternalRateLimited,
                    Self::extract_rate_limit_message(&error_response.error.message),
                ),
                404 => AppError::external_service(
                    service,
                    format!(
                        "Model or endpoint not found: {}",
                        error_response.error.message
                    ),
                ),
                502..=504 => AppError::new(
                    ErrorCode::ExternalServiceUnavailable,
                    format!("{service} unavailable: {}", error_response.error.message),
                ),
                _ => AppError::external_service(
                    service,
                    format!("{} - {}", error_type, error_response.error.message),
                ),
            }
        } else {
            // Handle non-JSON error responses (common with local servers)
            match status.as_u16() {
                401 | 403 => AppError::new(
                    ErrorCode::ExternalAuthFailed,
                    format!("API authentication failed ({status})"),
                ),
                429 => AppError::new(
                    ErrorCode::ExternalRateLimited,
                    Self::extract_rate_limit_message(body),
                ),
                502..=504 => AppError::new(
                    ErrorCode::ExternalServiceUnavailable,
                    format!("{service} is not responding ({status})"),
                ),
                _ => AppError::external_service(
                    service,
                    format!(
                        "API error ({}): {}",
                        status,
                        body.chars().take(200).collect::<String>()
                    ),
                ),
            }
        }
    }

    /// Extract a user-friendly rate limit message from an OpenAI-style error
    fn extract_rate_limit_message(message: &str) -> String {
        let lower = message.to_lowercase();
        if let Some(retry_pos) = lower.find("try again in ") {
            let after_prefix = &lower[retry_pos + 13..];
            if let Some(end_pos) = after_prefix.find(|c: char| !c.is_ascii_digit() && c != '.') {
                if let Ok(seconds) = after_prefix[..end_pos].parse::<f64>() {
                    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                    let seconds_int = seconds.ceil() as u64;
                    return format!(
                        "LLM rate limit reached. Please try again in {seconds_int} seconds."
                    );
                }
            }
        }
        "LLM rate limit reached. Please wait a moment and try again.".to_owned()
    }

    /// Add authorization header if API key is configured
    fn add_auth_header(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if let Some(ref api_key) = self.config.api_key {
            request.header("Authorization", format!("Bearer {api_key}"))
        } else {
            request
        }
    }

    /// POST a chat completion and return the first choice
    async fn send_chat(
        &self,
        openai_request: &OpenAiRequest<'_>,
    ) -> AppResult<(OpenAiChoice, String, Option<TokenUsage>)> {
        Self::log_messages_debug(
            &openai_request.messages,
            self.config.provider_name,
            openai_request.response_format.is_some(),
        );

        let http_request = self
            .client
            .post(self.api_url("chat/completions"))
            .header("Content-Type", "application/json")
            .json(openai_request);

        let response = self
            .add_auth_header(http_request)
            .send()
            .await
            .map_err(|e| self.map_send_error(&e).with_source(e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            error!("Failed to read API response: {}", e);
            AppError::external_service(
                self.config.display_name,
                format!("Failed to read response: {e}"),
            )
        })?;

        if !status.is_success() {
            warn!(
                provider = self.config.provider_name,
                status = %status,
                "Chat completion rejected"
            );
            return Err(self.parse_error_response(status, &body));
        }

        let openai_response: OpenAiResponse = serde_json::from_str(&body).map_err(|e| {
            error!(
                "Failed to parse API response: {} - body: {}",
                e,
                body.chars().take(MAX_BODY_LOG_CHARS).collect::<String>()
            );
            AppError::external_service(
                self.config.display_name,
                format!("Failed to parse response: {e}"),
            )
        })?;

        let choice = openai_response.choices.into_iter().next().ok_or_else(|| {
            AppError::external_service(self.config.display_name, "API returned no choices")
        })?;

        if let Some(refusal) = choice.message.refusal.as_deref() {
            warn!(provider = self.config.provider_name, "Model refused the request");
            return Err(AppError::external_service(
                self.config.display_name,
                format!("Model refused the request: {refusal}"),
            ));
        }

        Ok((
            choice,
            openai_response.model,
            openai_response.usage.map(TokenUsage::from),
        ))
    }
}

/// Strip a Markdown code fence some local models wrap around JSON
fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .map_or(trimmed, str::trim)
}

#[async_trait]
impl LlmProvider for OpenAiCompatibleProvider {
    fn name(&self) -> &'static str {
        self.config.provider_name
    }

    fn display_name(&self) -> &'static str {
        self.config.display_name
    }

    fn capabilities(&self) -> LlmCapabilities {
        self.config.capabilities
    }

    fn default_model(&self) -> &str {
        &self.config.default_model
    }

    #[instrument(skip(self, request), fields(model = %request.model.as_deref().unwrap_or(&self.config.default_model)))]
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, AppError> {
        let openai_request = self.build_request(request, None);
        let (choice, model, usage) = self.send_chat(&openai_request).await?;

        let content = choice.message.content.unwrap_or_default();

        debug!(
            "Received response from {}: {} chars, finish_reason: {:?}",
            self.config.provider_name,
            content.len(),
            choice.finish_reason
        );

        Ok(ChatResponse {
            content,
            model,
            usage,
            finish_reason: choice.finish_reason,
        })
    }

    #[instrument(skip(self, request, schema), fields(schema = %schema.name, model = %request.model.as_deref().unwrap_or(&self.config.default_model)))]
    async fn complete_structured(
        &self,
        request: &ChatRequest,
        schema: &OutputSchema,
    ) -> Result<StructuredResponse, AppError> {
        let openai_request = self.build_request(request, Some(schema));
        let (choice, model, usage) = self.send_chat(&openai_request).await?;

        let content = choice.message.content.unwrap_or_default();
        if content.trim().is_empty() {
            return Err(AppError::schema_violation(
                &schema.name,
                format!(
                    "model returned no content (finish_reason: {})",
                    choice.finish_reason.as_deref().unwrap_or("unknown")
                ),
            ));
        }

        let value: Value = serde_json::from_str(strip_code_fence(&content)).map_err(|e| {
            warn!(
                schema = %schema.name,
                preview = %content.chars().take(MAX_BODY_LOG_CHARS).collect::<String>(),
                "Structured output is not valid JSON"
            );
            AppError::schema_violation(&schema.name, format!("output is not valid JSON: {e}"))
                .with_source(e)
        })?;

        debug!(
            "Received structured response from {} for schema {}",
            self.config.provider_name, schema.name
        );

        Ok(StructuredResponse {
            value,
            model,
            usage,
        })
    }

    #[instrument(skip(self))]
    async fn health_check(&self) -> Result<bool, AppError> {
        debug!(
            "Performing {} health check at {}",
            self.config.provider_name, self.config.base_url
        );

        // The models endpoint is the cheapest authenticated call
        let http_request = self.client.get(self.api_url("models"));

        let response = self
            .add_auth_header(http_request)
            .send()
            .await
            .map_err(|e| self.map_send_error(&e).with_source(e))?;

        let healthy = response.status().is_success();

        if healthy {
            debug!("{} health check passed", self.config.provider_name);
        } else {
            warn!(
                "{} health check failed with status: {}",
                self.config.provider_name,
                response.status()
            );
        }

        Ok(healthy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReasoningEffort;
    use serde_json::json;

    fn provider(capabilities: LlmCapabilities) -> OpenAiCompatibleProvider {
        OpenAiCompatibleProvider::new(
            OpenAiCompatibleConfig::openai("sk-test").with_capabilities(capabilities),
        )
        .unwrap()
    }

    #[test]
    fn test_structured_request_uses_json_schema() {
        let provider = provider(LlmCapabilities::full_featured());
        let request = ChatRequest::new(vec![ChatMessage::user("hi")])
            .with_model("gpt-5-mini")
            .with_reasoning_effort(ReasoningEffort::Low);
        let schema = OutputSchema::new("Thing", json!({ "type": "object" }));

        let wire = serde_json::to_value(provider.build_request(&request, Some(&schema))).unwrap();
        assert_eq!(wire["model"], "gpt-5-mini");
        assert_eq!(wire["reasoning_effort"], "low");
        assert_eq!(wire["response_format"]["type"], "json_schema");
        assert_eq!(wire["response_format"]["json_schema"]["name"], "Thing");
        assert_eq!(wire["response_format"]["json_schema"]["strict"], false);
        assert_eq!(wire["messages"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_json_mode_fallback_adds_schema_message() {
        let provider = provider(LlmCapabilities::SYSTEM_MESSAGES | LlmCapabilities::JSON_MODE);
        let request = ChatRequest::new(vec![ChatMessage::user("hi")])
            .with_reasoning_effort(ReasoningEffort::High);
        let schema = OutputSchema::new("Thing", json!({ "type": "object" }));

        let wire = serde_json::to_value(provider.build_request(&request, Some(&schema))).unwrap();
        assert_eq!(wire["response_format"], json!({ "type": "json_object" }));
        assert!(wire.get("reasoning_effort").is_none());
        assert_eq!(wire["messages"].as_array().unwrap().len(), 2);
        assert_eq!(wire["model"], "gpt-5");
    }

    #[test]
    fn test_plain_request_has_no_response_format() {
        let provider = provider(LlmCapabilities::full_featured());
        let request = ChatRequest::new(vec![ChatMessage::user("hi")]);
        let wire = serde_json::to_value(provider.build_request(&request, None)).unwrap();
        assert!(wire.get("response_format").is_none());
        // No model on the request: the configured default is sent
        assert_eq!(wire["model"], "gpt-5");
    }

    #[test]
    fn test_strip_code_fence() {
        assert_eq!(strip_code_fence("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("  {\"a\":1} "), "{\"a\":1}");
    }

    #[test]
    fn test_rate_limit_message() {
        let msg = OpenAiCompatibleProvider::extract_rate_limit_message(
            "Rate limit reached. Please try again in 1.5s.",
        );
        assert!(msg.contains("2 seconds"));
    }
}
