// ABOUTME: LLM provider abstraction layer for the meal-creation agents
// ABOUTME: Defines the provider contract for plain and schema-constrained chat completion
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Jarvis Contributors

//! # LLM Provider Service Provider Interface
//!
//! Every model call made by the workflow goes through [`LlmProvider`]. The
//! crate ships one real implementation, an OpenAI-compatible chat-completions
//! client that talks to the OpenAI cloud or to a local server (Ollama, vLLM).
//!
//! ## Key Concepts
//!
//! - **`LlmCapabilities`**: Bitflags describing provider features
//! - **`LlmProvider`**: Async trait for plain and structured completion
//! - **`OutputSchema`**: JSON schema the model output must conform to
//! - **`StructuredOutput`**: Types that can be generated under a schema
//!
//! ## Example: Using a Provider
//!
//! ```rust,no_run
//! use jarvis_core::llm::{ChatMessage, ChatRequest, LlmProvider};
//!
//! async fn example(provider: &dyn LlmProvider) {
//!     let messages = vec![
//!         ChatMessage::system("You are a chef."),
//!         ChatMessage::user("Suggest a winter soup."),
//!     ];
//!
//!     let request = ChatRequest::new(messages).with_model("gpt-5");
//!     let response = provider.complete(&request).await;
//! }
//! ```

mod openai_compatible;
pub mod prompts;
mod provider;
mod structured;

pub use openai_compatible::{OpenAiCompatibleConfig, OpenAiCompatibleProvider};
pub use provider::ChatProvider;
pub use structured::{generate_structured, output_schema, parse_structured, StructuredOutput};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::ReasoningEffort;
use crate::errors::AppError;

// ============================================================================
// Capability Flags
// ============================================================================

bitflags::bitflags! {
    /// LLM provider capability flags
    ///
    /// The workflow checks `STRUCTURED_OUTPUT` before relying on
    /// schema-constrained generation.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
    pub struct LlmCapabilities: u8 {
        /// Provider supports JSON mode output
        const JSON_MODE = 0b0000_0001;
        /// Provider supports system messages
        const SYSTEM_MESSAGES = 0b0000_0010;
        /// Provider accepts a JSON schema for the response
        const STRUCTURED_OUTPUT = 0b0000_0100;
        /// Provider honours a reasoning-effort hint
        const REASONING_EFFORT = 0b0000_1000;
    }
}

impl LlmCapabilities {
    /// Capabilities of a plain text provider
    #[must_use]
    pub const fn text_only() -> Self {
        Self::SYSTEM_MESSAGES
    }

    /// Capabilities of a provider that can run the whole workflow
    #[must_use]
    pub const fn full_featured() -> Self {
        Self::JSON_MODE
            .union(Self::SYSTEM_MESSAGES)
            .union(Self::STRUCTURED_OUTPUT)
            .union(Self::REASONING_EFFORT)
    }

    /// Check if JSON mode is supported
    #[must_use]
    pub const fn supports_json_mode(&self) -> bool {
        self.contains(Self::JSON_MODE)
    }

    /// Check if schema-constrained output is supported
    #[must_use]
    pub const fn supports_structured_output(&self) -> bool {
        self.contains(Self::STRUCTURED_OUTPUT)
    }

    /// Check if the reasoning-effort hint is honoured
    #[must_use]
    pub const fn supports_reasoning_effort(&self) -> bool {
        self.contains(Self::REASONING_EFFORT)
    }
}

// ============================================================================
// Message Types
// ============================================================================

/// Role of a message in the conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// System instruction message
    System,
    /// User input message
    User,
    /// Assistant response message
    Assistant,
}

impl MessageRole {
    /// Convert to string representation for API calls
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// A single message in a chat conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of the message sender
    pub role: MessageRole,
    /// Content of the message
    pub content: String,
}

impl ChatMessage {
    /// Create a new chat message
    #[must_use]
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Create a system message
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(MessageRole::System, content)
    }

    /// Create a user message
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Configuration for a chat completion request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Conversation messages
    pub messages: Vec<ChatMessage>,
    /// Model identifier (provider-specific)
    pub model: Option<String>,
    /// Reasoning-effort hint for reasoning models
    pub reasoning_effort: Option<ReasoningEffort>,
}

impl ChatRequest {
    /// Create a new chat request with messages
    #[must_use]
    pub const fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            model: None,
            reasoning_effort: None,
        }
    }

    /// Set the model to use
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the reasoning-effort hint
    #[must_use]
    pub const fn with_reasoning_effort(mut self, effort: ReasoningEffort) -> Self {
        self.reasoning_effort = Some(effort);
        self
    }

    /// Content of the last user message, if any
    #[must_use]
    pub fn last_user_message(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == MessageRole::User)
            .map(|m| m.content.as_str())
    }
}

/// Response from a chat completion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Generated message content
    pub content: String,
    /// Model used for generation
    pub model: String,
    /// Token usage statistics
    pub usage: Option<TokenUsage>,
    /// Finish reason (stop, length, etc.)
    pub finish_reason: Option<String>,
}

/// Token usage statistics
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Number of tokens in the prompt
    pub prompt_tokens: u32,
    /// Number of tokens in the completion
    pub completion_tokens: u32,
    /// Total tokens used
    pub total_tokens: u32,
}

/// Named JSON schema constraining a structured completion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputSchema {
    /// Schema name reported to the provider and in errors
    pub name: String,
    /// JSON Schema document
    pub schema: Value,
}

impl OutputSchema {
    /// Create a schema
    #[must_use]
    pub fn new(name: impl Into<String>, schema: Value) -> Self {
        Self {
            name: name.into(),
            schema,
        }
    }
}

/// Response from a structured completion: parsed JSON, not yet typed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredResponse {
    /// JSON value produced by the model
    pub value: Value,
    /// Model used for generation
    pub model: String,
    /// Token usage statistics
    pub usage: Option<TokenUsage>,
}

// ============================================================================
// Provider Trait
// ============================================================================

/// LLM provider trait for chat completion
///
/// The workflow only holds an `Arc<dyn LlmProvider>`, so tests can swap in a
/// scripted double without touching the pipeline.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Unique provider identifier (e.g., "openai", "local")
    fn name(&self) -> &'static str;

    /// Human-readable display name for the provider
    fn display_name(&self) -> &'static str;

    /// Provider capabilities
    fn capabilities(&self) -> LlmCapabilities;

    /// Default model to use if not specified in request
    fn default_model(&self) -> &str;

    /// Perform a plain chat completion
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, AppError>;

    /// Perform a completion whose output must be a JSON value under `schema`
    ///
    /// Implementations return `SchemaViolation` when the output is not JSON.
    /// Conformance of the JSON to the Rust type is checked by the caller.
    async fn complete_structured(
        &self,
        request: &ChatRequest,
        schema: &OutputSchema,
    ) -> Result<StructuredResponse, AppError>;

    /// Check if the provider is reachable and the API key is valid
    async fn health_check(&self) -> Result<bool, AppError>;
}
