// ABOUTME: Unified LLM provider selector for runtime provider switching
// ABOUTME: Chooses the OpenAI cloud or a local OpenAI-compatible server from configuration
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Jarvis Contributors

//! # LLM Provider Selector
//!
//! Set `JARVIS_LLM_PROVIDER`:
//! - `openai` (default): the `OpenAI` cloud (requires `OPENAI_API_KEY`)
//! - `local`: a local `OpenAI`-compatible server (Ollama, vLLM, `LocalAI`)
//!
//! ## Example
//!
//! ```rust,no_run
//! use jarvis_core::llm::{ChatMessage, ChatProvider, ChatRequest, LlmProvider};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), jarvis_core::errors::AppError> {
//!     let provider = ChatProvider::from_env()?;
//!     let request = ChatRequest::new(vec![ChatMessage::user("Hello!")]);
//!     let response = provider.complete(&request).await?;
//!     println!("{}", response.content);
//!     Ok(())
//! }
//! ```

use std::fmt;

use async_trait::async_trait;
use tracing::{debug, info};

use super::{
    ChatRequest, ChatResponse, LlmCapabilities, LlmProvider, OpenAiCompatibleProvider,
    OutputSchema, StructuredResponse,
};
use crate::config::LlmProviderType;
use crate::errors::AppError;

/// Unified chat provider wrapping the configured backend
pub enum ChatProvider {
    /// `OpenAI` cloud
    OpenAi(OpenAiCompatibleProvider),
    /// Local LLM provider via `OpenAI`-compatible API (Ollama, vLLM, `LocalAI`)
    Local(OpenAiCompatibleProvider),
}

impl ChatProvider {
    /// Create a provider from environment configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the required API key is missing or the HTTP
    /// client cannot be built.
    pub fn from_env() -> Result<Self, AppError> {
        Self::for_type(LlmProviderType::from_env())
    }

    /// Create a provider for a specific type
    ///
    /// # Errors
    ///
    /// Same as [`ChatProvider::from_env`].
    pub fn for_type(provider_type: LlmProviderType) -> Result<Self, AppError> {
        info!(
            "Initializing LLM provider: {} (set {} to change)",
            provider_type,
            LlmProviderType::ENV_VAR
        );

        let provider = match provider_type {
            LlmProviderType::OpenAi => Self::OpenAi(OpenAiCompatibleProvider::from_env(
                LlmProviderType::OpenAi,
            )?),
            LlmProviderType::Local => Self::Local(OpenAiCompatibleProvider::from_env(
                LlmProviderType::Local,
            )?),
        };

        debug!(
            "Provider {} initialized with model: {}",
            provider.display_name(),
            provider.default_model()
        );
        Ok(provider)
    }

    /// Which backend this provider talks to
    #[must_use]
    pub const fn provider_type(&self) -> LlmProviderType {
        match self {
            Self::OpenAi(_) => LlmProviderType::OpenAi,
            Self::Local(_) => LlmProviderType::Local,
        }
    }

    const fn inner(&self) -> &OpenAiCompatibleProvider {
        match self {
            Self::OpenAi(p) | Self::Local(p) => p,
        }
    }
}

impl fmt::Debug for ChatProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OpenAi(_) => f.debug_tuple("ChatProvider::OpenAi").finish(),
            Self::Local(_) => f.debug_tuple("ChatProvider::Local").finish(),
        }
    }
}

// Implement LlmProvider trait for ChatProvider to enable trait object usage
#[async_trait]
impl LlmProvider for ChatProvider {
    fn name(&self) -> &'static str {
        self.inner().name()
    }

    fn display_name(&self) -> &'static str {
        self.inner().display_name()
    }

    fn capabilities(&self) -> LlmCapabilities {
        self.inner().capabilities()
    }

    fn default_model(&self) -> &str {
        self.inner().default_model()
    }

    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, AppError> {
        self.inner().complete(request).await
    }

    async fn complete_structured(
        &self,
        request: &ChatRequest,
        schema: &OutputSchema,
    ) -> Result<StructuredResponse, AppError> {
        self.inner().complete_structured(request, schema).await
    }

    async fn health_check(&self) -> Result<bool, AppError> {
        self.inner().health_check().await
    }
}
