// ABOUTME: Named agents pairing a system prompt with a model and reasoning effort
// ABOUTME: Chef, sous chef and recipe formatter wrap the shared LLM provider for workflow steps
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Jarvis Contributors

//! # Agents
//!
//! An [`Agent`] is a system prompt bound to a model configuration. Workflow
//! steps talk to agents, never to the provider directly, so each step gets
//! the right model and reasoning effort without repeating it.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, warn};

use crate::config::{AgentModelConfig, AgentsConfig};
use crate::errors::{AppError, AppResult, ErrorCode};
use crate::llm::prompts::{CHEF_SYSTEM_PROMPT, FORMATTER_SYSTEM_PROMPT, SOUS_CHEF_SYSTEM_PROMPT};
use crate::llm::{generate_structured, ChatMessage, ChatRequest, LlmProvider, StructuredOutput};

/// A system prompt plus the model that runs it
#[derive(Clone)]
pub struct Agent {
    name: &'static str,
    instructions: &'static str,
    model: AgentModelConfig,
    provider: Arc<dyn LlmProvider>,
}

impl Agent {
    /// Create an agent
    #[must_use]
    pub fn new(
        name: &'static str,
        instructions: &'static str,
        model: AgentModelConfig,
        provider: Arc<dyn LlmProvider>,
    ) -> Self {
        Self {
            name,
            instructions,
            model,
            provider,
        }
    }

    /// Chef Jarvis: drafts and corrects recipes
    #[must_use]
    pub fn chef(model: AgentModelConfig, provider: Arc<dyn LlmProvider>) -> Self {
        Self::new("Chef Agent", CHEF_SYSTEM_PROMPT, model, provider)
    }

    /// Sous chef: reviews drafts
    #[must_use]
    pub fn sous_chef(model: AgentModelConfig, provider: Arc<dyn LlmProvider>) -> Self {
        Self::new("Sous Chef Agent", SOUS_CHEF_SYSTEM_PROMPT, model, provider)
    }

    /// Recipe formatter: converts text recipes to JSON
    #[must_use]
    pub fn recipe_formatter(model: AgentModelConfig, provider: Arc<dyn LlmProvider>) -> Self {
        Self::new(
            "Recipe Formatter Agent",
            FORMATTER_SYSTEM_PROMPT,
            model,
            provider,
        )
    }

    /// Agent name used in logs
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Model configuration
    #[must_use]
    pub const fn model(&self) -> &AgentModelConfig {
        &self.model
    }

    fn request(&self, prompt: &str) -> ChatRequest {
        ChatRequest {
            model: self.model.model.clone(),
            ..ChatRequest::new(vec![
                ChatMessage::system(self.instructions),
                ChatMessage::user(prompt),
            ])
        }
        .with_reasoning_effort(self.model.reasoning_effort)
    }

    /// Generate free text for `prompt`
    ///
    /// # Errors
    ///
    /// Propagates provider errors; an empty answer is an `ExternalServiceError`.
    pub async fn generate(&self, prompt: &str) -> AppResult<String> {
        let started = Instant::now();
        let response = self.provider.complete(&self.request(prompt)).await?;

        debug!(
            agent = self.name,
            model = %response.model,
            chars = response.content.len(),
            elapsed = ?started.elapsed(),
            "Agent generated text"
        );

        if response.content.trim().is_empty() {
            warn!(
                agent = self.name,
                finish_reason = ?response.finish_reason,
                "Agent returned an empty answer"
            );
            return Err(AppError::new(
                ErrorCode::ExternalServiceError,
                format!("{} returned an empty answer", self.name),
            ));
        }

        Ok(response.content)
    }

    /// Generate a value of `T` under its JSON schema
    ///
    /// # Errors
    ///
    /// Propagates provider errors; returns `SchemaViolation` for non-conforming output.
    pub async fn generate_object<T: StructuredOutput>(&self, prompt: &str) -> AppResult<T> {
        let started = Instant::now();
        let value = generate_structured::<T>(self.provider.as_ref(), &self.request(prompt)).await?;

        debug!(
            agent = self.name,
            schema = T::SCHEMA_NAME,
            elapsed = ?started.elapsed(),
            "Agent generated structured output"
        );

        Ok(value)
    }
}

impl fmt::Debug for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Agent")
            .field("name", &self.name)
            .field("model", &self.model)
            .field("provider", &self.provider.name())
            .finish_non_exhaustive()
    }
}

/// The three agents of the meal-creation workflow
#[derive(Debug, Clone)]
pub struct KitchenBrigade {
    /// Drafts and corrects
    pub chef: Agent,
    /// Reviews
    pub sous_chef: Agent,
    /// Formats
    pub formatter: Agent,
}

impl KitchenBrigade {
    /// Build every agent on one provider
    #[must_use]
    pub fn new(config: &AgentsConfig, provider: &Arc<dyn LlmProvider>) -> Self {
        Self {
            chef: Agent::chef(config.chef.clone(), Arc::clone(provider)),
            sous_chef: Agent::sous_chef(config.sous_chef.clone(), Arc::clone(provider)),
            formatter: Agent::recipe_formatter(config.formatter.clone(), Arc::clone(provider)),
        }
    }
}
