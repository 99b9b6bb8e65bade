// ABOUTME: Environment-based pipeline configuration
// ABOUTME: Resolves provider, variant, household file and per-agent model settings from env vars
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Jarvis Contributors

use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::info;

use super::types::{Environment, LlmProviderType, PipelineVariant, ReasoningEffort};
use crate::constants::{env_vars, models};
use crate::errors::{AppError, AppResult, ErrorCode};

/// Model and reasoning effort for one agent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentModelConfig {
    /// Model identifier sent to the provider; `None` uses the provider's default model
    pub model: Option<String>,
    /// Reasoning-effort hint
    pub reasoning_effort: ReasoningEffort,
}

impl AgentModelConfig {
    /// Create a model configuration
    #[must_use]
    pub fn new(model: impl Into<String>, reasoning_effort: ReasoningEffort) -> Self {
        Self {
            model: Some(model.into()),
            reasoning_effort,
        }
    }

    /// Defer the model choice to the provider
    #[must_use]
    pub const fn provider_default(reasoning_effort: ReasoningEffort) -> Self {
        Self {
            model: None,
            reasoning_effort,
        }
    }

    /// Read `model_var` and `effort_var`, falling back to the given defaults
    ///
    /// A blank model variable keeps `default_model`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigInvalid` if the effort variable is set to an unknown value.
    pub fn from_env_or(
        model_var: &str,
        effort_var: &str,
        default_model: Option<&str>,
        default_effort: ReasoningEffort,
    ) -> AppResult<Self> {
        let model = env::var(model_var)
            .ok()
            .filter(|m| !m.trim().is_empty())
            .or_else(|| default_model.map(ToOwned::to_owned));

        let reasoning_effort = match env::var(effort_var) {
            Ok(raw) if !raw.trim().is_empty() => ReasoningEffort::parse(&raw).ok_or_else(|| {
                AppError::new(
                    ErrorCode::ConfigInvalid,
                    format!(
                        "{effort_var}='{raw}' is not a reasoning effort (minimal, low, medium, high)"
                    ),
                )
            })?,
            _ => default_effort,
        };

        Ok(Self {
            model,
            reasoning_effort,
        })
    }
}

/// Model settings for the three agents of the workflow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentsConfig {
    /// Chef: drafts and revises
    pub chef: AgentModelConfig,
    /// Sous chef: reviews
    pub sous_chef: AgentModelConfig,
    /// Formatter: converts to structured JSON
    pub formatter: AgentModelConfig,
}

impl Default for AgentsConfig {
    fn default() -> Self {
        Self::for_provider(LlmProviderType::OpenAi)
    }
}

impl AgentsConfig {
    /// Default agent settings for a provider
    ///
    /// `OpenAI` agents get their named models. Local agents leave the model
    /// unset so the server's configured model (`LOCAL_LLM_MODEL`) is used.
    #[must_use]
    pub fn for_provider(provider: LlmProviderType) -> Self {
        match provider {
            LlmProviderType::OpenAi => Self {
                chef: AgentModelConfig::new(models::DEFAULT_CHEF_MODEL, ReasoningEffort::High),
                sous_chef: AgentModelConfig::new(
                    models::DEFAULT_SOUS_CHEF_MODEL,
                    ReasoningEffort::Medium,
                ),
                formatter: AgentModelConfig::new(
                    models::DEFAULT_FORMATTER_MODEL,
                    ReasoningEffort::Low,
                ),
            },
            LlmProviderType::Local => Self {
                chef: AgentModelConfig::provider_default(ReasoningEffort::High),
                sous_chef: AgentModelConfig::provider_default(ReasoningEffort::Medium),
                formatter: AgentModelConfig::provider_default(ReasoningEffort::Low),
            },
        }
    }

    /// Load agent settings from environment variables over the provider's defaults
    ///
    /// # Errors
    ///
    /// Returns `ConfigInvalid` if a reasoning effort variable is malformed.
    pub fn from_env(provider: LlmProviderType) -> AppResult<Self> {
        let defaults = Self::for_provider(provider);
        Ok(Self {
            chef: AgentModelConfig::from_env_or(
                env_vars::CHEF_MODEL,
                env_vars::CHEF_REASONING,
                defaults.chef.model.as_deref(),
                defaults.chef.reasoning_effort,
            )?,
            sous_chef: AgentModelConfig::from_env_or(
                env_vars::SOUS_CHEF_MODEL,
                env_vars::SOUS_CHEF_REASONING,
                defaults.sous_chef.model.as_deref(),
                defaults.sous_chef.reasoning_effort,
            )?,
            formatter: AgentModelConfig::from_env_or(
                env_vars::FORMATTER_MODEL,
                env_vars::FORMATTER_REASONING,
                defaults.formatter.model.as_deref(),
                defaults.formatter.reasoning_effort,
            )?,
        })
    }
}

/// Complete pipeline configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PipelineConfig {
    /// Which provider serves the agents
    pub provider: LlmProviderType,
    /// Which workflow variant runs
    pub variant: PipelineVariant,
    /// Household reference file; the embedded household is used when `None`
    pub household_file: Option<PathBuf>,
    /// Per-agent model settings
    pub agents: AgentsConfig,
    /// Deployment environment
    pub environment: Environment,
}

impl PipelineConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns `ConfigInvalid` if an agent reasoning effort is malformed.
    pub fn from_env() -> AppResult<Self> {
        let provider = LlmProviderType::from_env();
        let config = Self {
            provider,
            variant: env::var(PipelineVariant::ENV_VAR)
                .map(|v| PipelineVariant::from_str_or_default(&v))
                .unwrap_or_default(),
            household_file: env::var(env_vars::HOUSEHOLD_FILE)
                .ok()
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
            agents: AgentsConfig::from_env(provider)?,
            environment: env::var(env_vars::ENVIRONMENT)
                .map(|e| Environment::from_str_or_default(&e))
                .unwrap_or_default(),
        };

        info!(
            provider = %config.provider,
            variant = %config.variant,
            household_file = ?config.household_file,
            chef_model = ?config.agents.chef.model,
            formatter_model = ?config.agents.formatter.model,
            "Pipeline configuration loaded"
        );

        Ok(config)
    }
}
