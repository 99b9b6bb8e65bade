// ABOUTME: Core configuration type definitions for environment, provider and model settings
// ABOUTME: Contains Environment, LlmProviderType, ReasoningEffort and PipelineVariant enums
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Jarvis Contributors

use serde::{Deserialize, Serialize};
use std::env;
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Deployment environment
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Development environment (default)
    #[default]
    Development,
    /// Production environment
    Production,
    /// Testing environment for automated tests
    Testing,
}

impl Environment {
    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "testing" | "test" => Self::Testing,
            _ => Self::Development,
        }
    }

    /// Check if this is a production environment
    #[must_use]
    pub const fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

impl Display for Environment {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
            Self::Testing => write!(f, "testing"),
        }
    }
}

/// LLM provider selection
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LlmProviderType {
    /// `OpenAI` cloud API (default)
    #[default]
    OpenAi,
    /// Local `OpenAI`-compatible endpoint (Ollama, vLLM, `LocalAI`)
    Local,
}

impl LlmProviderType {
    /// Environment variable name for LLM provider selection
    pub const ENV_VAR: &'static str = "JARVIS_LLM_PROVIDER";

    /// Parse from string with fallback to default
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "local" | "ollama" | "vllm" | "localai" => Self::Local,
            _ => Self::OpenAi,
        }
    }

    /// Load from environment variable
    #[must_use]
    pub fn from_env() -> Self {
        env::var(Self::ENV_VAR)
            .map(|s| Self::from_str_or_default(&s))
            .unwrap_or_default()
    }
}

impl Display for LlmProviderType {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::OpenAi => write!(f, "openai"),
            Self::Local => write!(f, "local"),
        }
    }
}

/// Reasoning-effort hint forwarded to reasoning models
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReasoningEffort {
    /// Fastest, least deliberate
    Minimal,
    /// Light reasoning
    Low,
    /// Balanced (default)
    #[default]
    Medium,
    /// Most deliberate
    High,
}

impl ReasoningEffort {
    /// Wire representation used by the chat completions API
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Minimal => "minimal",
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    /// Parse from string, `None` when the value is not recognised
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "minimal" => Some(Self::Minimal),
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }
}

impl Display for ReasoningEffort {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// Which shape of the meal creation workflow to run
///
/// The two variants are alternative configurations of the same driver and are
/// never merged: `Reviewed` adds a sous-chef review with at most one revision,
/// `Direct` skips review but renders the household ingredient mandate and only
/// accepts eaters known to the household.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PipelineVariant {
    /// Draft, review, optional revision, format
    #[default]
    Reviewed,
    /// Draft, format
    Direct,
}

impl PipelineVariant {
    /// Environment variable name for variant selection
    pub const ENV_VAR: &'static str = "JARVIS_PIPELINE_VARIANT";

    /// Parse from string with fallback to default
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "direct" | "simple" => Self::Direct,
            _ => Self::Reviewed,
        }
    }

    /// Whether the review/revision stage runs
    #[must_use]
    pub const fn has_review(&self) -> bool {
        matches!(self, Self::Reviewed)
    }

    /// Whether eaters must exist in the household table
    #[must_use]
    pub const fn restricts_eaters(&self) -> bool {
        matches!(self, Self::Direct)
    }

    /// Whether the household ingredient mandate is rendered
    #[must_use]
    pub const fn renders_mandate(&self) -> bool {
        matches!(self, Self::Direct)
    }
}

impl Display for PipelineVariant {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Reviewed => write!(f, "reviewed"),
            Self::Direct => write!(f, "direct"),
        }
    }
}
