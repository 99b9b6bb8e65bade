// ABOUTME: Configuration management module for the meal creation pipeline
// ABOUTME: Exposes environment-driven pipeline settings and the typed enums they are built from
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Jarvis Contributors
//! Configuration module
//!
//! Configuration is environment-only: every setting has a `from_env`
//! constructor and a sensible default.

/// Environment-based pipeline configuration
pub mod environment;
/// Typed configuration enums
pub mod types;

pub use environment::{AgentModelConfig, AgentsConfig, PipelineConfig};
pub use types::{Environment, LlmProviderType, PipelineVariant, ReasoningEffort};
