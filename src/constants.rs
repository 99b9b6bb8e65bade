// ABOUTME: System-wide constants for the meal creation pipeline
// ABOUTME: Contains service names, environment variable names, model defaults and step identifiers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Jarvis Contributors

//! # Constants Module
//!
//! Names and defaults shared by the configuration layer, the agents and the
//! workflow driver.

/// Service names used in structured logs
pub mod service_names {
    /// Name reported by the pipeline in its startup record
    pub const JARVIS_CHEF: &str = "jarvis-chef";
    /// Crate target used for log filtering
    pub const LOG_TARGET: &str = "jarvis_core";
}

/// Environment variable names
pub mod env_vars {
    /// Optional YAML household file
    pub const HOUSEHOLD_FILE: &str = "JARVIS_HOUSEHOLD_FILE";
    /// Chef model identifier
    pub const CHEF_MODEL: &str = "JARVIS_CHEF_MODEL";
    /// Chef reasoning effort
    pub const CHEF_REASONING: &str = "JARVIS_CHEF_REASONING";
    /// Sous-chef model identifier
    pub const SOUS_CHEF_MODEL: &str = "JARVIS_SOUS_CHEF_MODEL";
    /// Sous-chef reasoning effort
    pub const SOUS_CHEF_REASONING: &str = "JARVIS_SOUS_CHEF_REASONING";
    /// Formatter model identifier
    pub const FORMATTER_MODEL: &str = "JARVIS_FORMATTER_MODEL";
    /// Formatter reasoning effort
    pub const FORMATTER_REASONING: &str = "JARVIS_FORMATTER_REASONING";
    /// Deployment environment
    pub const ENVIRONMENT: &str = "ENVIRONMENT";
}

/// Model defaults per agent
pub mod models {
    /// Chef drafts and revises recipes
    pub const DEFAULT_CHEF_MODEL: &str = "gpt-5";
    /// Sous chef reviews drafts
    pub const DEFAULT_SOUS_CHEF_MODEL: &str = "gpt-5";
    /// Formatter converts text recipes to JSON
    pub const DEFAULT_FORMATTER_MODEL: &str = "gpt-5-mini";
}

/// Workflow step identifiers, used in spans and error context
pub mod steps {
    /// Context validation
    pub const VALIDATE_CONTEXT: &str = "validate-context";
    /// Instruction composition
    pub const COMPOSE_INSTRUCTIONS: &str = "compose-instructions";
    /// Recipe drafting
    pub const CREATE_MEAL: &str = "create-meal";
    /// Sous-chef review
    pub const REVIEW_RECIPE: &str = "review-recipe";
    /// Conditional revision
    pub const CORRECT_RECIPE: &str = "correct-recipe";
    /// Structured formatting
    pub const RECIPE_TO_JSON: &str = "recipe-to-json";
}

/// Logging limits
pub mod logging {
    /// Maximum characters of a prompt echoed at debug level
    pub const MAX_PROMPT_LOG_CHARS: usize = 400;
    /// Maximum characters of a response body echoed in error logs
    pub const MAX_BODY_LOG_CHARS: usize = 500;
}
