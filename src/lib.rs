// ABOUTME: Main library entry point for the Jarvis meal-creation pipeline
// ABOUTME: Turns a meal context into a validated recipe through chef, sous chef and formatter agents
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Jarvis Contributors

// Crate-level attributes:
// - deny(unsafe_code): Zero-tolerance unsafe policy
#![deny(unsafe_code)]

//! # Jarvis Core
//!
//! A linear, LLM-driven pipeline that creates a family meal: the caller
//! describes the meal (time of day, who eats, complexity, duration), the
//! crate composes a brief from household knowledge, asks a chef model for a
//! recipe, optionally has it reviewed and corrected once, and returns the
//! recipe as a schema-validated JSON object.
//!
//! ## Architecture
//!
//! - **Meal**: context validation, household data, instruction composition, recipe schemas
//! - **LLM**: provider trait and the `OpenAI`-compatible client
//! - **Agents**: chef, sous chef and formatter bound to their models
//! - **Workflow**: the pipeline driver
//! - **Config**: environment-based configuration
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use jarvis_core::config::PipelineConfig;
//! use jarvis_core::errors::AppResult;
//! use jarvis_core::meal::MealContextInput;
//! use jarvis_core::workflow::MealCreationWorkflow;
//!
//! #[tokio::main]
//! async fn main() -> AppResult<()> {
//!     let config = PipelineConfig::from_env()?;
//!     let workflow = MealCreationWorkflow::from_config(&config).await?;
//!
//!     let input = MealContextInput {
//!         time_of_day: Some("dinner".into()),
//!         eaters: Some(vec!["Marie".into()]),
//!         complexity: Some("easy".into()),
//!         duration: Some("short".into()),
//!         ..Default::default()
//!     };
//!     let recipe = workflow.run(&input).await?;
//!     println!("{} ({} servings)", recipe.name, recipe.servings);
//!     Ok(())
//! }
//! ```

/// Chef, sous chef and formatter agents
pub mod agents;

/// Environment-based configuration
pub mod config;

/// Application constants
pub mod constants;

/// Unified error handling
pub mod errors;

/// LLM provider abstraction and the `OpenAI`-compatible client
pub mod llm;

/// Logging configuration and pipeline log records
pub mod logging;

/// Meal domain: context, household, instructions, recipe
pub mod meal;

/// Test utilities shared by unit and integration tests
pub mod test_utils;

/// Meal-creation workflow driver
pub mod workflow;
