// ABOUTME: System prompts for the meal-creation agents loaded at compile time
// ABOUTME: Provides chef, sous chef and recipe formatter instructions
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Jarvis Contributors

//! # System Prompts
//!
//! Prompts are loaded at compile time from markdown files for easy maintenance.

/// Chef Jarvis: drafts and revises recipes
pub const CHEF_SYSTEM_PROMPT: &str = include_str!("chef_system.md");

/// Sous chef: reviews drafted recipes
pub const SOUS_CHEF_SYSTEM_PROMPT: &str = include_str!("sous_chef_system.md");

/// Recipe formatter: converts text recipes to JSON without changing them
pub const FORMATTER_SYSTEM_PROMPT: &str = include_str!("formatter_system.md");
