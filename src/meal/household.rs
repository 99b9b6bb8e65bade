// ABOUTME: Household reference data: family info and per-eater profiles with exclusion lists
// ABOUTME: Loaded from YAML (embedded default or a configured file) and injected into the pipeline
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Jarvis Contributors

//! # Household Reference Data
//!
//! The household is static, hand-authored data: who may eat, what each person
//! likes or refuses, and the family-wide asks. It is read-only for the whole
//! lifetime of a workflow and shared between runs.
//!
//! ```rust
//! use jarvis_core::meal::Household;
//!
//! let household = Household::embedded().unwrap();
//! assert!(household.member("marie").is_some());
//! ```

use std::io::ErrorKind;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{debug, info};

use crate::config::PipelineConfig;
use crate::errors::{AppError, AppResult, ErrorCode};

/// Household shipped with the crate
const EMBEDDED_HOUSEHOLD_YAML: &str = include_str!("household.yaml");

/// Static profile of one person who may be eating
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EaterProfile {
    /// Identifier used in meal contexts (matched case-insensitively)
    pub name: String,
    /// Free-text preferences and restrictions, rendered verbatim
    #[serde(default)]
    pub notes: String,
    /// Ingredients this person must never be served
    #[serde(default)]
    pub exclusions: Vec<String>,
}

/// Family-wide reference record set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Household {
    /// Family name used in prompts
    pub family_name: String,
    /// Default country (units, habits)
    pub country: String,
    /// Default recipe language
    pub language: String,
    /// What the family asks of every meal
    pub global_ask: String,
    /// Skill level of the family cook
    pub cook_level: String,
    /// Fixed ingredient rule rendered by the direct workflow
    #[serde(default)]
    pub ingredient_mandate: Option<String>,
    /// Everyone who may be eating
    pub members: Vec<EaterProfile>,
}

impl Household {
    /// Household embedded in the crate (the Lacoste family)
    ///
    /// # Errors
    ///
    /// Returns `ConfigInvalid` if the embedded YAML does not parse, which
    /// would be a packaging defect.
    pub fn embedded() -> AppResult<Self> {
        Self::from_yaml_str(EMBEDDED_HOUSEHOLD_YAML)
    }

    /// Parse and check a household from YAML text
    ///
    /// # Errors
    ///
    /// Returns `ConfigInvalid` if the YAML is malformed, the household has no
    /// members, a member name is blank, or two members share a name.
    pub fn from_yaml_str(yaml: &str) -> AppResult<Self> {
        let household: Self = serde_yaml::from_str(yaml).map_err(|e| {
            AppError::new(
                ErrorCode::ConfigInvalid,
                format!("Household file is not valid: {e}"),
            )
            .with_source(e)
        })?;
        household.check()?;
        Ok(household)
    }

    /// Load a household from a YAML file
    ///
    /// # Errors
    ///
    /// Returns `ConfigMissing` if the file does not exist, `ConfigError` if it
    /// cannot be read, and `ConfigInvalid` if its content is rejected.
    pub async fn load(path: &Path) -> AppResult<Self> {
        let yaml = fs::read_to_string(path).await.map_err(|e| {
            let code = if e.kind() == ErrorKind::NotFound {
                ErrorCode::ConfigMissing
            } else {
                ErrorCode::ConfigError
            };
            AppError::new(
                code,
                format!("Cannot read household file {}: {e}", path.display()),
            )
            .with_source(e)
        })?;

        let household = Self::from_yaml_str(&yaml)?;
        info!(
            path = %path.display(),
            family = %household.family_name,
            members = household.members.len(),
            "Household loaded"
        );
        Ok(household)
    }

    /// Resolve the household named by the configuration, or the embedded one
    ///
    /// # Errors
    ///
    /// Propagates errors from [`Household::load`] or [`Household::embedded`].
    pub async fn from_config(config: &PipelineConfig) -> AppResult<Self> {
        match &config.household_file {
            Some(path) => Self::load(path).await,
            None => {
                debug!("No household file configured, using embedded household");
                Self::embedded()
            }
        }
    }

    /// Look up a member by name, ignoring case
    #[must_use]
    pub fn member(&self, name: &str) -> Option<&EaterProfile> {
        let name = name.trim();
        self.members
            .iter()
            .find(|m| m.name.eq_ignore_ascii_case(name))
    }

    /// Names of every member, in table order
    #[must_use]
    pub fn member_names(&self) -> Vec<&str> {
        self.members.iter().map(|m| m.name.as_str()).collect()
    }

    fn check(&self) -> AppResult<()> {
        if self.members.is_empty() {
            return Err(AppError::new(
                ErrorCode::ConfigInvalid,
                "Household must list at least one member",
            ));
        }
        for (i, member) in self.members.iter().enumerate() {
            if member.name.trim().is_empty() {
                return Err(AppError::new(
                    ErrorCode::ConfigInvalid,
                    format!("Household member #{} has a blank name", i + 1),
                ));
            }
            if self.members[..i]
                .iter()
                .any(|other| other.name.eq_ignore_ascii_case(&member.name))
            {
                return Err(AppError::new(
                    ErrorCode::ConfigInvalid,
                    format!("Household member '{}' is listed twice", member.name),
                ));
            }
        }
        Ok(())
    }
}
