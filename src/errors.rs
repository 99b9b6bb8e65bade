// ABOUTME: Unified error type and error codes for the meal creation pipeline
// ABOUTME: Maps every failure onto input-validation, external-call, or schema-conformance categories
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Jarvis Contributors

//! # Unified Error Handling System
//!
//! Every failure in the pipeline is an [`AppError`] carrying an [`ErrorCode`].
//! Codes group into an [`ErrorCategory`]; no category is recovered or retried
//! locally, every error aborts the run it belongs to.

use serde::{Deserialize, Serialize};
use std::error::Error as StdError;
use std::fmt;
use thiserror::Error;

/// Standard error codes used throughout the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    // Input validation (3000-3999)
    /// A caller-supplied value is malformed
    #[serde(rename = "INVALID_INPUT")]
    InvalidInput = 3000,
    /// A required field is absent
    #[serde(rename = "MISSING_REQUIRED_FIELD")]
    MissingRequiredField = 3001,

    // External services (5000-5999)
    /// The generative model call failed
    #[serde(rename = "EXTERNAL_SERVICE_ERROR")]
    ExternalServiceError = 5000,
    /// The generative model service is unreachable
    #[serde(rename = "EXTERNAL_SERVICE_UNAVAILABLE")]
    ExternalServiceUnavailable = 5001,
    /// The generative model service rejected our credentials
    #[serde(rename = "EXTERNAL_AUTH_FAILED")]
    ExternalAuthFailed = 5002,
    /// The generative model service rate limited the call
    #[serde(rename = "EXTERNAL_RATE_LIMITED")]
    ExternalRateLimited = 5003,

    // Schema conformance (5500-5599)
    /// Schema-constrained output did not match its schema
    #[serde(rename = "SCHEMA_VIOLATION")]
    SchemaViolation = 5500,

    // Configuration (6000-6999)
    /// Generic configuration error
    #[serde(rename = "CONFIG_ERROR")]
    ConfigError = 6000,
    /// Required configuration is missing
    #[serde(rename = "CONFIG_MISSING")]
    ConfigMissing = 6001,
    /// Configuration could not be parsed
    #[serde(rename = "CONFIG_INVALID")]
    ConfigInvalid = 6002,

    // Internal errors (9000-9999)
    /// Unexpected internal failure
    #[serde(rename = "INTERNAL_ERROR")]
    InternalError = 9000,
    /// Serialization or deserialization failed outside of a model call
    #[serde(rename = "SERIALIZATION_ERROR")]
    SerializationError = 9003,
}

/// Coarse error taxonomy used by callers to decide how to surface a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Malformed meal context, detected before any external call
    InputValidation,
    /// A generative-model invocation failed
    ExternalCall,
    /// A schema-constrained call returned non-conforming output
    SchemaConformance,
    /// The pipeline is misconfigured
    Configuration,
    /// Anything else
    Internal,
}

impl ErrorCode {
    /// Category this code belongs to
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidInput | Self::MissingRequiredField => ErrorCategory::InputValidation,
            Self::ExternalServiceError
            | Self::ExternalServiceUnavailable
            | Self::ExternalAuthFailed
            | Self::ExternalRateLimited => ErrorCategory::ExternalCall,
            Self::SchemaViolation => ErrorCategory::SchemaConformance,
            Self::ConfigError | Self::ConfigMissing | Self::ConfigInvalid => {
                ErrorCategory::Configuration
            }
            Self::InternalError | Self::SerializationError => ErrorCategory::Internal,
        }
    }

    /// Get a user-friendly description of this error
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::InvalidInput => "The provided input is invalid",
            Self::MissingRequiredField => "A required field is missing from the request",
            Self::ExternalServiceError => "The generative model service encountered an error",
            Self::ExternalServiceUnavailable => "The generative model service is unavailable",
            Self::ExternalAuthFailed => "Authentication with the generative model service failed",
            Self::ExternalRateLimited => "The generative model service rate limit was exceeded",
            Self::SchemaViolation => "Generated output does not conform to its schema",
            Self::ConfigError => "Configuration error encountered",
            Self::ConfigMissing => "Required configuration is missing",
            Self::ConfigInvalid => "Configuration is invalid",
            Self::InternalError => "An internal error occurred",
            Self::SerializationError => "Data serialization/deserialization failed",
        }
    }
}

impl ErrorCategory {
    /// Process exit code used by the command-line entry point
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::InputValidation => 2,
            Self::ExternalCall => 3,
            Self::SchemaConformance => 4,
            Self::Configuration => 5,
            Self::Internal => 1,
        }
    }
}

/// Additional context that can be attached to errors
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorContext {
    /// Pipeline run this error belongs to
    pub run_id: Option<String>,
    /// Pipeline step that failed
    pub step: Option<String>,
    /// Additional key-value context
    pub details: serde_json::Value,
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self {
            run_id: None,
            step: None,
            details: serde_json::Value::Null,
        }
    }
}

/// Unified error type for the pipeline
#[derive(Debug, Error)]
pub struct AppError {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Additional context
    pub context: ErrorContext,
    /// Source error for error chaining
    #[source]
    pub source: Option<Box<dyn StdError + Send + Sync>>,
}

impl AppError {
    /// Create a new `AppError` with the given code and message
    #[must_use]
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            context: ErrorContext::default(),
            source: None,
        }
    }

    /// Add a run ID to the error context
    #[must_use]
    pub fn with_run_id(mut self, run_id: impl Into<String>) -> Self {
        self.context.run_id = Some(run_id.into());
        self
    }

    /// Add the failing step to the error context
    #[must_use]
    pub fn with_step(mut self, step: impl Into<String>) -> Self {
        self.context.step = Some(step.into());
        self
    }

    /// Add details to the error context
    #[must_use]
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.context.details = details;
        self
    }

    /// Add a source error for error chaining
    #[must_use]
    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Category of this error
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        self.code.category()
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.description(), self.message)
    }
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;

/// Serializable error report emitted by the command-line entry point
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error body
    pub error: ErrorResponseDetails,
}

/// Body of an [`ErrorResponse`]
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponseDetails {
    /// Error code
    pub code: ErrorCode,
    /// Error category
    pub category: ErrorCategory,
    /// Human-readable message
    pub message: String,
    /// Run the error belongs to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_id: Option<String>,
    /// Step that failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<String>,
    /// Extra details
    #[serde(skip_serializing_if = "serde_json::Value::is_null")]
    pub details: serde_json::Value,
}

impl From<AppError> for ErrorResponse {
    fn from(error: AppError) -> Self {
        Self {
            error: ErrorResponseDetails {
                code: error.code,
                category: error.code.category(),
                message: error.message,
                run_id: error.context.run_id,
                step: error.context.step,
                details: error.context.details,
            },
        }
    }
}

/// Convenience functions for creating common errors
impl AppError {
    /// Invalid input
    #[must_use]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    /// Missing required field
    #[must_use]
    pub fn missing_field(field: &str) -> Self {
        Self::new(
            ErrorCode::MissingRequiredField,
            format!("Field '{field}' is required"),
        )
        .with_details(serde_json::json!({ "field": field }))
    }

    /// Schema-constrained output failed validation
    #[must_use]
    pub fn schema_violation(schema: &str, message: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::SchemaViolation,
            format!("{schema}: {}", message.into()),
        )
        .with_details(serde_json::json!({ "schema": schema }))
    }

    /// Internal error
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// External service error
    #[must_use]
    pub fn external_service(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::ExternalServiceError,
            format!("{}: {}", service.into(), message.into()),
        )
    }
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        match error.source() {
            Some(source) => Self::internal(error.to_string()).with_details(serde_json::json!({
                "source": source.to_string()
            })),
            None => Self::internal(error.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_categories() {
        assert_eq!(
            ErrorCode::MissingRequiredField.category(),
            ErrorCategory::InputValidation
        );
        assert_eq!(
            ErrorCode::ExternalRateLimited.category(),
            ErrorCategory::ExternalCall
        );
        assert_eq!(
            ErrorCode::SchemaViolation.category(),
            ErrorCategory::SchemaConformance
        );
        assert_eq!(ErrorCode::ConfigMissing.category(), ErrorCategory::Configuration);
    }

    #[test]
    fn test_app_error_context() {
        let error = AppError::invalid_input("eaters must not be empty")
            .with_run_id("run-123")
            .with_step("validate-context");

        assert_eq!(error.code, ErrorCode::InvalidInput);
        assert_eq!(error.context.run_id.as_deref(), Some("run-123"));
        assert_eq!(error.context.step.as_deref(), Some("validate-context"));
    }

    #[test]
    fn test_error_response_serialization() {
        let error = AppError::schema_violation("StructuredRecipe", "servings must be positive");
        let response = ErrorResponse::from(error);

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("SCHEMA_VIOLATION"));
        assert!(json.contains("schema_conformance"));
        assert!(json.contains("StructuredRecipe"));
    }

    #[test]
    fn test_exit_codes_are_distinct() {
        let codes = [
            ErrorCategory::InputValidation.exit_code(),
            ErrorCategory::ExternalCall.exit_code(),
            ErrorCategory::SchemaConformance.exit_code(),
            ErrorCategory::Configuration.exit_code(),
            ErrorCategory::Internal.exit_code(),
        ];
        for (i, a) in codes.iter().enumerate() {
            for b in &codes[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
