// ABOUTME: Schema-constrained generation helpers built on schemars-derived JSON schemas
// ABOUTME: Derives the output schema from a Rust type and enforces conformance of model output
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Jarvis Contributors

use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use super::{ChatRequest, LlmProvider, OutputSchema};
use crate::errors::{AppError, AppResult};

/// A type the model can be asked to produce under a JSON schema
///
/// Deserialization enforces the structural part of the contract; `check`
/// adds rules a JSON schema cannot express well.
pub trait StructuredOutput: DeserializeOwned + JsonSchema {
    /// Name sent to the provider and used in error messages
    const SCHEMA_NAME: &'static str;

    /// Semantic checks run after deserialization
    ///
    /// # Errors
    ///
    /// Returns a human-readable reason when the value is unacceptable.
    fn check(&self) -> Result<(), String> {
        Ok(())
    }
}

/// JSON schema for `T`
#[must_use]
pub fn output_schema<T: StructuredOutput>() -> OutputSchema {
    OutputSchema::new(T::SCHEMA_NAME, schemars::schema_for!(T).to_value())
}

/// Convert a raw model JSON value into `T`
///
/// # Errors
///
/// Returns `SchemaViolation` if the value does not deserialize into `T` or
/// fails `T::check`.
pub fn parse_structured<T: StructuredOutput>(value: Value) -> AppResult<T> {
    let parsed: T = serde_json::from_value(value).map_err(|e| {
        warn!(schema = T::SCHEMA_NAME, error = %e, "Model output does not match schema");
        AppError::schema_violation(T::SCHEMA_NAME, e.to_string()).with_source(e)
    })?;

    parsed.check().map_err(|reason| {
        warn!(schema = T::SCHEMA_NAME, reason = %reason, "Model output failed semantic checks");
        AppError::schema_violation(T::SCHEMA_NAME, reason)
    })?;

    Ok(parsed)
}

/// Run a structured completion and parse the result into `T`
///
/// # Errors
///
/// Propagates provider errors; returns `SchemaViolation` for non-conforming output.
pub async fn generate_structured<T: StructuredOutput>(
    provider: &dyn LlmProvider,
    request: &ChatRequest,
) -> AppResult<T> {
    let schema = output_schema::<T>();
    let response = provider.complete_structured(request, &schema).await?;
    debug!(
        schema = T::SCHEMA_NAME,
        model = %response.model,
        "Structured completion received"
    );
    parse_structured(response.value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorCode;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize, JsonSchema)]
    #[serde(deny_unknown_fields)]
    struct Score {
        value: u8,
    }

    impl StructuredOutput for Score {
        const SCHEMA_NAME: &'static str = "Score";

        fn check(&self) -> Result<(), String> {
            if self.value > 10 {
                return Err("value must be at most 10".to_owned());
            }
            Ok(())
        }
    }

    #[test]
    fn test_output_schema_describes_fields() {
        let schema = output_schema::<Score>();
        assert_eq!(schema.name, "Score");
        assert!(schema.schema["properties"]["value"].is_object());
    }

    #[test]
    fn test_parse_structured() {
        let score: Score = parse_structured(json!({ "value": 7 })).unwrap();
        assert_eq!(score.value, 7);

        let err = parse_structured::<Score>(json!({ "value": 7, "extra": 1 })).unwrap_err();
        assert_eq!(err.code, ErrorCode::SchemaViolation);

        let err = parse_structured::<Score>(json!({ "value": 11 })).unwrap_err();
        assert_eq!(err.code, ErrorCode::SchemaViolation);
        assert!(err.message.contains("at most 10"));
    }
}
