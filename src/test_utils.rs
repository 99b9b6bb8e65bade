// ABOUTME: Test utilities: a scripted LLM provider and ready-made meal inputs and recipes
// ABOUTME: Lets workflow tests count provider calls and inspect prompts without any network
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Jarvis Contributors

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::errors::{AppError, ErrorCode};
use crate::llm::{
    ChatRequest, ChatResponse, LlmCapabilities, LlmProvider, OutputSchema, StructuredResponse,
};
use crate::meal::MealContextInput;

/// One queued provider answer
#[derive(Debug, Clone)]
pub enum ScriptedReply {
    /// Text content (structured calls parse it as JSON)
    Text(String),
    /// JSON value for a structured call
    Json(Value),
    /// Failure with this code and message
    Failure(ErrorCode, String),
}

enum Answer {
    Text(String),
    Json(Value),
}

/// A call the provider received
#[derive(Debug, Clone)]
pub struct RecordedCall {
    /// Request as sent by the caller
    pub request: ChatRequest,
    /// Schema name for structured calls
    pub schema: Option<String>,
}

impl RecordedCall {
    /// Last user message of the request
    #[must_use]
    pub fn prompt(&self) -> &str {
        self.request.last_user_message().unwrap_or_default()
    }
}

/// `LlmProvider` double answering from a queue, in order
#[derive(Debug)]
pub struct ScriptedProvider {
    replies: Mutex<VecDeque<ScriptedReply>>,
    calls: Mutex<Vec<RecordedCall>>,
    capabilities: LlmCapabilities,
}

impl Default for ScriptedProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedProvider {
    /// Provider with an empty queue
    #[must_use]
    pub fn new() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
            capabilities: LlmCapabilities::full_featured(),
        }
    }

    /// Queue a text answer
    #[must_use]
    pub fn with_text(self, text: impl Into<String>) -> Self {
        self.push(ScriptedReply::Text(text.into()))
    }

    /// Queue a JSON answer
    #[must_use]
    pub fn with_json(self, value: Value) -> Self {
        self.push(ScriptedReply::Json(value))
    }

    /// Queue a failure
    #[must_use]
    pub fn with_failure(self, code: ErrorCode, message: impl Into<String>) -> Self {
        self.push(ScriptedReply::Failure(code, message.into()))
    }

    fn push(self, reply: ScriptedReply) -> Self {
        self.replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(reply);
        self
    }

    /// Every call received so far
    #[must_use]
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of calls received so far
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Number of queued answers not consumed yet
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn next(
        &self,
        request: &ChatRequest,
        schema: Option<&OutputSchema>,
    ) -> Result<Answer, AppError> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(RecordedCall {
                request: request.clone(),
                schema: schema.map(|s| s.name.clone()),
            });

        match self
            .replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
        {
            Some(ScriptedReply::Text(text)) => Ok(Answer::Text(text)),
            Some(ScriptedReply::Json(value)) => Ok(Answer::Json(value)),
            Some(ScriptedReply::Failure(code, message)) => Err(AppError::new(code, message)),
            None => Err(AppError::internal("ScriptedProvider has no reply left")),
        }
    }

    fn model(request: &ChatRequest) -> String {
        request.model.clone().unwrap_or_else(|| "scripted".to_owned())
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn display_name(&self) -> &'static str {
        "Scripted"
    }

    fn capabilities(&self) -> LlmCapabilities {
        self.capabilities
    }

    fn default_model(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, AppError> {
        let content = match self.next(request, None)? {
            Answer::Text(text) => text,
            Answer::Json(value) => value.to_string(),
        };
        Ok(ChatResponse {
            content,
            model: Self::model(request),
            usage: None,
            finish_reason: Some("stop".to_owned()),
        })
    }

    async fn complete_structured(
        &self,
        request: &ChatRequest,
        schema: &OutputSchema,
    ) -> Result<StructuredResponse, AppError> {
        let value = match self.next(request, Some(schema))? {
            Answer::Json(value) => value,
            Answer::Text(text) => serde_json::from_str(&text).map_err(|e| {
                AppError::schema_violation(&schema.name, format!("output is not valid JSON: {e}"))
            })?,
        };
        Ok(StructuredResponse {
            value,
            model: Self::model(request),
            usage: None,
        })
    }

    async fn health_check(&self) -> Result<bool, AppError> {
        Ok(true)
    }
}

/// A complete, valid meal input
#[must_use]
pub fn dinner_for(eaters: &[&str]) -> MealContextInput {
    MealContextInput {
        time_of_day: Some("dinner".to_owned()),
        eaters: Some(eaters.iter().map(|e| (*e).to_owned()).collect()),
        complexity: Some("easy".to_owned()),
        duration: Some("short".to_owned()),
        country: Some("France".to_owned()),
        language: Some("French".to_owned()),
        season: Some("autumn".to_owned()),
        planner_instructions: None,
    }
}

/// Formatter output that passes every recipe check
#[must_use]
pub fn sample_recipe_json() -> Value {
    json!({
        "name": "Blanquette de poulet aux carottes",
        "description": "Poulet mijoté dans une sauce crémeuse aux carottes",
        "servings": 1,
        "mealType": "dinner",
        "complexity": "easy",
        "durationMinutes": 30,
        "utensils": ["cocotte"],
        "ingredientGroups": [{
            "label": "Poulet",
            "ingredients": [
                { "name": "blanc de poulet", "quantity": "150", "unit": "g" },
                { "name": "carotte", "quantity": "2", "unit": "pièces" }
            ]
        }],
        "instructionGroups": [{
            "title": "Cuisson",
            "steps": ["Couper le poulet en morceaux", "Faire mijoter 20 minutes"]
        }],
        "notes": ["Servir avec du riz complet"]
    })
}

/// Reviewer verdict accepting the draft
#[must_use]
pub fn accepted_verdict() -> Value {
    json!({ "accepted": true })
}

/// Reviewer verdict asking for a change
#[must_use]
pub fn rejected_verdict(feedback: &str) -> Value {
    json!({ "accepted": false, "feedback": feedback })
}
