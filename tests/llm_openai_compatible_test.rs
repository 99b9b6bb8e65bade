// ABOUTME: Tests for the OpenAI-compatible provider against an in-process HTTP double
// ABOUTME: Validates configuration, env parsing, wire requests and error mapping
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Jarvis Contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use std::env;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use common::spawn_server;
use jarvis_core::config::{LlmProviderType, ReasoningEffort};
use jarvis_core::errors::ErrorCode;
use jarvis_core::llm::{
    ChatMessage, ChatRequest, LlmCapabilities, LlmProvider, OpenAiCompatibleConfig,
    OpenAiCompatibleProvider, OutputSchema,
};
use serde_json::{json, Value};
use serial_test::serial;

// =============================================================================
// HTTP Double
// =============================================================================

#[derive(Clone, Default)]
struct Captured {
    bodies: Arc<Mutex<Vec<Value>>>,
    auth: Arc<Mutex<Vec<Option<String>>>>,
}

impl Captured {
    fn last_body(&self) -> Value {
        self.bodies.lock().unwrap().last().cloned().unwrap()
    }

    fn last_auth(&self) -> Option<String> {
        self.auth.lock().unwrap().last().cloned().unwrap()
    }
}

/// Serve a fixed status and body on `/v1/chat/completions`, recording requests
async fn chat_server(status: StatusCode, reply: Value) -> (SocketAddr, Captured) {
    let captured = Captured::default();
    let router = Router::new()
        .route(
            "/v1/chat/completions",
            post(
                move |State(captured): State<Captured>, headers: HeaderMap, Json(body): Json<Value>| {
                    let reply = reply.clone();
                    async move {
                        captured.bodies.lock().unwrap().push(body);
                        captured.auth.lock().unwrap().push(
                            headers
                                .get("authorization")
                                .and_then(|v| v.to_str().ok())
                                .map(ToOwned::to_owned),
                        );
                        (status, Json(reply))
                    }
                },
            ),
        )
        .route("/v1/models", get(|| async { Json(json!({ "data": [] })) }))
        .with_state(captured.clone());

    (spawn_server(router).await, captured)
}

fn completion(content: &str) -> Value {
    json!({
        "id": "chatcmpl-1",
        "model": "gpt-5",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }],
        "usage": { "prompt_tokens": 12, "completion_tokens": 7, "total_tokens": 19 }
    })
}

fn provider_at(addr: SocketAddr, capabilities: LlmCapabilities) -> OpenAiCompatibleProvider {
    let config = OpenAiCompatibleConfig::openai("sk-test")
        .with_base_url(format!("http://{addr}/v1"))
        .with_capabilities(capabilities);
    OpenAiCompatibleProvider::new(config).unwrap()
}

fn request() -> ChatRequest {
    ChatRequest::new(vec![
        ChatMessage::system("You are a chef."),
        ChatMessage::user("Make dinner."),
    ])
    .with_model("gpt-5")
    .with_reasoning_effort(ReasoningEffort::High)
}

fn verdict_schema() -> OutputSchema {
    OutputSchema::new(
        "ReviewVerdict",
        json!({
            "type": "object",
            "properties": { "accepted": { "type": "boolean" } },
            "required": ["accepted"]
        }),
    )
}

// =============================================================================
// OpenAiCompatibleConfig Tests
// =============================================================================

#[test]
fn test_openai_config_is_full_featured() {
    let config = OpenAiCompatibleConfig::openai("sk-test");

    assert_eq!(config.base_url, "https://api.openai.com/v1");
    assert_eq!(config.api_key.as_deref(), Some("sk-test"));
    assert_eq!(config.default_model, "gpt-5");
    assert_eq!(config.provider_name, "openai");
    assert!(config.capabilities.supports_structured_output());
    assert!(config.capabilities.supports_reasoning_effort());
}

#[test]
fn test_local_configs_skip_reasoning_effort() {
    let ollama = OpenAiCompatibleConfig::ollama("qwen2.5:7b");
    let vllm = OpenAiCompatibleConfig::vllm("meta-llama/Llama-3.1-8B");

    assert_eq!(ollama.base_url, "http://localhost:11434/v1");
    assert_eq!(vllm.base_url, "http://localhost:8000/v1");
    for config in [&ollama, &vllm] {
        assert!(config.api_key.is_none());
        assert!(config.capabilities.supports_json_mode());
        assert!(config.capabilities.supports_structured_output());
        assert!(!config.capabilities.supports_reasoning_effort());
    }
}

#[test]
fn test_default_config_is_local() {
    let config = OpenAiCompatibleConfig::default();

    assert_eq!(config.base_url, "http://localhost:11434/v1");
    assert_eq!(config.default_model, "qwen2.5:14b-instruct");
    assert_eq!(config.provider_name, "local");
}

// =============================================================================
// Environment Tests
// =============================================================================

#[test]
#[serial]
fn test_openai_from_env_requires_key() {
    env::remove_var("OPENAI_API_KEY");

    let err = OpenAiCompatibleConfig::from_env(LlmProviderType::OpenAi).unwrap_err();
    assert_eq!(err.code, ErrorCode::ConfigMissing);
}

#[test]
#[serial]
fn test_openai_from_env_reads_key_and_base_url() {
    env::set_var("OPENAI_API_KEY", "sk-env");
    env::set_var("OPENAI_BASE_URL", "https://proxy.example.com/v1");

    let config = OpenAiCompatibleConfig::from_env(LlmProviderType::OpenAi).unwrap();
    assert_eq!(config.api_key.as_deref(), Some("sk-env"));
    assert_eq!(config.base_url, "https://proxy.example.com/v1");

    env::remove_var("OPENAI_API_KEY");
    env::remove_var("OPENAI_BASE_URL");
}

#[test]
#[serial]
fn test_local_from_env_detects_backend() {
    env::set_var("LOCAL_LLM_BASE_URL", "http://gpu-box:8000/v1");
    env::set_var("LOCAL_LLM_MODEL", "mistral-7b");
    env::remove_var("LOCAL_LLM_API_KEY");

    let config = OpenAiCompatibleConfig::from_env(LlmProviderType::Local).unwrap();
    assert_eq!(config.provider_name, "vllm");
    assert_eq!(config.default_model, "mistral-7b");
    assert!(config.api_key.is_none());

    env::set_var("LOCAL_LLM_BASE_URL", "http://gpu-box:9999/v1");
    let config = OpenAiCompatibleConfig::from_env(LlmProviderType::Local).unwrap();
    assert_eq!(config.provider_name, "local");

    env::remove_var("LOCAL_LLM_BASE_URL");
    env::remove_var("LOCAL_LLM_MODEL");
}

#[test]
#[serial]
fn test_local_from_env_ignores_blank_values() {
    env::set_var("LOCAL_LLM_BASE_URL", "  ");
    env::set_var("LOCAL_LLM_MODEL", "");
    env::remove_var("LOCAL_LLM_API_KEY");

    let config = OpenAiCompatibleConfig::from_env(LlmProviderType::Local).unwrap();
    assert_eq!(config.base_url, "http://localhost:11434/v1");
    assert_eq!(config.provider_name, "ollama");
    assert!(!config.default_model.is_empty());

    env::remove_var("LOCAL_LLM_BASE_URL");
    env::remove_var("LOCAL_LLM_MODEL");
}

// =============================================================================
// Wire Request Tests
// =============================================================================

#[tokio::test]
async fn test_complete_sends_model_effort_and_auth() {
    let (addr, captured) = chat_server(StatusCode::OK, completion("A lovely stew")).await;
    let provider = provider_at(addr, LlmCapabilities::full_featured());

    let response = provider.complete(&request()).await.unwrap();

    assert_eq!(response.content, "A lovely stew");
    assert_eq!(response.usage.unwrap().total_tokens, 19);

    let body = captured.last_body();
    assert_eq!(body["model"], "gpt-5");
    assert_eq!(body["reasoning_effort"], "high");
    assert!(body.get("response_format").is_none());
    assert_eq!(body["messages"][0]["role"], "system");
    assert_eq!(body["messages"][1]["content"], "Make dinner.");
    assert_eq!(captured.last_auth().as_deref(), Some("Bearer sk-test"));
}

#[tokio::test]
async fn test_effort_is_dropped_without_capability() {
    let (addr, captured) = chat_server(StatusCode::OK, completion("ok")).await;
    let provider = provider_at(addr, LlmCapabilities::text_only());

    provider.complete(&request()).await.unwrap();

    assert!(captured.last_body().get("reasoning_effort").is_none());
}

#[tokio::test]
async fn test_structured_call_sends_json_schema() {
    let (addr, captured) =
        chat_server(StatusCode::OK, completion(r#"{"accepted": true}"#)).await;
    let provider = provider_at(addr, LlmCapabilities::full_featured());

    let response = provider
        .complete_structured(&request(), &verdict_schema())
        .await
        .unwrap();

    assert_eq!(response.value, json!({ "accepted": true }));
    let body = captured.last_body();
    assert_eq!(body["response_format"]["type"], "json_schema");
    assert_eq!(body["response_format"]["json_schema"]["name"], "ReviewVerdict");
    assert_eq!(
        body["response_format"]["json_schema"]["schema"]["required"][0],
        "accepted"
    );
}

#[tokio::test]
async fn test_structured_call_accepts_fenced_json() {
    let (addr, _) = chat_server(
        StatusCode::OK,
        completion("```json\n{\"accepted\": false}\n```"),
    )
    .await;
    let provider = provider_at(addr, LlmCapabilities::full_featured());

    let response = provider
        .complete_structured(&request(), &verdict_schema())
        .await
        .unwrap();
    assert_eq!(response.value["accepted"], false);
}

#[tokio::test]
async fn test_structured_call_rejects_prose() {
    let (addr, _) = chat_server(StatusCode::OK, completion("Looks great to me!")).await;
    let provider = provider_at(addr, LlmCapabilities::full_featured());

    let err = provider
        .complete_structured(&request(), &verdict_schema())
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::SchemaViolation);
}

// =============================================================================
// Error Mapping Tests
// =============================================================================

#[tokio::test]
async fn test_unauthorized_maps_to_auth_failure() {
    let (addr, _) = chat_server(
        StatusCode::UNAUTHORIZED,
        json!({ "error": { "message": "Incorrect API key", "type": "invalid_request_error" } }),
    )
    .await;
    let provider = provider_at(addr, LlmCapabilities::full_featured());

    let err = provider.complete(&request()).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ExternalAuthFailed);
}

#[tokio::test]
async fn test_rate_limit_keeps_retry_hint() {
    let (addr, _) = chat_server(
        StatusCode::TOO_MANY_REQUESTS,
        json!({ "error": { "message": "Rate limit reached. Please try again in 2.5s.", "type": "requests" } }),
    )
    .await;
    let provider = provider_at(addr, LlmCapabilities::full_featured());

    let err = provider.complete(&request()).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ExternalRateLimited);
    assert!(err.message.contains("3 seconds"));
}

#[tokio::test]
async fn test_refusal_is_an_external_error() {
    let (addr, _) = chat_server(
        StatusCode::OK,
        json!({
            "model": "gpt-5",
            "choices": [{
                "message": { "role": "assistant", "content": null, "refusal": "I cannot help with that." },
                "finish_reason": "stop"
            }]
        }),
    )
    .await;
    let provider = provider_at(addr, LlmCapabilities::full_featured());

    let err = provider.complete(&request()).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ExternalServiceError);
}

#[tokio::test]
async fn test_unreachable_server_is_unavailable() {
    // Bind then drop to get a port nothing listens on
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let provider = provider_at(addr, LlmCapabilities::full_featured());
    let err = provider.complete(&request()).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ExternalServiceUnavailable);
}

// =============================================================================
// Health Check Tests
// =============================================================================

#[tokio::test]
async fn test_health_check_uses_models_endpoint() {
    let (addr, _) = chat_server(StatusCode::OK, completion("unused")).await;
    let provider = provider_at(addr, LlmCapabilities::full_featured());

    assert!(provider.health_check().await.unwrap());
}
