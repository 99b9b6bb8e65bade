// ABOUTME: Shared helpers for integration tests
// ABOUTME: Builds workflows over a scripted provider and starts in-process HTTP doubles
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Jarvis Contributors

#![allow(dead_code, clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::net::SocketAddr;
use std::sync::{Arc, Once};

use axum::Router;
use jarvis_core::config::{PipelineConfig, PipelineVariant};
use jarvis_core::llm::LlmProvider;
use jarvis_core::meal::Household;
use jarvis_core::test_utils::ScriptedProvider;
use jarvis_core::workflow::MealCreationWorkflow;
use tokio::net::TcpListener;

static INIT_LOGGING: Once = Once::new();

/// Install a quiet test subscriber once per test binary
pub fn init_test_logging() {
    INIT_LOGGING.call_once(|| {
        let level = std::env::var("TEST_LOG").unwrap_or_else(|_| "warn".to_owned());
        let _ = tracing_subscriber::fmt()
            .with_env_filter(level)
            .with_test_writer()
            .try_init();
    });
}

/// Workflow over `provider` using the embedded household
pub fn workflow_with(provider: &Arc<ScriptedProvider>, variant: PipelineVariant) -> MealCreationWorkflow {
    init_test_logging();
    let config = PipelineConfig {
        variant,
        ..PipelineConfig::default()
    };
    let household = Arc::new(Household::embedded().unwrap());
    let provider: Arc<dyn LlmProvider> = provider.clone();
    MealCreationWorkflow::new(provider, household, &config)
}

/// Serve `router` on an ephemeral local port and return its address
pub async fn spawn_server(router: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}
