#![allow(dead_code)]
//! # Common Test Utilities
//!
//! Shared setup for the library's integration tests.

use askpti::{
    caller::ModelCaller, providers::ai::AiProvider, Assistant, GenerationOptions, PromptComposer,
};
use dotenvy::dotenv;
use std::sync::Once;

static INIT: Once = Once::new();

/// Initializes the tracing subscriber and loads .env for tests.
pub fn setup_tracing() {
    INIT.call_once(|| {
        dotenv().ok();
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Builds an assistant over `provider` with the default institution and options.
pub fn assistant_with(provider: impl AiProvider + 'static) -> Assistant {
    let caller = ModelCaller::new(Box::new(provider), GenerationOptions::default());
    Assistant::new(PromptComposer::default(), caller)
}
