//! # Model Caller Tests
//!
//! The caller must never fail on the `call` path and must surface typed errors on `try_call`.

mod common;

use askpti::{
    caller::degraded_text, ComposedPrompt, GenerationOptions, ModelCaller, PromptError,
    ERROR_MARKER,
};
use askpti_test_utils::{FailingAiProvider, MockAiProvider};
use common::setup_tracing;

fn prompt(user: &str) -> ComposedPrompt {
    ComposedPrompt {
        system: None,
        user: user.to_string(),
    }
}

#[tokio::test]
async fn test_call_returns_model_text() {
    setup_tracing();
    let provider = MockAiProvider::new();
    provider.add_response("Where is PTI", "In Warri.");
    let caller = ModelCaller::new(Box::new(provider.clone()), GenerationOptions::default());

    let text = caller.call(&prompt("Where is PTI located?")).await;

    assert_eq!(text, "In Warri.");
    let calls = provider.get_calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].system_prompt, "");
    assert_eq!(calls[0].options.max_output_tokens, 500);
    assert_eq!(calls[0].options.temperature, 0.1);
}

#[tokio::test]
async fn test_call_failure_returns_marker_string() {
    setup_tracing();
    let caller = ModelCaller::new(Box::new(FailingAiProvider), GenerationOptions::default());

    let text = caller.call(&prompt("Where is PTI located?")).await;

    assert!(text.starts_with(ERROR_MARKER), "got: {text}");
    assert!(text.contains("quota exhausted"));
}

#[tokio::test]
async fn test_try_call_surfaces_typed_error() {
    let caller = ModelCaller::new(Box::new(FailingAiProvider), GenerationOptions::default());

    let err = caller.try_call(&prompt("Where is PTI located?")).await.unwrap_err();

    assert!(matches!(err, PromptError::RateLimited(_)));
    assert!(err.is_model_failure());
}

#[tokio::test]
async fn test_custom_options_are_forwarded() {
    let provider = MockAiProvider::new();
    provider.add_response("hello", "hi");
    let options = GenerationOptions {
        max_output_tokens: 64,
        temperature: 0.7,
    };
    let caller = ModelCaller::new(Box::new(provider.clone()), options);

    caller
        .try_call(&ComposedPrompt {
            system: Some("Be brief.".to_string()),
            user: "hello".to_string(),
        })
        .await
        .unwrap();

    let calls = provider.get_calls();
    assert_eq!(calls[0].system_prompt, "Be brief.");
    assert_eq!(calls[0].options, options);
}

#[test]
fn test_degraded_text_format() {
    assert_eq!(
        degraded_text(&PromptError::EmptyResponse),
        "An exception occurred: AI provider returned an empty response"
    );
}
