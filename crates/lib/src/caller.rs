//! # Model Caller
//!
//! Sends a composed prompt to the configured `AiProvider` with the configured
//! generation options. `try_call` surfaces typed errors; `call` never fails and
//! substitutes a human-readable string prefixed with `ERROR_MARKER` instead.

use crate::{
    errors::PromptError,
    providers::ai::AiProvider,
    types::{ComposedPrompt, GenerationOptions},
};
use serde::Deserialize;
use tracing::{debug, info, warn};

/// Prefix of the text returned in place of a model response when the call fails.
pub const ERROR_MARKER: &str = "An exception occurred:";

/// What the pipeline does with a failed external call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Replace the failure with a marker string and keep the chat turn alive.
    #[default]
    Degrade,
    /// Return the typed error to the caller.
    Surface,
}

/// Renders an error the way the degraded path shows it to users.
pub fn degraded_text(err: &PromptError) -> String {
    format!("{ERROR_MARKER} {err}")
}

#[derive(Debug, Clone)]
pub struct ModelCaller {
    provider: Box<dyn AiProvider>,
    options: GenerationOptions,
}

impl ModelCaller {
    pub fn new(provider: Box<dyn AiProvider>, options: GenerationOptions) -> Self {
        Self { provider, options }
    }

    pub fn options(&self) -> &GenerationOptions {
        &self.options
    }

    /// Calls the model and returns its text, or the error that occurred.
    pub async fn try_call(&self, prompt: &ComposedPrompt) -> Result<String, PromptError> {
        info!(
            max_output_tokens = self.options.max_output_tokens,
            temperature = self.options.temperature,
            "Calling language model."
        );
        debug!(system_prompt = %prompt.system_str(), user_prompt = %prompt.user, "--> Sending prompts to AI Provider");

        let text = self
            .provider
            .generate(prompt.system_str(), &prompt.user, &self.options)
            .await?;

        debug!("<-- Model response: {}", text);
        Ok(text)
    }

    /// Calls the model; on failure returns a string starting with `ERROR_MARKER`.
    pub async fn call(&self, prompt: &ComposedPrompt) -> String {
        match self.try_call(prompt).await {
            Ok(text) => text,
            Err(e) => {
                warn!("Model call failed, degrading to error text: {e}");
                degraded_text(&e)
            }
        }
    }
}
