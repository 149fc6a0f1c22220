pub mod gemini;
pub mod local;

use crate::{errors::PromptError, types::GenerationOptions};
use async_trait::async_trait;
use dyn_clone::DynClone;
use std::fmt::Debug;

/// A trait for interacting with a hosted language model.
///
/// The model is treated as a black box from prompt text to response text.
/// Implementations omit the system instruction from the request when
/// `system_prompt` is empty.
#[async_trait]
pub trait AiProvider: Send + Sync + Debug + DynClone {
    /// Generates a response from a given system and user prompt.
    async fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        options: &GenerationOptions,
    ) -> Result<String, PromptError>;
}

dyn_clone::clone_trait_object!(AiProvider);
