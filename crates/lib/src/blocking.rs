//! # Blocking Adapter
//!
//! Runs the async pipeline to completion on a private current-thread runtime
//! for callers that have no runtime of their own. There is no timeout; a hung
//! upstream call hangs the caller.

use crate::{
    assistant::{Assistant, AssistantReply},
    errors::PromptError,
    prompts::TemplateVariant,
    types::ConversationTurn,
};
use tokio::runtime::{Builder, Runtime};

#[derive(Debug)]
pub struct BlockingAssistant {
    runtime: Runtime,
    assistant: Assistant,
}

impl BlockingAssistant {
    /// Must not be called from inside an async context.
    pub fn new(assistant: Assistant) -> std::io::Result<Self> {
        let runtime = Builder::new_current_thread().enable_all().build()?;
        Ok(Self { runtime, assistant })
    }

    pub fn assistant(&self) -> &Assistant {
        &self.assistant
    }

    pub fn answer(
        &self,
        variant: TemplateVariant,
        query: &str,
        history: &[ConversationTurn],
    ) -> Result<AssistantReply, PromptError> {
        self.runtime
            .block_on(self.assistant.answer(variant, query, history))
    }
}
