//! # Chat Rooms
//!
//! A room pairs a history store with a template variant. The public and the
//! authenticated private room run the same turn logic and differ only in
//! those two choices.

use crate::{
    assistant::{Assistant, AssistantReply},
    errors::PromptError,
    history::HistoryStore,
    prompts::TemplateVariant,
    types::{ConversationTurn, HistoryRow, Role},
};
use chrono::{Duration, Utc};
use serde::Serialize;
use std::{fmt, sync::Arc};
use tracing::{debug, warn};

/// Shown to the user when a finished turn could not be persisted.
pub const SAVE_WARNING: &str = "Could not save chat to database.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomKind {
    Public,
    Private,
}

impl fmt::Display for RoomKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoomKind::Public => f.write_str("public"),
            RoomKind::Private => f.write_str("private"),
        }
    }
}

/// The outcome of one chat turn.
#[derive(Debug, Clone)]
pub struct ChatOutcome {
    pub reply: AssistantReply,
    /// Set when the turn was answered but not persisted.
    pub warning: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ChatRoom {
    pub kind: RoomKind,
    pub variant: TemplateVariant,
    store: Arc<dyn HistoryStore>,
}

impl ChatRoom {
    pub fn new(kind: RoomKind, variant: TemplateVariant, store: Arc<dyn HistoryStore>) -> Self {
        Self {
            kind,
            variant,
            store,
        }
    }

    /// Runs one turn for `user_id`.
    ///
    /// History that cannot be loaded is treated as empty. Rows that cannot be
    /// saved are dropped and reported through `ChatOutcome::warning`.
    pub async fn send(
        &self,
        assistant: &Assistant,
        user_id: &str,
        query: &str,
    ) -> Result<ChatOutcome, PromptError> {
        let history = match self.store.load(user_id).await {
            Ok(history) => history,
            Err(e) => {
                warn!(room = %self.kind, "Could not load chat history, continuing without it: {e}");
                Vec::new()
            }
        };

        let reply = assistant.answer(self.variant, query, &history).await?;

        // Stores order by timestamp alone, so the reply must sort after its question.
        let asked_at = Utc::now();
        let answered_at = asked_at + Duration::microseconds(1);
        let rows = [
            HistoryRow::new(user_id, Role::User, query, asked_at),
            HistoryRow::new(user_id, Role::Assistant, &reply.text, answered_at),
        ];
        let warning = match self.store.append(&rows).await {
            Ok(()) => {
                debug!(room = %self.kind, user_id, "Saved chat turn.");
                None
            }
            Err(e) => {
                warn!(room = %self.kind, "Failed to save chat turn: {e}");
                Some(SAVE_WARNING.to_string())
            }
        };

        Ok(ChatOutcome { reply, warning })
    }

    /// Returns the stored turns for `user_id`, oldest first.
    pub async fn history(&self, user_id: &str) -> Result<Vec<ConversationTurn>, PromptError> {
        self.store.load(user_id).await
    }
}
