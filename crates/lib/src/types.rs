//! # Shared Types
//!
//! Data structures passed between the corpus loader, the prompt composer,
//! the model caller and the chat rooms.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The author of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One message of a conversation, as owned by the chat loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
}

impl ConversationTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// The text sent to the model for one turn.
///
/// `system` is only set by templates that target a distinct system-role field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComposedPrompt {
    pub system: Option<String>,
    pub user: String,
}

impl ComposedPrompt {
    pub fn system_str(&self) -> &str {
        self.system.as_deref().unwrap_or("")
    }
}

/// Generation parameters forwarded to the model endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationOptions {
    pub max_output_tokens: u32,
    pub temperature: f32,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            max_output_tokens: 500,
            temperature: 0.1,
        }
    }
}

/// The output of a retrieval adapter: ranked context snippets and the
/// index-native answer (empty when the index does not synthesize one).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrievalResult {
    #[serde(default)]
    pub snippets: Vec<String>,
    #[serde(default)]
    pub answer: String,
}

/// A persisted chat-history row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRow {
    pub user_id: String,
    pub role: Role,
    pub content: String,
    pub timestamp: String,
}

impl HistoryRow {
    pub fn new(user_id: &str, role: Role, content: &str, at: DateTime<Utc>) -> Self {
        Self {
            user_id: user_id.to_string(),
            role,
            content: content.to_string(),
            timestamp: at.to_rfc3339_opts(SecondsFormat::Micros, true),
        }
    }

    pub fn to_turn(&self) -> ConversationTurn {
        ConversationTurn {
            role: self.role,
            content: self.content.clone(),
        }
    }
}
