//! # Chat History Persistence
//!
//! Transcripts are append-only rows of `{user_id, role, content, timestamp}`.
//! The storage engine is external; `HistoryStore` is the boundary.

pub mod memory;
pub mod supabase;

use crate::{
    errors::PromptError,
    types::{ConversationTurn, HistoryRow},
};
use async_trait::async_trait;
use std::fmt::Debug;

pub use memory::InMemoryHistoryStore;
pub use supabase::SupabaseHistoryStore;

#[async_trait]
pub trait HistoryStore: Send + Sync + Debug {
    /// Returns every stored turn for `user_id`, oldest first.
    async fn load(&self, user_id: &str) -> Result<Vec<ConversationTurn>, PromptError>;

    /// Appends rows in the given order.
    async fn append(&self, rows: &[HistoryRow]) -> Result<(), PromptError>;
}
