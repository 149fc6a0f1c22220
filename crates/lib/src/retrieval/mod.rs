//! # Retrieval Adapters
//!
//! A retriever turns a user query into a small, ranked set of context snippets
//! plus an optional index-native answer. The ranking itself belongs to the
//! backing index; this crate only fixes the contract.

pub mod corpus;
pub mod managed;

use crate::{errors::PromptError, types::RetrievalResult};
use async_trait::async_trait;
use std::fmt::Debug;

pub use corpus::CorpusRetriever;
pub use managed::ManagedIndexRetriever;

#[async_trait]
pub trait Retriever: Send + Sync + Debug {
    /// Returns at most `top_k` snippets for `query`, best first.
    async fn retrieve(&self, query: &str, top_k: usize) -> Result<RetrievalResult, PromptError>;
}
