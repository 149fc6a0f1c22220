use crate::{
    errors::PromptError,
    history::HistoryStore,
    types::{ConversationTurn, HistoryRow},
};
use async_trait::async_trait;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Debug, Default)]
struct Transcript {
    rows: Vec<HistoryRow>,
    last_write: u64,
}

#[derive(Debug, Default)]
struct Transcripts {
    by_key: HashMap<String, Transcript>,
    writes: u64,
}

/// A process-local store keyed by user or session id.
///
/// An unbounded store keeps everything. A bounded store keeps at most
/// `max_keys` transcripts, evicting the least recently written one, and trims
/// each transcript to its newest `max_rows_per_key` rows.
///
/// Clones share the same underlying map.
#[derive(Debug, Clone, Default)]
pub struct InMemoryHistoryStore {
    inner: Arc<RwLock<Transcripts>>,
    max_keys: Option<usize>,
    max_rows_per_key: Option<usize>,
}

impl InMemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bounded(max_keys: usize, max_rows_per_key: usize) -> Self {
        Self {
            inner: Arc::default(),
            max_keys: Some(max_keys.max(1)),
            max_rows_per_key: Some(max_rows_per_key.max(1)),
        }
    }

    /// Whether any rows are held for `key`.
    pub async fn contains(&self, key: &str) -> bool {
        self.inner.read().await.by_key.contains_key(key)
    }

    /// Number of transcripts currently held.
    pub async fn len(&self) -> usize {
        self.inner.read().await.by_key.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl HistoryStore for InMemoryHistoryStore {
    async fn load(&self, user_id: &str) -> Result<Vec<ConversationTurn>, PromptError> {
        let inner = self.inner.read().await;
        Ok(inner
            .by_key
            .get(user_id)
            .map(|t| t.rows.iter().map(HistoryRow::to_turn).collect())
            .unwrap_or_default())
    }

    async fn append(&self, rows: &[HistoryRow]) -> Result<(), PromptError> {
        let mut inner = self.inner.write().await;
        for row in rows {
            if let Some(max_keys) = self.max_keys {
                if !inner.by_key.contains_key(&row.user_id) && inner.by_key.len() >= max_keys {
                    let oldest = inner
                        .by_key
                        .iter()
                        .min_by_key(|(_, t)| t.last_write)
                        .map(|(key, _)| key.clone());
                    if let Some(oldest) = oldest {
                        debug!(key = %oldest, "Evicting least recently used transcript.");
                        inner.by_key.remove(&oldest);
                    }
                }
            }

            inner.writes += 1;
            let write = inner.writes;
            let transcript = inner.by_key.entry(row.user_id.clone()).or_default();
            transcript.rows.push(row.clone());
            transcript.last_write = write;
            if let Some(max_rows) = self.max_rows_per_key {
                let excess = transcript.rows.len().saturating_sub(max_rows);
                transcript.rows.drain(..excess);
            }
        }
        Ok(())
    }
}
