use crate::{
    errors::PromptError,
    history::HistoryStore,
    types::{ConversationTurn, HistoryRow},
};
use async_trait::async_trait;
use reqwest::Client as ReqwestClient;
use std::fmt::Debug;
use tracing::debug;

/// A history store backed by a Supabase (PostgREST) table.
#[derive(Clone)]
pub struct SupabaseHistoryStore {
    client: ReqwestClient,
    base_url: String,
    api_key: String,
    table: String,
}

impl Debug for SupabaseHistoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseHistoryStore")
            .field("base_url", &self.base_url)
            .field("table", &self.table)
            .finish_non_exhaustive()
    }
}

impl SupabaseHistoryStore {
    /// Creates a store for `table` under the project at `base_url`.
    pub fn new(base_url: String, api_key: String, table: String) -> Result<Self, PromptError> {
        let client = ReqwestClient::builder()
            .build()
            .map_err(PromptError::ReqwestClientBuild)?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            table,
        })
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url, self.table)
    }
}

fn persistence(e: impl ToString) -> PromptError {
    PromptError::PersistenceFailure(e.to_string())
}

#[async_trait]
impl HistoryStore for SupabaseHistoryStore {
    async fn load(&self, user_id: &str) -> Result<Vec<ConversationTurn>, PromptError> {
        let user_filter = format!("eq.{user_id}");
        let response = self
            .client
            .get(self.table_url())
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .query(&[
                ("select", "role,content"),
                ("user_id", user_filter.as_str()),
                ("order", "timestamp.asc"),
            ])
            .send()
            .await
            .map_err(persistence)?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(persistence(format!("status {status}: {error_text}")));
        }

        let turns: Vec<ConversationTurn> = response.json().await.map_err(persistence)?;
        debug!(user_id, turns = turns.len(), "Loaded chat history.");
        Ok(turns)
    }

    async fn append(&self, rows: &[HistoryRow]) -> Result<(), PromptError> {
        if rows.is_empty() {
            return Ok(());
        }

        let response = self
            .client
            .post(self.table_url())
            .header("apikey", &self.api_key)
            .header("Prefer", "return=minimal")
            .bearer_auth(&self.api_key)
            .json(rows)
            .send()
            .await
            .map_err(persistence)?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(persistence(format!("status {status}: {error_text}")));
        }

        debug!(rows = rows.len(), "Appended chat history rows.");
        Ok(())
    }
}
