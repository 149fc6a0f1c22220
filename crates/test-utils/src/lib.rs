use anyhow::Result;
use askpti::errors::PromptError;
use askpti::history::HistoryStore;
use askpti::providers::ai::AiProvider;
use askpti::retrieval::Retriever;
use askpti::types::{ConversationTurn, GenerationOptions, HistoryRow, RetrievalResult};
use async_trait::async_trait;
use serde_json::json;
use std::fmt::Debug;
use std::io::Write;
use std::sync::{Arc, Mutex};
use tempfile::NamedTempFile;

// --- Fixtures ---

/// Writes a corpus file holding the given `(url, markdown)` pairs.
///
/// The file is removed when the returned handle is dropped.
pub fn write_corpus_fixture(entries: &[(&str, &str)]) -> Result<NamedTempFile> {
    let records: Vec<_> = entries
        .iter()
        .map(|(url, markdown)| json!({ "url": url, "markdown": markdown }))
        .collect();
    let mut file = tempfile::Builder::new().suffix(".json").tempfile()?;
    file.write_all(serde_json::to_string_pretty(&records)?.as_bytes())?;
    file.flush()?;
    Ok(file)
}

/// The corpus used by the end-to-end scenario.
pub const PTI_URL: &str = "https://pti.edu.ng";
pub const PTI_LOCATION: &str = "PTI is located in Warri, Nigeria.";

// --- Mock AI Provider ---

/// A call received by `MockAiProvider`.
#[derive(Clone, Debug)]
pub struct RecordedCall {
    pub system_prompt: String,
    pub user_prompt: String,
    pub options: GenerationOptions,
}

#[derive(Clone, Debug)]
pub struct MockAiProvider {
    responses: Arc<Mutex<Vec<(String, String)>>>,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl MockAiProvider {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(Vec::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Pre-programs a response.
    /// The key is matched as a substring of the system prompt or the user prompt;
    /// the first key added wins.
    pub fn add_response(&self, key: &str, response: &str) {
        let mut responses = self.responses.lock().unwrap();
        responses.push((key.to_string(), response.to_string()));
    }

    /// Retrieves the recorded calls for assertion.
    pub fn get_calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl Default for MockAiProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AiProvider for MockAiProvider {
    async fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        options: &GenerationOptions,
    ) -> Result<String, PromptError> {
        self.calls.lock().unwrap().push(RecordedCall {
            system_prompt: system_prompt.to_string(),
            user_prompt: user_prompt.to_string(),
            options: *options,
        });

        let responses = self.responses.lock().unwrap();
        for (key, response) in responses.iter() {
            if system_prompt.contains(key.as_str()) || user_prompt.contains(key.as_str()) {
                return Ok(response.clone());
            }
        }

        Err(PromptError::AiApi(format!(
            "MockAiProvider: No response programmed. Got user prompt: '{user_prompt}'"
        )))
    }
}

/// A provider whose every call fails with a rate-limit error.
#[derive(Clone, Debug, Default)]
pub struct FailingAiProvider;

#[async_trait]
impl AiProvider for FailingAiProvider {
    async fn generate(
        &self,
        _system_prompt: &str,
        _user_prompt: &str,
        _options: &GenerationOptions,
    ) -> Result<String, PromptError> {
        Err(PromptError::RateLimited("quota exhausted".to_string()))
    }
}

// --- Mock Retriever ---

/// Returns a fixed result, or a fixed error when built with `failing`.
#[derive(Clone, Debug)]
pub struct MockRetriever {
    result: Option<RetrievalResult>,
    queries: Arc<Mutex<Vec<(String, usize)>>>,
}

impl MockRetriever {
    pub fn new(snippets: &[&str], answer: &str) -> Self {
        Self {
            result: Some(RetrievalResult {
                snippets: snippets.iter().map(|s| s.to_string()).collect(),
                answer: answer.to_string(),
            }),
            queries: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn failing() -> Self {
        Self {
            result: None,
            queries: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// The `(query, top_k)` pairs received so far.
    pub fn get_queries(&self) -> Vec<(String, usize)> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl Retriever for MockRetriever {
    async fn retrieve(&self, query: &str, top_k: usize) -> Result<RetrievalResult, PromptError> {
        self.queries
            .lock()
            .unwrap()
            .push((query.to_string(), top_k));
        self.result
            .clone()
            .ok_or_else(|| PromptError::RetrievalApi("index unavailable".to_string()))
    }
}

// --- Failing History Store ---

/// A store that can neither load nor save.
#[derive(Clone, Debug, Default)]
pub struct FailingHistoryStore;

#[async_trait]
impl HistoryStore for FailingHistoryStore {
    async fn load(&self, _user_id: &str) -> Result<Vec<ConversationTurn>, PromptError> {
        Err(PromptError::PersistenceFailure("connection refused".to_string()))
    }

    async fn append(&self, _rows: &[HistoryRow]) -> Result<(), PromptError> {
        Err(PromptError::PersistenceFailure("connection refused".to_string()))
    }
}
