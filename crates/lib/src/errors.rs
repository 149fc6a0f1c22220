use thiserror::Error;

/// Custom error types for the assistant library.
#[derive(Error, Debug)]
pub enum PromptError {
    #[error("Corpus unavailable at '{path}': {reason}")]
    CorpusUnavailable { path: String, reason: String },
    #[error("The restrictive template requires a corpus, but none is loaded")]
    MissingCorpus,
    #[error("Failed to build Reqwest client: {0}")]
    ReqwestClientBuild(reqwest::Error),
    #[error("Failed to send request to AI provider: {0}")]
    AiRequest(reqwest::Error),
    #[error("Failed to deserialize AI provider response: {0}")]
    AiDeserialization(reqwest::Error),
    #[error("AI provider returned an error: {0}")]
    AiApi(String),
    #[error("AI provider rate limit exceeded: {0}")]
    RateLimited(String),
    #[error("AI provider returned an empty response")]
    EmptyResponse,
    #[error("API key is missing: {0}")]
    MissingApiKey(String),
    #[error("Unsupported provider '{0}'")]
    UnsupportedProvider(String),
    #[error("Failed to send request to retrieval index: {0}")]
    RetrievalRequest(reqwest::Error),
    #[error("Retrieval index returned an error: {0}")]
    RetrievalApi(String),
    #[error("Chat history store error: {0}")]
    PersistenceFailure(String),
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PromptError {
    /// Whether the error came from the language-model call itself.
    pub fn is_model_failure(&self) -> bool {
        matches!(
            self,
            PromptError::AiRequest(_)
                | PromptError::AiDeserialization(_)
                | PromptError::AiApi(_)
                | PromptError::RateLimited(_)
                | PromptError::EmptyResponse
        )
    }

    /// Whether the error came from the retrieval index.
    pub fn is_retrieval_failure(&self) -> bool {
        matches!(
            self,
            PromptError::RetrievalRequest(_) | PromptError::RetrievalApi(_)
        )
    }
}
