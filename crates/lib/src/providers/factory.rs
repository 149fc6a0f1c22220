//! # Provider Factory
//!
//! Builds the model provider, the retriever and the history store from the
//! application configuration. Both the server and the CLI go through here, so
//! they resolve providers the same way.

use crate::{
    config::{present, HistoryBackend, HistoryConfig, ModelConfig, RetrievalConfig, RetrievalKind},
    corpus::Corpus,
    errors::PromptError,
    history::{HistoryStore, InMemoryHistoryStore, SupabaseHistoryStore},
    providers::ai::{
        gemini::{default_gemini_url, GeminiProvider},
        local::LocalAiProvider,
        AiProvider,
    },
    retrieval::{CorpusRetriever, ManagedIndexRetriever, Retriever},
};
use std::sync::Arc;
use tracing::info;

/// Creates the AI provider named by `config.provider`.
pub fn build_ai_provider(config: &ModelConfig) -> Result<Box<dyn AiProvider>, PromptError> {
    let provider: Box<dyn AiProvider> = match config.provider.as_str() {
        "gemini" => {
            let api_key = present(&config.api_key).ok_or_else(|| {
                PromptError::MissingApiKey("model.api_key is required for the gemini provider".to_string())
            })?;
            // If api_url is not provided in config, construct it from the model name.
            let api_url = present(&config.api_url)
                .map(str::to_string)
                .unwrap_or_else(|| default_gemini_url(&config.model_name));
            info!(api_url = %api_url, "Configuring Gemini provider.");
            Box::new(GeminiProvider::new(api_url, api_key.to_string())?)
        }
        "local" => {
            let api_url = present(&config.api_url).ok_or_else(|| {
                PromptError::UnsupportedProvider(
                    "local provider requires model.api_url".to_string(),
                )
            })?;
            info!(api_url = %api_url, "Configuring local AI provider.");
            Box::new(LocalAiProvider::new(
                api_url.to_string(),
                present(&config.api_key).map(str::to_string),
                Some(config.model_name.clone()),
            )?)
        }
        other => return Err(PromptError::UnsupportedProvider(other.to_string())),
    };
    Ok(provider)
}

/// Creates the retriever selected by `config.kind`, if any.
///
/// The corpus retriever needs a loaded corpus and fails with `MissingCorpus`
/// when none was configured.
pub fn build_retriever(
    config: &RetrievalConfig,
    corpus: Option<Arc<Corpus>>,
) -> Result<Option<Box<dyn Retriever>>, PromptError> {
    match config.kind {
        RetrievalKind::None => Ok(None),
        RetrievalKind::Managed => {
            let api_url = present(&config.api_url).ok_or_else(|| {
                PromptError::UnsupportedProvider(
                    "managed retrieval requires retrieval.api_url".to_string(),
                )
            })?;
            info!(api_url = %api_url, "Configuring managed retrieval index.");
            Ok(Some(Box::new(ManagedIndexRetriever::new(
                api_url.to_string(),
                present(&config.api_key).map(str::to_string),
                present(&config.index_name).map(str::to_string),
            )?)))
        }
        RetrievalKind::Corpus => match corpus {
            Some(corpus) => {
                info!(entries = corpus.len(), "Configuring keyword retrieval over the corpus.");
                Ok(Some(Box::new(CorpusRetriever::new(corpus))))
            }
            None => Err(PromptError::MissingCorpus),
        },
    }
}

/// Creates the history store backing the private room.
pub fn build_history_store(config: &HistoryConfig) -> Result<Arc<dyn HistoryStore>, PromptError> {
    match config.backend {
        HistoryBackend::Memory => {
            info!("Using in-memory chat history store.");
            Ok(Arc::new(InMemoryHistoryStore::new()))
        }
        HistoryBackend::Supabase => {
            let url = present(&config.url).ok_or_else(|| {
                PromptError::PersistenceFailure("history.url is required for supabase".to_string())
            })?;
            let api_key = present(&config.api_key).ok_or_else(|| {
                PromptError::MissingApiKey("history.api_key is required for supabase".to_string())
            })?;
            info!(url = %url, table = %config.table, "Using Supabase chat history store.");
            Ok(Arc::new(SupabaseHistoryStore::new(
                url.to_string(),
                api_key.to_string(),
                config.table.clone(),
            )?))
        }
    }
}
