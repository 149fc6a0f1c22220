//! # Assistant Pipeline
//!
//! One query runs one sequential chain: gather context, compose the prompt,
//! call the model. The chain is stateless; conversation history is owned by
//! the caller and passed in per turn.

use crate::{
    caller::{degraded_text, FailurePolicy, ModelCaller},
    config::{present, AppConfig},
    corpus::{load_corpus, Corpus},
    errors::PromptError,
    prompts::{render_context, PromptComposer, TemplateVariant},
    providers::factory::{build_ai_provider, build_retriever},
    retrieval::Retriever,
    types::{ComposedPrompt, ConversationTurn, RetrievalResult},
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Default number of snippets requested from the retriever.
pub const DEFAULT_TOP_K: usize = 3;

/// The result of answering one query.
#[derive(Debug, Clone, Serialize)]
pub struct AssistantReply {
    /// The text shown to the user. Carries `ERROR_MARKER` when `degraded` is set.
    pub text: String,
    pub variant: TemplateVariant,
    pub prompt: ComposedPrompt,
    pub snippets: Vec<String>,
    /// The retrieval index's own answer, if it produced one.
    pub index_answer: String,
    pub degraded: bool,
}

#[derive(Debug, Clone)]
pub struct Assistant {
    composer: PromptComposer,
    caller: ModelCaller,
    retriever: Option<Arc<dyn Retriever>>,
    corpus: Option<Arc<Corpus>>,
    policy: FailurePolicy,
    top_k: usize,
}

impl Assistant {
    pub fn new(composer: PromptComposer, caller: ModelCaller) -> Self {
        Self {
            composer,
            caller,
            retriever: None,
            corpus: None,
            policy: FailurePolicy::default(),
            top_k: DEFAULT_TOP_K,
        }
    }

    pub fn with_retriever(mut self, retriever: Arc<dyn Retriever>) -> Self {
        self.retriever = Some(retriever);
        self
    }

    pub fn with_corpus(mut self, corpus: Arc<Corpus>) -> Self {
        self.corpus = Some(corpus);
        self
    }

    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Builds the full pipeline from configuration.
    ///
    /// A configured corpus path that cannot be loaded is fatal.
    pub fn from_config(config: &AppConfig) -> Result<Self, PromptError> {
        let corpus = match present(&config.corpus.path) {
            Some(path) => {
                let corpus = load_corpus(path)?;
                info!(path, entries = corpus.len(), "Loaded corpus.");
                Some(Arc::new(corpus))
            }
            None => None,
        };

        let provider = build_ai_provider(&config.model)?;
        let caller = ModelCaller::new(provider, config.model.generation_options());
        let composer = PromptComposer::new(config.institution.clone());

        let mut assistant = Assistant::new(composer, caller)
            .with_policy(config.failure_policy)
            .with_top_k(config.retrieval.top_k);
        if let Some(retriever) = build_retriever(&config.retrieval, corpus.clone())? {
            assistant = assistant.with_retriever(Arc::from(retriever));
        }
        if let Some(corpus) = corpus {
            assistant = assistant.with_corpus(corpus);
        }
        Ok(assistant)
    }

    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    pub fn corpus(&self) -> Option<&Corpus> {
        self.corpus.as_deref()
    }

    pub fn composer(&self) -> &PromptComposer {
        &self.composer
    }

    /// Answers `query` using `variant`.
    ///
    /// `history` holds the turns preceding this query, oldest first.
    pub async fn answer(
        &self,
        variant: TemplateVariant,
        query: &str,
        history: &[ConversationTurn],
    ) -> Result<AssistantReply, PromptError> {
        info!(%variant, history_turns = history.len(), "Answering query.");

        let (context, retrieved) = match variant {
            TemplateVariant::Restrictive => {
                let corpus = self.corpus.as_deref().ok_or(PromptError::MissingCorpus)?;
                (corpus.render_with_sources(), RetrievalResult::default())
            }
            TemplateVariant::UnrestrictedInternal | TemplateVariant::SystemSplit => {
                let retrieved = self.retrieve(query).await?;
                (render_context(&retrieved.snippets), retrieved)
            }
        };

        let prompt = self.composer.compose(variant, history, &context, query);
        debug!(prompt = ?prompt, "Composed prompt.");

        let (text, degraded) = match self.caller.try_call(&prompt).await {
            Ok(text) => (text, false),
            Err(e) => match self.policy {
                FailurePolicy::Degrade => {
                    warn!("Model call failed, degrading to error text: {e}");
                    (degraded_text(&e), true)
                }
                FailurePolicy::Surface => {
                    error!("Model call failed: {e}");
                    return Err(e);
                }
            },
        };

        Ok(AssistantReply {
            text,
            variant,
            prompt,
            snippets: retrieved.snippets,
            index_answer: retrieved.answer,
            degraded,
        })
    }

    async fn retrieve(&self, query: &str) -> Result<RetrievalResult, PromptError> {
        let Some(retriever) = &self.retriever else {
            return Ok(RetrievalResult::default());
        };

        match retriever.retrieve(query, self.top_k).await {
            Ok(result) => {
                info!(snippets = result.snippets.len(), "Retrieved context.");
                Ok(result)
            }
            Err(e) => match self.policy {
                FailurePolicy::Degrade => {
                    warn!("Retrieval failed, continuing without context: {e}");
                    Ok(RetrievalResult::default())
                }
                FailurePolicy::Surface => {
                    error!("Retrieval failed: {e}");
                    Err(e)
                }
            },
        }
    }
}
