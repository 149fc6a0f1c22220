//! # askpti
//!
//! A question-answering assistant for an institution's public knowledge base.
//! A query runs one sequential chain: load or retrieve context, compose the
//! prompt for a template variant, and call a hosted language model.
//!
//! The building blocks are usable on their own:
//!
//! - [`corpus`] loads the pre-scraped corpus of `{url, markdown}` pages.
//! - [`prompts`] composes prompts for the three template variants.
//! - [`caller`] calls the model with an explicit failure policy.
//! - [`retrieval`] fetches context snippets from a managed index or the corpus.
//! - [`chat`] and [`history`] run chat turns against a persistent transcript.

pub mod assistant;
pub mod blocking;
pub mod caller;
pub mod chat;
pub mod config;
pub mod corpus;
pub mod errors;
pub mod history;
pub mod prompts;
pub mod providers;
pub mod retrieval;
pub mod types;

pub use assistant::{Assistant, AssistantReply};
pub use blocking::BlockingAssistant;
pub use caller::{FailurePolicy, ModelCaller, ERROR_MARKER};
pub use chat::{ChatOutcome, ChatRoom, RoomKind, SAVE_WARNING};
pub use config::{get_config, AppConfig, ConfigError};
pub use corpus::{load_corpus, save_corpus, Corpus, CorpusEntry};
pub use errors::PromptError;
pub use prompts::{Institution, PromptComposer, TemplateVariant};
pub use types::{ComposedPrompt, ConversationTurn, GenerationOptions, HistoryRow, Role};
