//! # Prompt Templates and Composition
//!
//! `templates` holds the fixed instruction texts; `composer` merges them with
//! history, context and the user query.

pub mod composer;
pub mod templates;

pub use composer::{render_context, render_history, Institution, PromptComposer, TemplateVariant};
