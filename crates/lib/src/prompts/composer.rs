//! # Prompt Composer
//!
//! Builds the exact text sent to the model from a template variant, the
//! conversation history, a context block and the user query. Composition is a
//! pure function of its inputs.

use super::templates::{
    RESTRICTIVE_PROMPT, SYSTEM_SPLIT_SYSTEM_PROMPT, SYSTEM_SPLIT_USER_PROMPT,
    UNRESTRICTED_INTERNAL_PROMPT,
};
use crate::types::{ComposedPrompt, ConversationTurn};
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr, sync::LazyLock};

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([a-z_]+)\}").expect("placeholder regex is valid"));

/// The instruction and formatting policy used to compose a prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateVariant {
    /// Public information about the institution only; refuses unrelated queries.
    /// Uses the corpus blob as context and ignores history.
    Restrictive,
    /// Internal assistant with history, retrieved context and query in one string.
    UnrestrictedInternal,
    /// History in a separate system instruction; context and query in the user turn.
    SystemSplit,
}

impl TemplateVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateVariant::Restrictive => "restrictive",
            TemplateVariant::UnrestrictedInternal => "unrestricted_internal",
            TemplateVariant::SystemSplit => "system_split",
        }
    }
}

impl fmt::Display for TemplateVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TemplateVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "restrictive" => Ok(TemplateVariant::Restrictive),
            "unrestricted_internal" | "internal" => Ok(TemplateVariant::UnrestrictedInternal),
            "system_split" | "split" => Ok(TemplateVariant::SystemSplit),
            other => Err(format!("unknown template variant '{other}'")),
        }
    }
}

/// The institution the assistant speaks for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Institution {
    pub name: String,
    pub short_name: String,
    pub country: String,
}

impl Default for Institution {
    fn default() -> Self {
        Self {
            name: "Petroleum Training Institute".to_string(),
            short_name: "PTI".to_string(),
            country: "Nigeria".to_string(),
        }
    }
}

/// Renders history as `role: content` lines in chronological order.
pub fn render_history(history: &[ConversationTurn]) -> String {
    history
        .iter()
        .map(|turn| format!("{}: {}", turn.role, turn.content))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Renders retrieved snippets as one context block, separated by blank lines.
pub fn render_context(snippets: &[String]) -> String {
    snippets
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Fills `{key}` placeholders in one pass. Unknown keys are left untouched.
fn fill(template: &str, values: &[(&str, &str)]) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures| {
            let key = &caps[1];
            values
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| (*v).to_string())
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Composes model input for every template variant.
#[derive(Debug, Clone, Default)]
pub struct PromptComposer {
    institution: Institution,
}

impl PromptComposer {
    pub fn new(institution: Institution) -> Self {
        Self { institution }
    }

    pub fn institution(&self) -> &Institution {
        &self.institution
    }

    /// Builds the prompt for `variant`.
    ///
    /// The sections always appear in the same order: instruction, history,
    /// context, question. Empty history or context render as empty sections.
    pub fn compose(
        &self,
        variant: TemplateVariant,
        history: &[ConversationTurn],
        context: &str,
        query: &str,
    ) -> ComposedPrompt {
        let history = render_history(history);
        let values = [
            ("institution", self.institution.name.as_str()),
            ("short_name", self.institution.short_name.as_str()),
            ("country", self.institution.country.as_str()),
            ("history", history.as_str()),
            ("context", context),
            ("prompt", query),
        ];

        match variant {
            TemplateVariant::Restrictive => ComposedPrompt {
                system: None,
                user: fill(RESTRICTIVE_PROMPT, &values),
            },
            TemplateVariant::UnrestrictedInternal => ComposedPrompt {
                system: None,
                user: fill(UNRESTRICTED_INTERNAL_PROMPT, &values),
            },
            TemplateVariant::SystemSplit => ComposedPrompt {
                system: Some(fill(SYSTEM_SPLIT_SYSTEM_PROMPT, &values)),
                user: fill(SYSTEM_SPLIT_USER_PROMPT, &values),
            },
        }
    }
}
