//! # Corpus Loading
//!
//! The corpus is the pre-scraped collection of institutional pages, persisted
//! as a JSON array of `{"url": ..., "markdown": ...}` records by an offline
//! scrape step. It is read once at startup and shared read-only afterwards.

use crate::errors::PromptError;
use serde::{Deserialize, Deserializer, Serialize};
use std::{fs, path::Path};
use tracing::{debug, info};

/// A single scraped page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusEntry {
    #[serde(default, alias = "source")]
    pub url: String,
    /// A scrape that yielded no text is stored as `null` and loads as empty.
    #[serde(alias = "text", deserialize_with = "null_as_empty")]
    pub markdown: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl CorpusEntry {
    pub fn new(url: impl Into<String>, markdown: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            markdown: markdown.into(),
        }
    }

    /// The entry as a context block, tagged with its source url when known.
    pub fn render(&self) -> String {
        if self.url.is_empty() {
            format!("content: {}", self.markdown)
        } else {
            format!("url: {}\ncontent: {}", self.url, self.markdown)
        }
    }
}

/// The ordered, immutable collection of corpus entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Corpus {
    entries: Vec<CorpusEntry>,
}

impl Corpus {
    pub fn from_entries(entries: Vec<CorpusEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[CorpusEntry] {
        &self.entries
    }

    /// The text of every entry, in file order.
    pub fn texts(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.markdown.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of characters across all entry texts.
    pub fn total_chars(&self) -> usize {
        self.entries.iter().map(|e| e.markdown.chars().count()).sum()
    }

    /// Renders the whole corpus as one knowledge blob, tagging each page with
    /// its source url.
    pub fn render_with_sources(&self) -> String {
        self.entries
            .iter()
            .map(CorpusEntry::render)
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Writes the rendered knowledge blob to a plain-text file.
    pub fn flatten_to(&self, path: impl AsRef<Path>) -> Result<(), PromptError> {
        let path = path.as_ref();
        fs::write(path, self.render_with_sources()).map_err(|e| unavailable(path, e))?;
        info!(path = %path.display(), entries = self.len(), "Flattened corpus to text file.");
        Ok(())
    }
}

fn unavailable(path: &Path, reason: impl ToString) -> PromptError {
    PromptError::CorpusUnavailable {
        path: path.display().to_string(),
        reason: reason.to_string(),
    }
}

/// Loads a corpus from a JSON file.
///
/// Fails with `PromptError::CorpusUnavailable` if the file is missing, cannot be
/// read, or is not a JSON array of records carrying a `markdown` (or `text`) field.
pub fn load_corpus(path: impl AsRef<Path>) -> Result<Corpus, PromptError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(unavailable(path, "file does not exist"));
    }

    let raw = fs::read_to_string(path).map_err(|e| unavailable(path, e))?;
    let entries: Vec<CorpusEntry> =
        serde_json::from_str(&raw).map_err(|e| unavailable(path, e))?;

    debug!(path = %path.display(), entries = entries.len(), "Parsed corpus file.");
    Ok(Corpus::from_entries(entries))
}

/// Persists a corpus as pretty-printed JSON, the format `load_corpus` reads.
pub fn save_corpus(path: impl AsRef<Path>, corpus: &Corpus) -> Result<(), PromptError> {
    let path = path.as_ref();
    let json = serde_json::to_string_pretty(corpus.entries())?;
    fs::write(path, json).map_err(|e| unavailable(path, e))?;
    Ok(())
}
