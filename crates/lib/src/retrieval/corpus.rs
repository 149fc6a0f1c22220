use crate::{corpus::Corpus, errors::PromptError, retrieval::Retriever, types::RetrievalResult};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Words too common to say anything about relevance.
const STOP_WORDS: &[&str] = &[
    "about", "and", "are", "can", "does", "for", "from", "has", "have", "how", "the", "their",
    "there", "this", "that", "was", "what", "when", "where", "which", "who", "why", "with", "you",
];

fn query_terms(query: &str) -> Vec<String> {
    let mut terms: Vec<String> = query
        .split(|c: char| !c.is_alphanumeric())
        .map(str::to_lowercase)
        .filter(|t| t.chars().count() >= 3 && !STOP_WORDS.contains(&t.as_str()))
        .collect();
    terms.sort();
    terms.dedup();
    terms
}

/// An offline retriever ranking corpus entries by keyword overlap with the query.
///
/// Each query term scores one point per occurrence in the entry text. Entries
/// without any match are dropped; ties keep corpus order. There is no
/// index-native answer, so `answer` is always empty.
#[derive(Debug, Clone)]
pub struct CorpusRetriever {
    corpus: Arc<Corpus>,
}

impl CorpusRetriever {
    pub fn new(corpus: Arc<Corpus>) -> Self {
        Self { corpus }
    }
}

#[async_trait]
impl Retriever for CorpusRetriever {
    async fn retrieve(&self, query: &str, top_k: usize) -> Result<RetrievalResult, PromptError> {
        let terms = query_terms(query);
        if terms.is_empty() || top_k == 0 {
            return Ok(RetrievalResult::default());
        }

        let mut scored: Vec<(usize, usize)> = self
            .corpus
            .entries()
            .iter()
            .enumerate()
            .filter_map(|(index, entry)| {
                let haystack = entry.markdown.to_lowercase();
                let score: usize = terms
                    .iter()
                    .map(|term| haystack.matches(term.as_str()).count())
                    .sum();
                (score > 0).then_some((index, score))
            })
            .collect();

        // `sort_by` is stable, so equal scores stay in corpus order.
        scored.sort_by(|a, b| b.1.cmp(&a.1));

        let entries = self.corpus.entries();
        let snippets: Vec<String> = scored
            .into_iter()
            .take(top_k)
            .map(|(index, _)| entries[index].render())
            .collect();

        debug!(terms = ?terms, matches = snippets.len(), "Keyword retrieval over corpus.");
        Ok(RetrievalResult {
            snippets,
            answer: String::new(),
        })
    }
}
