use crate::{errors::PromptError, retrieval::Retriever, types::RetrievalResult};
use async_trait::async_trait;
use reqwest::Client as ReqwestClient;
use serde::Serialize;
use std::fmt::Debug;
use tracing::{debug, info};

#[derive(Serialize)]
struct RetrieveRequest<'a> {
    query: &'a str,
    top_k: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    index: Option<&'a str>,
}

/// A client for a managed retrieval index reached over HTTP.
///
/// The endpoint accepts `{"query", "top_k", "index"?}` and answers with
/// `{"snippets": [...], "answer": "..."}`.
#[derive(Clone)]
pub struct ManagedIndexRetriever {
    client: ReqwestClient,
    api_url: String,
    api_key: Option<String>,
    index_name: Option<String>,
}

impl Debug for ManagedIndexRetriever {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManagedIndexRetriever")
            .field("api_url", &self.api_url)
            .field("index_name", &self.index_name)
            .finish_non_exhaustive()
    }
}

impl ManagedIndexRetriever {
    pub fn new(
        api_url: String,
        api_key: Option<String>,
        index_name: Option<String>,
    ) -> Result<Self, PromptError> {
        let client = ReqwestClient::builder()
            .build()
            .map_err(PromptError::ReqwestClientBuild)?;
        Ok(Self {
            client,
            api_url,
            api_key,
            index_name,
        })
    }
}

#[async_trait]
impl Retriever for ManagedIndexRetriever {
    async fn retrieve(&self, query: &str, top_k: usize) -> Result<RetrievalResult, PromptError> {
        info!(top_k, "Querying managed retrieval index.");

        let request_body = RetrieveRequest {
            query,
            top_k,
            index: self.index_name.as_deref(),
        };

        let mut request_builder = self.client.post(&self.api_url);
        if let Some(key) = &self.api_key {
            request_builder = request_builder.bearer_auth(key);
        }

        let response = request_builder
            .json(&request_body)
            .send()
            .await
            .map_err(PromptError::RetrievalRequest)?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(PromptError::RetrievalApi(format!(
                "status {status}: {error_text}"
            )));
        }

        let mut result: RetrievalResult = response
            .json()
            .await
            .map_err(PromptError::RetrievalRequest)?;
        result.snippets.truncate(top_k);

        debug!(snippets = result.snippets.len(), "<-- Retrieval index response");
        Ok(result)
    }
}
