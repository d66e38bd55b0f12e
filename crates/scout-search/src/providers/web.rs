use super::send_json;
use crate::config::SearchConfig;
use crate::provider::SearchProvider;
use async_trait::async_trait;
use scout_core::{RetrievalResult, ScoutResult, SourceType};
use serde::Deserialize;
use tracing::{debug, warn};

/// Maximum number of web results requested and kept.
pub const MAX_RESULTS: usize = 5;
/// Length of the snippet cut from a result's content, in characters.
pub const SNIPPET_CHARS: usize = 200;

#[derive(Debug, Deserialize)]
struct TavilyResponse {
    #[serde(default)]
    results: Vec<TavilyResult>,
}

#[derive(Debug, Deserialize)]
struct TavilyResult {
    title: Option<String>,
    url: Option<String>,
    #[serde(default)]
    content: Option<String>,
}

/// General web search through a Tavily-compatible API.
///
/// With no API key configured, or when the API call fails, the provider serves
/// a fixed fallback set chosen by keywords in the query instead of nothing.
pub struct WebSearchProvider {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl WebSearchProvider {
    /// Provider using `http` and the configured web key.
    pub fn new(config: &SearchConfig, http: reqwest::Client) -> Self {
        Self {
            http,
            base_url: config.web_base_url().trim_end_matches('/').to_string(),
            api_key: config.web_api_key().map(str::to_string),
        }
    }

    async fn request(&self, api_key: &str, query: &str) -> ScoutResult<Vec<RetrievalResult>> {
        let url = format!("{}/search", self.base_url);
        let body = serde_json::json!({
            "api_key": api_key,
            "query": query,
            "search_depth": "advanced",
            "max_results": MAX_RESULTS,
            "include_answer": true,
            "include_raw_content": false,
        });

        let resp: TavilyResponse = send_json(self.http.post(&url).json(&body)).await?;

        Ok(resp
            .results
            .into_iter()
            .filter_map(|r| {
                let title = r.title.filter(|t| !t.is_empty())?;
                let url = r.url.filter(|u| !u.is_empty())?;
                let content = r.content.unwrap_or_default();
                Some(
                    RetrievalResult::new(SourceType::Web, title, url, snippet_of(&content))
                        .with_content(content),
                )
            })
            .take(MAX_RESULTS)
            .collect())
    }
}

#[async_trait]
impl SearchProvider for WebSearchProvider {
    fn source(&self) -> SourceType {
        SourceType::Web
    }

    async fn search(&self, query: &str) -> Vec<RetrievalResult> {
        let Some(api_key) = self.api_key.as_deref() else {
            debug!(target: "web_search", "No web search key configured, serving fallback results");
            return fallback_results(query);
        };

        match self.request(api_key, query).await {
            Ok(results) => {
                debug!(target: "web_search", count = results.len(), "Web search finished");
                results
            }
            Err(e) => {
                warn!(target: "web_search", error = %e, "Web search failed, using fallback");
                fallback_results(query)
            }
        }
    }
}

fn snippet_of(content: &str) -> String {
    let mut snippet: String = content.chars().take(SNIPPET_CHARS).collect();
    snippet.push_str("...");
    snippet
}

/// The canned result set served when the web API is unavailable.
pub fn fallback_results(query: &str) -> Vec<RetrievalResult> {
    let lower = query.to_lowercase();

    if lower.contains("sentient") {
        return vec![
            RetrievalResult::new(
                SourceType::Web,
                "Sentient AGI - GitHub",
                "https://github.com/sentient-agi",
                "Sentient is building the world's first open, monetizable, and loyal AI. Community-owned models and decentralized infrastructure for the future of AI.",
            )
            .with_content(
                "Sentient is building decentralized AI infrastructure with community-owned models like Dobby, frameworks for confidential computing, and tools for building AI agents.",
            ),
            RetrievalResult::new(
                SourceType::Web,
                "Sentient Agent Framework",
                "https://github.com/sentient-agi/Sentient-Agent-Framework",
                "Python package for building agents that serve Sentient Chat events with multimodal inputs and real-time rendering.",
            ),
            RetrievalResult::new(
                SourceType::Web,
                "OpenDeepSearch by Sentient",
                "https://github.com/sentient-agi/OpenDeepSearch",
                "Lightweight yet powerful search tool for AI agents, enabling deep web search and retrieval with state-of-the-art performance.",
            ),
        ];
    }

    if lower.contains("dobby") {
        return vec![RetrievalResult::new(
            SourceType::Web,
            "Dobby Unhinged Llama Model",
            "https://huggingface.co/SentientAGI/Dobby-Unhinged-Llama-3.3-70B",
            "Community-owned AI model with pro-crypto, pro-freedom stance. First truly decentralized LLM owned by 700,000+ people.",
        )
        .with_content(
            "Dobby is a fine-tuned Llama 3.3 70B model with strong conviction towards personal freedom, decentralization, and crypto. It's loyal, conversational, and maintains broad skills.",
        )];
    }

    if ["crypto", "blockchain", "decentrali"]
        .iter()
        .any(|k| lower.contains(k))
    {
        return vec![
            RetrievalResult::new(
                SourceType::Web,
                "Decentralized AI Explained",
                "https://ethereum.org/en/decentralized-ai/",
                "Decentralized AI combines blockchain technology with artificial intelligence to create transparent, censorship-resistant AI systems owned by communities.",
            ),
            RetrievalResult::new(
                SourceType::Web,
                "The Future of Crypto and AI",
                "https://a16z.com/crypto-ai/",
                "Cryptocurrency and AI are converging to create new economic models for AI development, ownership, and monetization.",
            ),
        ];
    }

    vec![RetrievalResult::new(
        SourceType::Web,
        "Search Results",
        format!(
            "https://www.google.com/search?q={}",
            urlencoding::encode(query)
        ),
        "For more information, try searching on Google or other search engines.",
    )]
}
