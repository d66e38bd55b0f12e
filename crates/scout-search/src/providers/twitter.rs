use crate::config::SearchConfig;
use crate::provider::SearchProvider;
use async_trait::async_trait;
use scout_core::{RetrievalResult, SourceType};

/// Social search in link-only mode.
///
/// There is no API integration: the provider always answers with a single
/// result pointing at the live search page for the query.
pub struct TwitterSearchProvider {
    base_url: String,
}

impl TwitterSearchProvider {
    /// Provider linking to the configured social search.
    pub fn new(config: &SearchConfig) -> Self {
        Self {
            base_url: config.twitter_base_url().trim_end_matches('/').to_string(),
        }
    }

    /// URL of the live search page for `query`.
    pub fn search_url(&self, query: &str) -> String {
        format!(
            "{}/search?q={}&src=typed_query&f=live",
            self.base_url,
            urlencoding::encode(query)
        )
    }
}

#[async_trait]
impl SearchProvider for TwitterSearchProvider {
    fn source(&self) -> SourceType {
        SourceType::Twitter
    }

    async fn search(&self, query: &str) -> Vec<RetrievalResult> {
        vec![RetrievalResult::new(
            SourceType::Twitter,
            format!("Twitter Search: {query}"),
            self.search_url(query),
            format!("Search Twitter for recent discussions about \"{query}\". Click to view live results."),
        )
        .with_content(format!(
            "Twitter search results for \"{query}\". This will show you the latest tweets and discussions."
        ))]
    }
}
