use crate::config::SearchConfig;
use crate::provider::SearchProvider;
use crate::providers::{
    http_client, CryptoSearchProvider, GithubSearchProvider, TwitterSearchProvider,
    WebSearchProvider,
};
use futures_util::future::join_all;
use scout_core::{RetrievalResult, SourceType};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Fans a query out to the providers of the requested sources and joins the results.
///
/// Every provider call runs concurrently within the caller's task and is bounded
/// by `timeout`; a provider that does not answer in time contributes nothing.
/// Results are concatenated in request order, each provider's own order kept.
pub struct Aggregator {
    providers: Vec<Arc<dyn SearchProvider>>,
    timeout: Duration,
}

impl Aggregator {
    /// Creates an aggregator with no providers.
    pub fn new(timeout: Duration) -> Self {
        Self {
            providers: Vec::new(),
            timeout,
        }
    }

    /// Creates an aggregator with the four built-in providers.
    pub fn from_config(config: &SearchConfig) -> Self {
        let http = http_client(config);
        Self::new(config.timeout())
            .with_provider(Arc::new(WebSearchProvider::new(config, http.clone())))
            .with_provider(Arc::new(GithubSearchProvider::new(config, http.clone())))
            .with_provider(Arc::new(TwitterSearchProvider::new(config)))
            .with_provider(Arc::new(CryptoSearchProvider::new(config, http)))
    }

    /// Registers a provider, replacing any provider already serving its source.
    pub fn with_provider(mut self, provider: Arc<dyn SearchProvider>) -> Self {
        let source = provider.source();
        self.providers.retain(|p| p.source() != source);
        self.providers.push(provider);
        self
    }

    /// Time budget per provider call.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Sources that have a registered provider.
    pub fn sources(&self) -> Vec<SourceType> {
        self.providers.iter().map(|p| p.source()).collect()
    }

    fn provider(&self, source: SourceType) -> Option<&Arc<dyn SearchProvider>> {
        self.providers.iter().find(|p| p.source() == source)
    }

    /// Runs `query` against every requested source and waits for all of them.
    ///
    /// Duplicate sources are queried once. An empty request yields an empty list.
    pub async fn aggregate(&self, query: &str, sources: &[SourceType]) -> Vec<RetrievalResult> {
        let mut requested: Vec<SourceType> = Vec::with_capacity(sources.len());
        for source in sources {
            if !requested.contains(source) {
                requested.push(*source);
            }
        }

        let calls = requested.iter().filter_map(|source| {
            let Some(provider) = self.provider(*source) else {
                debug!(source = %source, "No provider registered for source, skipping");
                return None;
            };
            Some(self.call(*source, provider, query))
        });

        let slots = join_all(calls).await;
        let results: Vec<RetrievalResult> = slots.into_iter().flatten().collect();

        info!(
            sources = ?requested,
            results = results.len(),
            "Aggregation settled"
        );
        results
    }

    async fn call(
        &self,
        source: SourceType,
        provider: &Arc<dyn SearchProvider>,
        query: &str,
    ) -> Vec<RetrievalResult> {
        match tokio::time::timeout(self.timeout, provider.search(query)).await {
            Ok(results) => {
                debug!(source = %source, count = results.len(), "Provider finished");
                results
            }
            Err(_) => {
                warn!(
                    source = %source,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Provider timed out, contributing no results"
                );
                Vec::new()
            }
        }
    }
}
