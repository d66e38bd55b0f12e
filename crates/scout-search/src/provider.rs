use async_trait::async_trait;
use scout_core::{RetrievalResult, SourceType};

/// Trait for search provider adapters.
///
/// Each provider (web, code-host, social, market-data) implements this trait
/// to turn a free-text query into a bounded list of normalized results.
///
/// `search` never fails: transport, status and parse failures are logged inside
/// the adapter and degrade to an empty list (or a documented fallback set).
///
/// To add a new provider:
/// 1. Create a new module in `providers/`
/// 2. Implement `SearchProvider` for your struct
/// 3. Add the variant to `SourceType` in `scout-core`
/// 4. Register it in `Aggregator::from_config()`
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// The source this provider produces results for.
    fn source(&self) -> SourceType;

    /// Runs the query against the provider.
    async fn search(&self, query: &str) -> Vec<RetrievalResult>;
}
