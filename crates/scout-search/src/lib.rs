//! Multi-source retrieval for Scout.
//!
//! A query is fanned out to one [`SearchProvider`] per requested
//! [`SourceType`](scout_core::SourceType) by the [`Aggregator`], and the joined
//! results are rendered into a prompt-ready text block by [`build_context`].

/// Concurrent fan-out over providers.
pub mod aggregator;
/// Provider settings.
pub mod config;
/// Prompt context from retrieval results.
pub mod context;
/// The provider trait.
pub mod provider;
/// Provider implementations.
pub mod providers;

pub use aggregator::Aggregator;
pub use config::SearchConfig;
pub use context::build_context;
pub use provider::SearchProvider;
