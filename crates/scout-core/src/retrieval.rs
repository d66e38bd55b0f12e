use serde::{Deserialize, Serialize};
use std::fmt;

/// The closed set of information sources a query can be fanned out to.
///
/// The serialized names are the ones clients send in `sources`. On input a few
/// aliases are accepted, and any unrecognized name falls back to [`SourceType::Web`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum SourceType {
    /// General web search.
    #[default]
    Web,
    /// Code-hosting search (repositories).
    Github,
    /// Social search.
    Twitter,
    /// Market-data search (crypto assets).
    Crypto,
}

impl SourceType {
    /// Every source, in canonical order.
    pub const ALL: [SourceType; 4] = [
        SourceType::Web,
        SourceType::Github,
        SourceType::Twitter,
        SourceType::Crypto,
    ];

    /// Wire name of the source.
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceType::Web => "web",
            SourceType::Github => "github",
            SourceType::Twitter => "twitter",
            SourceType::Crypto => "crypto",
        }
    }

    /// Human label used for context section headers ("Web", "Github", ...).
    pub fn label(&self) -> &'static str {
        match self {
            SourceType::Web => "Web",
            SourceType::Github => "Github",
            SourceType::Twitter => "Twitter",
            SourceType::Crypto => "Crypto",
        }
    }

    /// Parses a source name, mapping unknown names to `Web`.
    pub fn parse_lenient(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "github" | "code" | "code-host" => SourceType::Github,
            "twitter" | "social" | "x" => SourceType::Twitter,
            "crypto" | "market" | "market-data" => SourceType::Crypto,
            _ => SourceType::Web,
        }
    }
}

impl From<String> for SourceType {
    fn from(name: String) -> Self {
        SourceType::parse_lenient(&name)
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Provider-specific fields attached to a result.
///
/// Opaque to aggregation and context building; only presentation reads them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultMetadata {
    /// Repository stars.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stars: Option<u64>,
    /// Primary repository language.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Repository owner.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// Repository forks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forks: Option<u64>,
    /// Price in USD.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    /// 24h price change, percent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change_24h: Option<f64>,
    /// Market capitalization in USD.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market_cap: Option<f64>,
    /// Market-cap rank.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rank: Option<u32>,
}

/// One normalized hit from any search provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalResult {
    /// Display title.
    pub title: String,
    /// Canonical link to the original resource.
    pub url: String,
    /// Short excerpt, possibly truncated.
    pub snippet: String,
    /// Longer text preferred over `snippet` when building context.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Authoritative grouping tag; defaults to `web` when absent.
    #[serde(default)]
    pub source: SourceType,
    /// Source-specific numbers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ResultMetadata>,
}

impl RetrievalResult {
    /// Creates a result with no content and no metadata.
    pub fn new(
        source: SourceType,
        title: impl Into<String>,
        url: impl Into<String>,
        snippet: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            snippet: snippet.into(),
            content: None,
            source,
            metadata: None,
        }
    }

    /// Attaches the full text.
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Attaches source-specific metadata.
    pub fn with_metadata(mut self, metadata: ResultMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Text used for context building: `content` when present and non-empty, else `snippet`.
    pub fn body(&self) -> &str {
        match self.content.as_deref() {
            Some(content) if !content.is_empty() => content,
            _ => &self.snippet,
        }
    }
}

/// The subset of a [`RetrievalResult`] sent to clients and stored with answers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRef {
    /// Display title.
    pub title: String,
    /// Link to the source.
    pub url: String,
    /// Short excerpt.
    pub snippet: String,
    /// Provider that produced it.
    #[serde(default)]
    pub source: SourceType,
}

impl From<&RetrievalResult> for SourceRef {
    fn from(result: &RetrievalResult) -> Self {
        Self {
            title: result.title.clone(),
            url: result.url.clone(),
            snippet: result.snippet.clone(),
            source: result.source,
        }
    }
}
