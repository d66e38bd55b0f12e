use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Settings shared by the search providers and the aggregator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Per-provider time budget; a provider exceeding it contributes nothing.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Web search API key. Without one the web provider serves its fallback set.
    #[serde(default)]
    pub web_api_key: Option<String>,
    /// Web search API root. Defaults to Tavily.
    pub web_base_url: Option<String>,
    /// GitHub REST API root.
    pub github_base_url: Option<String>,
    /// CoinGecko API root, including the version path.
    pub coingecko_base_url: Option<String>,
    /// Root of the social search links.
    pub twitter_base_url: Option<String>,
    /// Sent with every provider request; GitHub rejects requests without one.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_timeout_ms() -> u64 {
    8_000
}

/// User agent used when none is configured, or the configured one is not a
/// valid header value.
pub const DEFAULT_USER_AGENT: &str = "Scout-Research-Assistant";

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            web_api_key: None,
            web_base_url: None,
            github_base_url: None,
            coingecko_base_url: None,
            twitter_base_url: None,
            user_agent: default_user_agent(),
        }
    }
}

impl SearchConfig {
    /// Per-provider time budget.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Effective web API root.
    pub fn web_base_url(&self) -> &str {
        self.web_base_url
            .as_deref()
            .unwrap_or("https://api.tavily.com")
    }

    /// Effective github API root.
    pub fn github_base_url(&self) -> &str {
        self.github_base_url
            .as_deref()
            .unwrap_or("https://api.github.com")
    }

    /// Effective coingecko API root.
    pub fn coingecko_base_url(&self) -> &str {
        self.coingecko_base_url
            .as_deref()
            .unwrap_or("https://api.coingecko.com/api/v3")
    }

    /// Effective twitter API root.
    pub fn twitter_base_url(&self) -> &str {
        self.twitter_base_url
            .as_deref()
            .unwrap_or("https://twitter.com")
    }

    /// The configured web key, ignoring blank values.
    pub fn web_api_key(&self) -> Option<&str> {
        self.web_api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }
}
