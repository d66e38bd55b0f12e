//! Search provider adapters, one per source.

/// CoinGecko market data.
pub mod crypto;
/// GitHub repository search.
pub mod github;
/// Social search link.
pub mod twitter;
/// Tavily web search with an offline fallback set.
pub mod web;

pub use crypto::CryptoSearchProvider;
pub use github::GithubSearchProvider;
pub use twitter::TwitterSearchProvider;
pub use web::WebSearchProvider;

use crate::config::{SearchConfig, DEFAULT_USER_AGENT};
use scout_core::{ScoutError, ScoutResult};
use serde::de::DeserializeOwned;
use tracing::warn;

/// Builds the HTTP client shared by all providers.
///
/// A user agent that is not a valid header value is replaced by
/// [`DEFAULT_USER_AGENT`]; the timeout is always kept.
pub fn http_client(config: &SearchConfig) -> reqwest::Client {
    let built = reqwest::Client::builder()
        .timeout(config.timeout())
        .user_agent(&config.user_agent)
        .build();
    match built {
        Ok(client) => client,
        Err(e) => {
            warn!(
                target: "search",
                error = %e,
                user_agent = %config.user_agent,
                "Invalid HTTP client settings, using the default user agent"
            );
            reqwest::Client::builder()
                .timeout(config.timeout())
                .user_agent(DEFAULT_USER_AGENT)
                .build()
                .unwrap_or_default()
        }
    }
}

/// Sends a request and decodes a JSON body, mapping non-success statuses to
/// [`ScoutError::Upstream`].
pub(crate) async fn send_json<T: DeserializeOwned>(
    request: reqwest::RequestBuilder,
) -> ScoutResult<T> {
    let resp = request
        .send()
        .await
        .map_err(|e| ScoutError::Http(e.to_string()))?;

    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(ScoutError::Upstream {
            status: status.as_u16(),
            body,
        });
    }

    resp.json::<T>()
        .await
        .map_err(|e| ScoutError::Search(format!("Failed to decode response: {e}")))
}
