#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Provider adapters against mocked upstream APIs.

use scout_core::SourceType;
use scout_search::config::DEFAULT_USER_AGENT;
use scout_search::providers::{
    http_client, CryptoSearchProvider, GithubSearchProvider, WebSearchProvider,
};
use scout_search::{Aggregator, SearchConfig, SearchProvider};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer) -> SearchConfig {
    SearchConfig {
        timeout_ms: 2_000,
        web_api_key: Some("tvly-test".into()),
        web_base_url: Some(server.uri()),
        github_base_url: Some(server.uri()),
        coingecko_base_url: Some(server.uri()),
        twitter_base_url: Some(server.uri()),
        ..Default::default()
    }
}

// --- Web ---

#[tokio::test]
async fn test_web_maps_results_and_truncates_snippet() {
    let server = MockServer::start().await;
    let long = "x".repeat(250);
    Mock::given(method("POST"))
        .and(path("/search"))
        .and(body_partial_json(json!({
            "api_key": "tvly-test",
            "query": "rust streams",
            "max_results": 5,
            "search_depth": "advanced"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "answer": "ignored",
            "results": [
                { "title": "One", "url": "https://one.example", "content": long },
                { "title": "Two", "url": "https://two.example", "content": "short" },
                { "url": "https://untitled.example", "content": "dropped" }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = config_for(&server);
    let provider = WebSearchProvider::new(&config, http_client(&config));
    let results = provider.search("rust streams").await;

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].source, SourceType::Web);
    assert_eq!(results[0].snippet.len(), 203);
    assert!(results[0].snippet.ends_with("..."));
    assert_eq!(results[0].content.as_deref(), Some(long.as_str()));
    assert_eq!(results[1].snippet, "short...");
}

#[tokio::test]
async fn test_web_error_status_serves_fallback() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let config = config_for(&server);
    let provider = WebSearchProvider::new(&config, http_client(&config));
    let results = provider.search("blockchain scaling").await;

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].title, "Decentralized AI Explained");
}

#[tokio::test]
async fn test_web_without_key_makes_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "results": [] })))
        .expect(0)
        .mount(&server)
        .await;

    let config = SearchConfig {
        web_api_key: None,
        ..config_for(&server)
    };
    let provider = WebSearchProvider::new(&config, http_client(&config));
    let results = provider.search("weather in lisbon").await;

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].title, "Search Results");
}

#[tokio::test]
async fn test_web_garbage_body_serves_fallback() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>nope</html>"))
        .mount(&server)
        .await;

    let config = config_for(&server);
    let provider = WebSearchProvider::new(&config, http_client(&config));
    assert_eq!(provider.search("dobby").await.len(), 1);
}

// --- GitHub ---

#[tokio::test]
async fn test_github_maps_repositories() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search/repositories"))
        .and(query_param("q", "async runtime"))
        .and(query_param("sort", "stars"))
        .and(query_param("per_page", "5"))
        .and(header("Accept", "application/vnd.github.v3+json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total_count": 2,
            "items": [
                {
                    "full_name": "tokio-rs/tokio",
                    "html_url": "https://github.com/tokio-rs/tokio",
                    "description": "A runtime for writing reliable asynchronous applications",
                    "stargazers_count": 27000,
                    "forks_count": 2400,
                    "language": "Rust",
                    "owner": { "login": "tokio-rs" }
                },
                {
                    "full_name": "smol-rs/smol",
                    "html_url": "https://github.com/smol-rs/smol",
                    "description": null,
                    "stargazers_count": null,
                    "owner": {}
                }
            ]
        })))
        .mount(&server)
        .await;

    let config = config_for(&server);
    let provider = GithubSearchProvider::new(&config, http_client(&config));
    let results = provider.search("async runtime").await;

    assert_eq!(results.len(), 2);
    let tokio_repo = &results[0];
    assert_eq!(tokio_repo.title, "tokio-rs/tokio");
    assert_eq!(tokio_repo.source, SourceType::Github);
    assert!(tokio_repo
        .content
        .as_deref()
        .unwrap()
        .ends_with("Stars: 27000 | Language: Rust | Forks: 2400"));
    let meta = tokio_repo.metadata.as_ref().unwrap();
    assert_eq!(meta.stars, Some(27000));
    assert_eq!(meta.author.as_deref(), Some("tokio-rs"));

    let smol = &results[1];
    assert_eq!(smol.snippet, "No description available");
    assert!(smol.metadata.as_ref().unwrap().stars.is_none());
}

#[tokio::test]
async fn test_github_failure_is_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403).set_body_string("rate limited"))
        .mount(&server)
        .await;

    let config = config_for(&server);
    let provider = GithubSearchProvider::new(&config, http_client(&config));
    assert!(provider.search("anything").await.is_empty());
}

#[tokio::test]
async fn test_invalid_user_agent_falls_back_to_default() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search/repositories"))
        .and(header("user-agent", DEFAULT_USER_AGENT))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{ "full_name": "a/b", "html_url": "https://github.com/a/b" }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = SearchConfig {
        user_agent: "bad\nagent".into(),
        ..config_for(&server)
    };
    let provider = GithubSearchProvider::new(&config, http_client(&config));
    assert_eq!(provider.search("anything").await.len(), 1);
}

#[tokio::test]
async fn test_fallback_client_keeps_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "items": [] }))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let config = SearchConfig {
        timeout_ms: 200,
        user_agent: "bad\nagent".into(),
        ..config_for(&server)
    };
    let client = http_client(&config);
    let started = std::time::Instant::now();
    let sent = client.get(format!("{}/slow", server.uri())).send().await;
    assert!(sent.unwrap_err().is_timeout());
    assert!(started.elapsed() < Duration::from_secs(2));
}

// --- CoinGecko ---

async fn mount_coin_search(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("query", "bitcoin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "coins": [
                { "id": "bitcoin", "name": "Bitcoin", "symbol": "btc" },
                { "id": "wrapped-bitcoin", "name": "Wrapped Bitcoin", "symbol": "wbtc" },
                { "id": "bitcoin-cash", "name": "Bitcoin Cash", "symbol": "bch" },
                { "id": "bitcoin-gold", "name": "Bitcoin Gold", "symbol": "btg" }
            ]
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_crypto_two_step_lookup() {
    let server = MockServer::start().await;
    mount_coin_search(&server).await;
    Mock::given(method("GET"))
        .and(path("/coins/markets"))
        .and(query_param("vs_currency", "usd"))
        .and(query_param("ids", "bitcoin,wrapped-bitcoin,bitcoin-cash"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": "bitcoin", "name": "Bitcoin", "symbol": "btc",
                "current_price": 64000.5, "price_change_percentage_24h": -2.5,
                "market_cap": 1_260_000_000_000.0_f64, "market_cap_rank": 1
            },
            {
                "id": "wrapped-bitcoin", "name": "Wrapped Bitcoin", "symbol": "wbtc",
                "current_price": 63900.0, "price_change_percentage_24h": null,
                "market_cap": null, "market_cap_rank": 20
            }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let config = config_for(&server);
    let provider = CryptoSearchProvider::new(&config, http_client(&config));
    let results = provider.search("bitcoin").await;

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].title, "Bitcoin (BTC)");
    assert_eq!(
        results[0].snippet,
        "Price: $64,000.50 | 24h: -2.50% | Market Cap: $1260.00B"
    );
    let wbtc_meta = results[1].metadata.as_ref().unwrap();
    assert!(wbtc_meta.change_24h.is_none());
    assert_eq!(wbtc_meta.rank, Some(20));
    assert!(results.iter().all(|r| r.source == SourceType::Crypto));
}

#[tokio::test]
async fn test_crypto_details_failure_degrades_to_names() {
    let server = MockServer::start().await;
    mount_coin_search(&server).await;
    Mock::given(method("GET"))
        .and(path("/coins/markets"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let config = config_for(&server);
    let provider = CryptoSearchProvider::new(&config, http_client(&config));
    let results = provider.search("bitcoin").await;

    assert_eq!(results.len(), 3);
    assert_eq!(results[2].title, "Bitcoin Cash (BCH)");
    assert_eq!(results[2].snippet, "Cryptocurrency: Bitcoin Cash");
    assert!(results[2].content.is_none());
}

#[tokio::test]
async fn test_crypto_no_hits_skips_details_call() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "coins": [] })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/coins/markets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let config = config_for(&server);
    let provider = CryptoSearchProvider::new(&config, http_client(&config));
    assert!(provider.search("zzzz").await.is_empty());
}

// --- Aggregation over real adapters ---

#[tokio::test]
async fn test_slow_upstream_is_cut_by_aggregator_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search/repositories"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "items": [] }))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let config = SearchConfig {
        timeout_ms: 150,
        ..config_for(&server)
    };
    let aggregator = Aggregator::from_config(&config);

    let started = std::time::Instant::now();
    let results = aggregator
        .aggregate("eth", &[SourceType::Github, SourceType::Twitter])
        .await;

    assert!(started.elapsed() < Duration::from_secs(2));
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].source, SourceType::Twitter);
}
