use super::send_json;
use crate::config::SearchConfig;
use crate::provider::SearchProvider;
use async_trait::async_trait;
use scout_core::{ResultMetadata, RetrievalResult, ScoutResult, SourceType};
use serde::Deserialize;
use tracing::{debug, warn};

/// Maximum number of coins looked up per query.
pub const MAX_RESULTS: usize = 3;

#[derive(Debug, Deserialize)]
struct CoinSearchResponse {
    #[serde(default)]
    coins: Vec<CoinHit>,
}

#[derive(Debug, Clone, Deserialize)]
struct CoinHit {
    #[serde(default)]
    id: String,
    #[serde(default)]
    name: String,
    symbol: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CoinMarket {
    #[serde(default)]
    id: String,
    #[serde(default)]
    name: String,
    symbol: Option<String>,
    current_price: Option<f64>,
    price_change_percentage_24h: Option<f64>,
    market_cap: Option<f64>,
    market_cap_rank: Option<u32>,
}

/// Market-data search against a CoinGecko-compatible API.
///
/// Two calls per query: a name search, then a market snapshot for the top
/// hits. When the snapshot call fails the hits are still returned, name only.
pub struct CryptoSearchProvider {
    http: reqwest::Client,
    base_url: String,
}

impl CryptoSearchProvider {
    /// Provider using `http` against the configured CoinGecko root.
    pub fn new(config: &SearchConfig, http: reqwest::Client) -> Self {
        Self {
            http,
            base_url: config.coingecko_base_url().trim_end_matches('/').to_string(),
        }
    }

    async fn request(&self, query: &str) -> ScoutResult<Vec<RetrievalResult>> {
        let search_url = format!("{}/search", self.base_url);
        let found: CoinSearchResponse =
            send_json(self.http.get(&search_url).query(&[("query", query)])).await?;

        let hits: Vec<CoinHit> = found
            .coins
            .into_iter()
            .filter(|c| !c.id.is_empty())
            .take(MAX_RESULTS)
            .collect();

        if hits.is_empty() {
            return Ok(Vec::new());
        }

        let ids = hits
            .iter()
            .map(|c| c.id.as_str())
            .collect::<Vec<_>>()
            .join(",");
        let markets_url = format!("{}/coins/markets", self.base_url);
        let request = self.http.get(&markets_url).query(&[
            ("vs_currency", "usd"),
            ("ids", ids.as_str()),
            ("order", "market_cap_desc"),
            ("sparkline", "false"),
        ]);

        match send_json::<Vec<CoinMarket>>(request).await {
            Ok(markets) => Ok(markets
                .into_iter()
                .filter(|m| !m.id.is_empty())
                .take(MAX_RESULTS)
                .map(|m| self.market_to_result(m))
                .collect()),
            Err(e) => {
                warn!(
                    target: "crypto_search",
                    error = %e,
                    "Market snapshot failed, returning names only"
                );
                Ok(hits.into_iter().map(|h| self.hit_to_result(h)).collect())
            }
        }
    }

    fn coin_url(&self, id: &str) -> String {
        format!("https://www.coingecko.com/en/coins/{id}")
    }

    fn hit_to_result(&self, hit: CoinHit) -> RetrievalResult {
        RetrievalResult::new(
            SourceType::Crypto,
            coin_title(&hit.name, hit.symbol.as_deref()),
            self.coin_url(&hit.id),
            format!("Cryptocurrency: {}", hit.name),
        )
    }

    fn market_to_result(&self, m: CoinMarket) -> RetrievalResult {
        let title = coin_title(&m.name, m.symbol.as_deref());
        let price = m
            .current_price
            .map_or_else(na, |p| format!("${}", format_usd(p)));
        let change = m
            .price_change_percentage_24h
            .map_or_else(na, |c| format!("{c:.2}%"));
        let cap = m
            .market_cap
            .map_or_else(na, |c| format!("${:.2}B", c / 1e9));
        let rank = m.market_cap_rank.map_or_else(na, |r| format!("#{r}"));

        let snippet = format!("Price: {price} | 24h: {change} | Market Cap: {cap}");
        let content = format!(
            "{title}\n\nCurrent Price: {price}\n24h Change: {change}\nMarket Cap: {cap}\nRank: {rank}"
        );

        let metadata = ResultMetadata {
            price: m.current_price,
            change_24h: m.price_change_percentage_24h,
            market_cap: m.market_cap,
            rank: m.market_cap_rank,
            ..Default::default()
        };

        RetrievalResult::new(SourceType::Crypto, title, self.coin_url(&m.id), snippet)
            .with_content(content)
            .with_metadata(metadata)
    }
}

fn na() -> String {
    "N/A".to_string()
}

fn coin_title(name: &str, symbol: Option<&str>) -> String {
    match symbol {
        Some(sym) if !sym.is_empty() => format!("{name} ({})", sym.to_uppercase()),
        _ => name.to_string(),
    }
}

/// Formats a dollar amount with thousands separators.
///
/// Amounts of at least one dollar get two decimals; smaller amounts keep up to
/// six so sub-cent prices stay readable.
pub fn format_usd(value: f64) -> String {
    if value.abs() < 1.0 {
        let s = format!("{value:.6}");
        return s.trim_end_matches('0').trim_end_matches('.').to_string();
    }

    let formatted = format!("{value:.2}");
    let (sign, digits) = match formatted.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", formatted.as_str()),
    };
    let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits, "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!("{sign}{grouped}.{frac_part}")
}

#[async_trait]
impl SearchProvider for CryptoSearchProvider {
    fn source(&self) -> SourceType {
        SourceType::Crypto
    }

    async fn search(&self, query: &str) -> Vec<RetrievalResult> {
        match self.request(query).await {
            Ok(results) => {
                debug!(
                    target: "crypto_search",
                    count = results.len(),
                    "Market-data search finished"
                );
                results
            }
            Err(e) => {
                warn!(target: "crypto_search", error = %e, "Market-data search failed");
                Vec::new()
            }
        }
    }
}
