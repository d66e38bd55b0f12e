use super::send_json;
use crate::config::SearchConfig;
use crate::provider::SearchProvider;
use async_trait::async_trait;
use scout_core::{ResultMetadata, RetrievalResult, ScoutResult, SourceType};
use serde::Deserialize;
use tracing::{debug, warn};

/// Maximum number of repositories requested and kept.
pub const MAX_RESULTS: usize = 5;

#[derive(Debug, Deserialize)]
struct RepoSearchResponse {
    #[serde(default)]
    items: Vec<Repo>,
}

#[derive(Debug, Deserialize)]
struct Repo {
    full_name: Option<String>,
    html_url: Option<String>,
    description: Option<String>,
    stargazers_count: Option<u64>,
    forks_count: Option<u64>,
    language: Option<String>,
    owner: Option<Owner>,
}

#[derive(Debug, Deserialize)]
struct Owner {
    login: Option<String>,
}

/// Repository search on a GitHub-compatible API, sorted by stars.
pub struct GithubSearchProvider {
    http: reqwest::Client,
    base_url: String,
}

impl GithubSearchProvider {
    /// Provider using `http` against the configured GitHub root.
    pub fn new(config: &SearchConfig, http: reqwest::Client) -> Self {
        Self {
            http,
            base_url: config.github_base_url().trim_end_matches('/').to_string(),
        }
    }

    async fn request(&self, query: &str) -> ScoutResult<Vec<RetrievalResult>> {
        let url = format!("{}/search/repositories", self.base_url);
        let per_page = MAX_RESULTS.to_string();
        let request = self
            .http
            .get(&url)
            .query(&[("q", query), ("sort", "stars"), ("per_page", &per_page)])
            .header("Accept", "application/vnd.github.v3+json");

        let resp: RepoSearchResponse = send_json(request).await?;

        Ok(resp
            .items
            .into_iter()
            .filter_map(repo_to_result)
            .take(MAX_RESULTS)
            .collect())
    }
}

fn repo_to_result(repo: Repo) -> Option<RetrievalResult> {
    let title = repo.full_name.filter(|n| !n.is_empty())?;
    let url = repo.html_url.filter(|u| !u.is_empty())?;
    let description = repo.description.filter(|d| !d.is_empty());

    let content = format!(
        "{}\n\nStars: {} | Language: {} | Forks: {}",
        description.as_deref().unwrap_or_default(),
        display_count(repo.stargazers_count),
        repo.language.as_deref().unwrap_or("N/A"),
        display_count(repo.forks_count),
    );

    let metadata = ResultMetadata {
        stars: repo.stargazers_count,
        forks: repo.forks_count,
        language: repo.language,
        author: repo.owner.and_then(|o| o.login),
        ..Default::default()
    };

    let snippet = description.unwrap_or_else(|| "No description available".to_string());

    Some(
        RetrievalResult::new(SourceType::Github, title, url, snippet)
            .with_content(content)
            .with_metadata(metadata),
    )
}

fn display_count(count: Option<u64>) -> String {
    count.map_or_else(|| "N/A".to_string(), |c| c.to_string())
}

#[async_trait]
impl SearchProvider for GithubSearchProvider {
    fn source(&self) -> SourceType {
        SourceType::Github
    }

    async fn search(&self, query: &str) -> Vec<RetrievalResult> {
        match self.request(query).await {
            Ok(results) => {
                debug!(
                    target: "github_search",
                    count = results.len(),
                    "Repository search finished"
                );
                results
            }
            Err(e) => {
                warn!(target: "github_search", error = %e, "Repository search failed");
                Vec::new()
            }
        }
    }
}
