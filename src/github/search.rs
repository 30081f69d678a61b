use anyhow::anyhow;
use octocrab::Octocrab;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio_retry::{strategy::ExponentialBackoff, Retry};

use crate::config::Scope;
use crate::error::PipelineError;

/// Page size of the single search request; later pages are never fetched
pub const MAX_RESULTS: u8 = 100;

/// Raw search response: items stay JSON until normalized one by one
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResults {
    pub total_count: u64,
    #[serde(default)]
    pub items: Vec<Value>,
}

#[derive(Serialize)]
struct SearchParams<'a> {
    q: &'a str,
    per_page: u8,
}

/// Build the search query for the user's own pull requests
pub fn build_query(login: &str, scope: &Scope) -> String {
    match scope {
        Scope::All => format!("author:{} is:pr", login),
        Scope::Repository(slug) => format!("author:{} is:pr repo:{}", login, slug),
    }
}

/// Search GitHub for pull requests matching the given query
pub async fn search_prs(client: &Octocrab, query: &str) -> Result<SearchResults, PipelineError> {
    // Retry strategy: exponential backoff with 3 attempts
    let retry_strategy = ExponentialBackoff::from_millis(100)
        .max_delay(std::time::Duration::from_secs(5))
        .take(3);

    let params = &SearchParams {
        q: query,
        per_page: MAX_RESULTS,
    };

    let results = Retry::spawn(retry_strategy, || async {
        client
            .get::<SearchResults, _, _>("/search/issues", Some(params))
            .await
            .map_err(|e| {
                let error_str = format!("{:?}", e);
                if error_str.contains("do not have permission")
                    || error_str.contains("resources do not exist")
                {
                    anyhow!("Repository not found or no access. Check repo name and token permissions (needs 'repo' scope for private repos).")
                } else if error_str.contains("401") || error_str.contains("Bad credentials") {
                    anyhow!("Authentication failed. Your GitHub token may be invalid or expired.")
                } else if error_str.contains("rate limit") || error_str.contains("403") {
                    anyhow!("GitHub API rate limit exceeded. Wait a few minutes and try again.")
                } else {
                    anyhow!("GitHub API error: {}", e)
                }
            })
    })
    .await
    .map_err(|e| PipelineError::Fetch(e.to_string()))?;

    log::debug!(
        "Search '{}' matched {} PRs ({} returned)",
        query,
        results.total_count,
        results.items.len()
    );

    Ok(results)
}
