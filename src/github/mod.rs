pub mod client;
pub mod search;
pub mod types;

use async_trait::async_trait;
use octocrab::Octocrab;

use crate::error::PipelineError;

pub use client::{create_client, current_login};
pub use search::{build_query, search_prs, SearchResults, MAX_RESULTS};
pub use types::{normalize, MalformedRecord, PrState, PullRequest, StatusLabel};

/// Where pull requests come from: the GitHub API in production, a stub in tests.
#[async_trait]
pub trait PullRequestSource: Send + Sync {
    /// Exchange the credential for the acting user's login
    async fn authenticate(&self) -> Result<String, PipelineError>;

    /// Run one search query, first page only
    async fn search(&self, query: &str) -> Result<SearchResults, PipelineError>;
}

#[async_trait]
impl PullRequestSource for Octocrab {
    async fn authenticate(&self) -> Result<String, PipelineError> {
        current_login(self).await
    }

    async fn search(&self, query: &str) -> Result<SearchResults, PipelineError> {
        search_prs(self, query).await
    }
}
