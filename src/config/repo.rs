use std::fmt;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use git2::Repository;

/// A GitHub repository as "owner/name"
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoSlug {
    pub owner: String,
    pub name: String,
}

impl fmt::Display for RepoSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Find the GitHub repository behind the `origin` remote of the git
/// repository enclosing `dir`. Returns `Ok(None)` outside any git repository.
pub fn detect_current_repo(dir: &Path) -> Result<Option<RepoSlug>> {
    let repo = match Repository::discover(dir) {
        Ok(repo) => repo,
        Err(_) => return Ok(None),
    };

    let remote = repo
        .find_remote("origin")
        .context("No 'origin' remote found")?;
    let url = remote.url().context("No URL found for origin remote")?;

    parse_remote_url(url).map(Some)
}

/// Parse SSH (`git@github.com:owner/repo.git`) and HTTPS
/// (`https://github.com/owner/repo.git`) remote URLs.
pub fn parse_remote_url(url: &str) -> Result<RepoSlug> {
    let repo_path = if let Some((_, rest)) = url.split_once("github.com:") {
        rest
    } else if let Some((_, rest)) = url.split_once("github.com/") {
        rest
    } else {
        return Err(anyhow!("Not a GitHub repository URL: {}", url));
    };

    let repo_path = repo_path.trim_end_matches('/').trim_end_matches(".git");
    let mut parts = repo_path.split('/').filter(|s| !s.is_empty());
    match (parts.next(), parts.next()) {
        (Some(owner), Some(name)) => Ok(RepoSlug {
            owner: owner.to_string(),
            name: name.to_string(),
        }),
        _ => Err(anyhow!("Invalid GitHub repository format: {}", repo_path)),
    }
}
