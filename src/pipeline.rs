use chrono::Utc;

use crate::chooser::{self, Chooser};
use crate::config::RunConfig;
use crate::error::PipelineError;
use crate::github::{build_query, normalize, PullRequest, PullRequestSource, SearchResults};
use crate::preview::PreviewMaterializer;
use crate::ranking;

/// How a run that did not fail ended
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Selected(PullRequest),
    /// The search matched nothing usable; the chooser never ran
    NoPullRequests,
    /// The user closed the chooser without picking
    NoSelection,
}

/// Authenticate, fetch, normalize, rank, materialize, select, resolve.
///
/// Preview files are removed before `run` returns, on every path.
pub struct Pipeline<S, C> {
    config: RunConfig,
    source: S,
    chooser: C,
}

impl<S: PullRequestSource, C: Chooser> Pipeline<S, C> {
    pub fn new(config: RunConfig, source: S, chooser: C) -> Self {
        Self {
            config,
            source,
            chooser,
        }
    }

    pub async fn run(&self) -> Result<Outcome, PipelineError> {
        let login = self.source.authenticate().await?;
        log::info!("Authenticated as {}", login);

        let query = build_query(&login, &self.config.scope);
        let results = self.source.search(&query).await?;

        let mut prs = normalize_results(&results);
        if prs.is_empty() {
            return Ok(Outcome::NoPullRequests);
        }
        ranking::rank(&mut prs);

        self.select(&prs)
    }

    fn select(&self, prs: &[PullRequest]) -> Result<Outcome, PipelineError> {
        let now = Utc::now();
        PreviewMaterializer::scoped(
            self.config.preview_root.clone(),
            self.config.use_colors,
            |previews| {
                let (lines, index) = previews.materialize(prs, now)?;

                let Some(path) = chooser::select(&self.chooser, &lines)? else {
                    return Ok(Outcome::NoSelection);
                };

                match index.resolve(&path) {
                    Some(pr) => Ok(Outcome::Selected(pr.clone())),
                    None => {
                        log::warn!("Chooser returned unknown entry {}", path.display());
                        Ok(Outcome::NoSelection)
                    }
                }
            },
        )
    }
}

/// Normalize every item, skipping (and logging) the malformed ones
pub fn normalize_results(results: &SearchResults) -> Vec<PullRequest> {
    if results.total_count == 0 {
        return Vec::new();
    }

    results
        .items
        .iter()
        .enumerate()
        .filter_map(|(i, item)| match normalize(item) {
            Ok(pr) => Some(pr),
            Err(e) => {
                log::warn!("Skipping search result {}: {}", i + 1, e);
                None
            }
        })
        .collect()
}
