//! Preview files: one markdown file per PR body, read by the previewer the
//! chooser runs. All files live in one temporary directory per run, which is
//! removed exactly once when the run ends.

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tempfile::{Builder, TempDir};

use crate::error::PipelineError;
use crate::github::types::PullRequest;
use crate::output::ProtocolLine;

const DIR_PREFIX: &str = "pr-pick-";

/// Maps preview file paths back to the PR they were written for
#[derive(Debug, Default)]
pub struct SelectionIndex<'a> {
    entries: HashMap<PathBuf, &'a PullRequest>,
}

impl<'a> SelectionIndex<'a> {
    pub fn resolve(&self, path: &Path) -> Option<&'a PullRequest> {
        self.entries.get(path).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Owns the run's preview directory.
///
/// The directory is created lazily by the first [`materialize`] call and
/// removed by [`release_all`]; dropping an unreleased materializer removes it
/// too, so error paths never leak files.
///
/// [`materialize`]: PreviewMaterializer::materialize
/// [`release_all`]: PreviewMaterializer::release_all
#[derive(Debug)]
pub struct PreviewMaterializer {
    root: Option<PathBuf>,
    dir: Option<TempDir>,
    use_colors: bool,
}

impl PreviewMaterializer {
    /// `root` is the parent for the preview directory, the system temp dir when `None`
    pub fn new(root: Option<PathBuf>, use_colors: bool) -> Self {
        Self {
            root,
            dir: None,
            use_colors,
        }
    }

    /// Run `f` with a fresh materializer and release it afterwards, whatever `f` returned.
    ///
    /// An error from `f` takes precedence over a cleanup error.
    pub fn scoped<T, F>(root: Option<PathBuf>, use_colors: bool, f: F) -> Result<T, PipelineError>
    where
        F: FnOnce(&mut PreviewMaterializer) -> Result<T, PipelineError>,
    {
        let mut materializer = Self::new(root, use_colors);
        let result = f(&mut materializer);
        let released = materializer.release_all();
        let value = result?;
        released?;
        Ok(value)
    }

    /// Path of the preview directory, once created
    pub fn dir_path(&self) -> Option<&Path> {
        self.dir.as_ref().map(TempDir::path)
    }

    /// Write one preview file per PR, in order, and build the chooser lines
    /// and the index resolving them. Any write failure aborts the whole batch.
    pub fn materialize<'a>(
        &mut self,
        prs: &'a [PullRequest],
        now: DateTime<Utc>,
    ) -> Result<(Vec<ProtocolLine>, SelectionIndex<'a>), PipelineError> {
        let mut lines = Vec::with_capacity(prs.len());
        let mut index = SelectionIndex::default();

        for pr in prs {
            let path = self.write_preview(pr)?;
            lines.push(ProtocolLine::new(path.clone(), pr, now, self.use_colors));
            index.entries.insert(path, pr);
        }

        log::debug!("Materialized {} preview files", index.len());
        Ok((lines, index))
    }

    /// Remove the preview directory and everything in it. Later calls are no-ops.
    pub fn release_all(&mut self) -> Result<(), PipelineError> {
        let Some(dir) = self.dir.take() else {
            return Ok(());
        };
        let path = dir.path().to_path_buf();
        dir.close()
            .map_err(|source| PipelineError::Cleanup { path: path.clone(), source })?;
        log::debug!("Removed preview directory {}", path.display());
        Ok(())
    }

    fn ensure_dir(&mut self) -> Result<PathBuf, PipelineError> {
        if let Some(dir) = &self.dir {
            return Ok(dir.path().to_path_buf());
        }

        let mut builder = Builder::new();
        builder.prefix(DIR_PREFIX);
        let created = match &self.root {
            Some(root) => builder.tempdir_in(root),
            None => builder.tempdir(),
        };
        let dir = created.map_err(|source| PipelineError::Materialization {
            path: self.root.clone().unwrap_or_else(std::env::temp_dir),
            source,
        })?;
        log::debug!("Created preview directory {}", dir.path().display());

        let path = dir.path().to_path_buf();
        self.dir = Some(dir);
        Ok(path)
    }

    fn write_preview(&mut self, pr: &PullRequest) -> Result<PathBuf, PipelineError> {
        let prefix = format!("{}_{}_", pr.display_repo().replace('/', "_"), pr.number);
        let dir = self.ensure_dir()?;
        let intended = dir.join(format!("{}.md", prefix));
        let failed = |source| PipelineError::Materialization {
            path: intended.clone(),
            source,
        };

        // Random suffix keeps names unique even if two repos sanitize alike
        let mut file = Builder::new()
            .prefix(&prefix)
            .suffix(".md")
            .tempfile_in(&dir)
            .map_err(failed)?;
        file.write_all(pr.body.as_bytes()).map_err(failed)?;
        file.flush().map_err(failed)?;

        file.into_temp_path()
            .keep()
            .map_err(|e| PipelineError::Materialization {
                path: intended.clone(),
                source: e.error,
            })
    }
}

impl Drop for PreviewMaterializer {
    fn drop(&mut self) {
        if let Err(e) = self.release_all() {
            log::warn!("{}", e);
        }
    }
}
