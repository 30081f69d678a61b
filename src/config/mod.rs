mod repo;

pub use repo::{detect_current_repo, parse_remote_url, RepoSlug};

use std::path::PathBuf;

/// Environment variable overriding the chooser binary
pub const ENV_CHOOSER: &str = "PR_PICK_CHOOSER";
/// Environment variable overriding the previewer command prefix
pub const ENV_PREVIEWER: &str = "PR_PICK_PREVIEWER";

pub const DEFAULT_CHOOSER: &str = "fzf";
pub const DEFAULT_PREVIEWER: &str = "bat --color=always --line-range :500";

/// Which repositories the search covers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    All,
    Repository(RepoSlug),
}

/// Everything one run needs, resolved up front in `main`.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub scope: Scope,
    /// Wrap status and title fields in ANSI colors
    pub use_colors: bool,
    /// Chooser binary, `fzf` unless overridden
    pub chooser: String,
    /// Previewer command; the artifact path is appended as `{1}`
    pub previewer: String,
    /// Parent directory for the preview directory; system temp dir when unset
    pub preview_root: Option<PathBuf>,
}

impl RunConfig {
    pub fn new(scope: Scope) -> Self {
        Self {
            scope,
            use_colors: true,
            chooser: DEFAULT_CHOOSER.to_string(),
            previewer: DEFAULT_PREVIEWER.to_string(),
            preview_root: None,
        }
    }
}

/// Treat empty or whitespace-only values as unset
pub fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_config_defaults() {
        let config = RunConfig::new(Scope::All);
        assert!(config.use_colors);
        assert_eq!(config.chooser, "fzf");
        assert!(config.previewer.starts_with("bat "));
        assert!(config.preview_root.is_none());
    }

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty(None), None);
        assert_eq!(non_empty(Some("   ".to_string())), None);
        assert_eq!(non_empty(Some(" sk ".to_string())), Some("sk".to_string()));
    }
}
