use std::io;
use std::path::PathBuf;

use thiserror::Error;

// Exit codes, shared with main.rs
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_AUTH: i32 = 1;
pub const EXIT_NETWORK: i32 = 2;
pub const EXIT_CONFIG: i32 = 4;
pub const EXIT_CHOOSER: i32 = 5;
pub const EXIT_IO: i32 = 6;

/// Fatal errors of a single pipeline run.
///
/// Every variant aborts the remaining stages. Preview cleanup still runs
/// once materialization has started.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Failed to fetch pull requests: {0}")]
    Fetch(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to write preview file {}: {source}", .path.display())]
    Materialization {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to remove preview directory {}: {source}", .path.display())]
    Cleanup {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Chooser `{program}` could not be started: {source}")]
    ChooserUnavailable {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("Chooser `{program}` failed: {detail}")]
    ChooserFailed { program: String, detail: String },
}

impl PipelineError {
    /// Process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            PipelineError::Auth(_) => EXIT_AUTH,
            PipelineError::Fetch(_) => EXIT_NETWORK,
            PipelineError::Config(_) => EXIT_CONFIG,
            PipelineError::Materialization { .. } | PipelineError::Cleanup { .. } => EXIT_IO,
            PipelineError::ChooserUnavailable { .. } | PipelineError::ChooserFailed { .. } => {
                EXIT_CHOOSER
            }
        }
    }
}
