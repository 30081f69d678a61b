pub mod chooser;
pub mod config;
pub mod credentials;
pub mod error;
pub mod github;
pub mod output;
pub mod pipeline;
pub mod preview;
pub mod ranking;
