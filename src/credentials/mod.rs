/// Environment variable holding the GitHub personal access token
pub const ENV_TOKEN_VAR: &str = "GITHUB_TOKEN";

/// Check for a GitHub token in the GITHUB_TOKEN environment variable.
/// Returns Some(token) if the env var is set and non-empty, None otherwise.
pub fn get_token_from_env() -> Option<String> {
    token_from_value(std::env::var(ENV_TOKEN_VAR).ok())
}

fn token_from_value(value: Option<String>) -> Option<String> {
    crate::config::non_empty(value)
}
