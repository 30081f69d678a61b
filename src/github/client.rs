use anyhow::{Context, Result};
use octocrab::Octocrab;

use crate::error::PipelineError;

/// Create an authenticated GitHub client using a personal access token
pub fn create_client(token: &str) -> Result<Octocrab> {
    Octocrab::builder()
        .personal_token(token.to_string())
        .build()
        .context("Failed to create GitHub client")
}

/// Resolve the login of the account the token belongs to
pub async fn current_login(client: &Octocrab) -> Result<String, PipelineError> {
    let user = client.current().user().await.map_err(|e| {
        let error_str = format!("{:?}", e);
        if error_str.contains("401") || error_str.contains("Bad credentials") {
            PipelineError::Auth(
                "GitHub rejected the token. It may be invalid or expired.".to_string(),
            )
        } else {
            PipelineError::Auth(format!("Could not look up the authenticated user: {}", e))
        }
    })?;

    Ok(user.login)
}
