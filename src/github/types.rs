use chrono::{DateTime, Utc};
use serde_json::Value;
use thiserror::Error;

/// Prefix stripped from `repository_url` to get "owner/repo"
const API_REPOS_PREFIX: &str = "https://api.github.com/repos/";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrState {
    Open,
    Closed,
}

/// Display status, derived from (state, draft). CLOSED wins over DRAFT wins over OPEN.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLabel {
    Draft,
    Open,
    Closed,
}

impl StatusLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusLabel::Draft => "DRAFT",
            StatusLabel::Open => "OPEN",
            StatusLabel::Closed => "CLOSED",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PullRequest {
    pub number: u64,
    pub repo: String, // "owner/repo" format
    pub title: String,
    pub body: String,
    pub url: String, // HTML URL for browser
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub state: PrState,
    pub draft: bool,
}

impl PullRequest {
    pub fn status_label(&self) -> StatusLabel {
        match (self.state, self.draft) {
            (PrState::Closed, _) => StatusLabel::Closed,
            (PrState::Open, true) => StatusLabel::Draft,
            (PrState::Open, false) => StatusLabel::Open,
        }
    }

    /// Short owner/repo form shown in the chooser
    pub fn display_repo(&self) -> &str {
        &self.repo
    }

    /// Return a short reference in the format "owner/repo#123"
    pub fn short_ref(&self) -> String {
        format!("{}#{}", self.repo, self.number)
    }
}

/// A search result item that could not be turned into a [`PullRequest`].
#[derive(Debug, Error, PartialEq, Eq)]
#[error("malformed record: field `{field}` {reason}")]
pub struct MalformedRecord {
    pub field: &'static str,
    pub reason: String,
}

impl MalformedRecord {
    fn missing(field: &'static str) -> Self {
        Self {
            field,
            reason: "is missing or has the wrong type".to_string(),
        }
    }
}

/// Normalize one raw search-result object into a [`PullRequest`].
pub fn normalize(raw: &Value) -> Result<PullRequest, MalformedRecord> {
    let number = raw
        .get("number")
        .and_then(Value::as_u64)
        .ok_or_else(|| MalformedRecord::missing("number"))?;
    let title = required_str(raw, "title")?.to_string();
    let repository_url = required_str(raw, "repository_url")?;
    let state = match required_str(raw, "state")? {
        "open" => PrState::Open,
        "closed" => PrState::Closed,
        other => {
            return Err(MalformedRecord {
                field: "state",
                reason: format!("has unknown value '{}'", other),
            })
        }
    };
    let created_at = required_timestamp(raw, "created_at")?;
    let updated_at = required_timestamp(raw, "updated_at")?;

    let body = raw
        .get("body")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let draft = raw.get("draft").and_then(Value::as_bool).unwrap_or(false);

    let repo = repo_from_api_url(repository_url);
    let url = match raw.get("html_url").and_then(Value::as_str) {
        Some(url) if !url.is_empty() => url.to_string(),
        _ => format!("https://github.com/{}/pull/{}", repo, number),
    };

    Ok(PullRequest {
        number,
        repo,
        title,
        body,
        url,
        created_at,
        updated_at,
        state,
        draft,
    })
}

fn required_str<'a>(raw: &'a Value, field: &'static str) -> Result<&'a str, MalformedRecord> {
    raw.get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| MalformedRecord::missing(field))
}

fn required_timestamp(raw: &Value, field: &'static str) -> Result<DateTime<Utc>, MalformedRecord> {
    let text = required_str(raw, field)?;
    DateTime::parse_from_rfc3339(text)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| MalformedRecord {
            field,
            reason: format!("is not an RFC 3339 timestamp ({})", e),
        })
}

/// Extract "owner/repo" from an API repository URL.
///
/// Unknown hosts (e.g. GitHub Enterprise) fall back to the last two path
/// segments instead of failing.
pub fn repo_from_api_url(repository_url: &str) -> String {
    if let Some(rest) = repository_url.strip_prefix(API_REPOS_PREFIX) {
        return rest.trim_end_matches('/').to_string();
    }

    let parts: Vec<&str> = repository_url
        .split('/')
        .filter(|s| !s.is_empty())
        .collect();
    match parts.as_slice() {
        [.., owner, name] => format!("{}/{}", owner, name),
        _ => repository_url.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw_item() -> Value {
        json!({
            "number": 42,
            "title": "Add retry to uploader",
            "body": "## Summary\nRetries failed uploads.",
            "html_url": "https://github.com/octo/widgets/pull/42",
            "created_at": "2024-03-01T10:00:00Z",
            "updated_at": "2024-03-02T12:30:00Z",
            "repository_url": "https://api.github.com/repos/octo/widgets",
            "state": "open",
            "draft": false
        })
    }

    #[test]
    fn test_normalize_full_item() {
        let pr = normalize(&raw_item()).unwrap();
        assert_eq!(pr.number, 42);
        assert_eq!(pr.repo, "octo/widgets");
        assert_eq!(pr.title, "Add retry to uploader");
        assert_eq!(pr.body, "## Summary\nRetries failed uploads.");
        assert_eq!(pr.url, "https://github.com/octo/widgets/pull/42");
        assert_eq!(pr.state, PrState::Open);
        assert!(!pr.draft);
        assert_eq!(pr.short_ref(), "octo/widgets#42");
    }

    #[test]
    fn test_normalize_null_body_is_empty() {
        let mut item = raw_item();
        item["body"] = Value::Null;
        assert_eq!(normalize(&item).unwrap().body, "");

        item.as_object_mut().unwrap().remove("body");
        assert_eq!(normalize(&item).unwrap().body, "");
    }

    #[test]
    fn test_normalize_missing_draft_defaults_false() {
        let mut item = raw_item();
        item.as_object_mut().unwrap().remove("draft");
        assert!(!normalize(&item).unwrap().draft);
    }

    #[test]
    fn test_normalize_missing_html_url_is_derived() {
        let mut item = raw_item();
        item.as_object_mut().unwrap().remove("html_url");
        assert_eq!(
            normalize(&item).unwrap().url,
            "https://github.com/octo/widgets/pull/42"
        );
    }

    #[test]
    fn test_normalize_rejects_missing_required_fields() {
        for field in ["number", "title", "repository_url", "state"] {
            let mut item = raw_item();
            item.as_object_mut().unwrap().remove(field);
            let err = normalize(&item).unwrap_err();
            assert_eq!(err.field, field);
        }
    }

    #[test]
    fn test_normalize_rejects_wrong_types() {
        let mut item = raw_item();
        item["number"] = json!("42");
        assert_eq!(normalize(&item).unwrap_err().field, "number");

        let mut item = raw_item();
        item["title"] = json!(7);
        assert_eq!(normalize(&item).unwrap_err().field, "title");
    }

    #[test]
    fn test_normalize_rejects_unknown_state() {
        let mut item = raw_item();
        item["state"] = json!("merged");
        let err = normalize(&item).unwrap_err();
        assert_eq!(err.field, "state");
        assert!(err.reason.contains("merged"));
    }

    #[test]
    fn test_normalize_rejects_bad_timestamp() {
        let mut item = raw_item();
        item["updated_at"] = json!("yesterday");
        assert_eq!(normalize(&item).unwrap_err().field, "updated_at");
    }

    #[test]
    fn test_status_label_precedence() {
        let mut pr = normalize(&raw_item()).unwrap();
        assert_eq!(pr.status_label(), StatusLabel::Open);

        pr.draft = true;
        assert_eq!(pr.status_label(), StatusLabel::Draft);

        pr.state = PrState::Closed;
        assert_eq!(pr.status_label(), StatusLabel::Closed);

        pr.draft = false;
        assert_eq!(pr.status_label(), StatusLabel::Closed);
    }

    #[test]
    fn test_repo_from_api_url_known_prefix() {
        assert_eq!(
            repo_from_api_url("https://api.github.com/repos/rust-lang/rust"),
            "rust-lang/rust"
        );
    }

    #[test]
    fn test_repo_from_api_url_enterprise_fallback() {
        assert_eq!(
            repo_from_api_url("https://ghe.example.com/api/v3/repos/team/service"),
            "team/service"
        );
    }

    #[test]
    fn test_repo_from_api_url_degenerate() {
        assert_eq!(repo_from_api_url("nonsense"), "nonsense");
    }
}
