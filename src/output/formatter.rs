use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use owo_colors::OwoColorize;

use crate::github::types::{PullRequest, StatusLabel};

/// Separator between protocol line fields
pub const FIELD_DELIMITER: char = '\t';

/// Human age of a timestamp: minutes under an hour, hours under a day,
/// days under a week, weeks beyond that. Future timestamps count as now.
pub fn relative_age(updated_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let diff = (now - updated_at).max(chrono::Duration::zero());

    let minutes = diff.num_minutes();
    let hours = diff.num_hours();
    let days = diff.num_days();

    if hours < 1 {
        plural(minutes, "minute")
    } else if days < 1 {
        plural(hours, "hour")
    } else if days < 7 {
        plural(days, "day")
    } else {
        plural(days / 7, "week")
    }
}

fn plural(count: i64, unit: &str) -> String {
    if count == 1 {
        format!("{} {} ago", count, unit)
    } else {
        format!("{} {}s ago", count, unit)
    }
}

/// Status column: OPEN green, CLOSED red, DRAFT dimmed
pub fn format_status(label: StatusLabel, use_colors: bool) -> String {
    let text = label.as_str();
    if !use_colors {
        return text.to_string();
    }
    match label {
        StatusLabel::Open => text.green().to_string(),
        StatusLabel::Closed => text.red().to_string(),
        StatusLabel::Draft => text.dimmed().to_string(),
    }
}

pub fn format_title(title: &str, use_colors: bool) -> String {
    // Tabs and newlines would break the line protocol
    let title: String = title
        .chars()
        .map(|c| if c == '\t' || c == '\n' || c == '\r' { ' ' } else { c })
        .collect();
    if use_colors {
        title.blue().to_string()
    } else {
        title
    }
}

/// One chooser input line.
///
/// The artifact path is a hidden correlation key: the chooser hides it and
/// hands it to the previewer. The other fields are display copies only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtocolLine {
    pub artifact_path: PathBuf,
    pub age: String,
    pub status: String,
    pub title: String,
    pub repo: String,
}

impl ProtocolLine {
    pub fn new(
        artifact_path: PathBuf,
        pr: &PullRequest,
        now: DateTime<Utc>,
        use_colors: bool,
    ) -> Self {
        Self {
            artifact_path,
            age: relative_age(pr.updated_at, now),
            status: format_status(pr.status_label(), use_colors),
            title: format_title(&pr.title, use_colors),
            repo: pr.display_repo().to_string(),
        }
    }

    /// First field of a line the chooser echoed back
    pub fn key_of(line: &str) -> Option<&str> {
        line.split(FIELD_DELIMITER)
            .next()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }
}

impl fmt::Display for ProtocolLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{d}{}{d}{}{d}{}{d}{}",
            self.artifact_path.display(),
            self.age,
            self.status,
            self.title,
            self.repo,
            d = FIELD_DELIMITER
        )
    }
}

/// Final report for the chosen PR
pub fn format_selection(pr: &PullRequest) -> String {
    format!("Selected PR:\nTitle: {}\nURL  : {}", pr.title, pr.url)
}

/// Colors are on unless disabled by flag or a non-empty NO_COLOR
pub fn colors_enabled(no_color_flag: bool, no_color_env: Option<&str>) -> bool {
    !no_color_flag && no_color_env.map_or(true, str::is_empty)
}
