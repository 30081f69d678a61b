use std::cmp::Ordering;

use crate::github::types::{PrState, PullRequest};

/// Status priority, lower sorts first.
///
/// Closed PRs always sort last, even when they are still flagged as drafts.
/// Among the rest, drafts come before ready-for-review PRs.
pub fn status_priority(pr: &PullRequest) -> u8 {
    match (pr.state, pr.draft) {
        (PrState::Closed, _) => 2,
        (PrState::Open, true) => 0,
        (PrState::Open, false) => 1,
    }
}

/// Total order for the chooser list: status priority, then most recently
/// updated first. Full ties compare equal so a stable sort keeps fetch order.
pub fn compare(a: &PullRequest, b: &PullRequest) -> Ordering {
    status_priority(a)
        .cmp(&status_priority(b))
        .then_with(|| b.updated_at.cmp(&a.updated_at))
}

/// Sort in place with [`compare`], keeping fetch order for ties
pub fn rank(prs: &mut [PullRequest]) {
    prs.sort_by(compare);
}
