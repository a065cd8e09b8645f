//! Data models for pull request and contributor listings.
//!
//! Types prefixed with `Api` are internal deserialisation targets that
//! convert into the public records surfaced to views.

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// One pull request row in a listing view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PullRequest {
    /// GitHub's numeric identifier for the pull request.
    pub id: u64,
    /// Pull request number within the repository.
    pub number: u64,
    /// Title of the pull request.
    pub title: String,
    /// HTML URL for displaying to a user.
    pub url: String,
}

/// One contributor row for the contributors view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Contributor {
    /// Contributor login.
    pub login: String,
    /// Avatar image URL if present.
    pub avatar_url: Option<String>,
    /// Number of contributions to the repository.
    pub contributions: u64,
}

/// Lifecycle timestamps and size data for one pull request.
///
/// Feeds the statistics reduction; the size fields are optional because the
/// list endpoint does not always include them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PullRequestActivity {
    /// Creation timestamp.
    pub created_at: Option<DateTime<Utc>>,
    /// Close timestamp, set for both merged and unmerged closes.
    pub closed_at: Option<DateTime<Utc>>,
    /// Merge timestamp, set only for merged pull requests.
    pub merged_at: Option<DateTime<Utc>>,
    /// Lines added, when the transport includes them.
    pub additions: Option<u64>,
    /// Lines deleted, when the transport includes them.
    pub deletions: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct ApiPullRequest {
    pub(super) id: u64,
    pub(super) number: u64,
    pub(super) title: Option<String>,
    pub(super) html_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct ApiContributor {
    pub(super) login: Option<String>,
    pub(super) avatar_url: Option<String>,
    pub(super) contributions: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct ApiPullRequestActivity {
    pub(super) created_at: Option<DateTime<Utc>>,
    pub(super) closed_at: Option<DateTime<Utc>>,
    pub(super) merged_at: Option<DateTime<Utc>>,
    pub(super) additions: Option<u64>,
    pub(super) deletions: Option<u64>,
}

impl From<ApiPullRequest> for PullRequest {
    fn from(value: ApiPullRequest) -> Self {
        Self {
            id: value.id,
            number: value.number,
            title: value.title.unwrap_or_default(),
            url: value.html_url.unwrap_or_default(),
        }
    }
}

impl From<ApiContributor> for Contributor {
    fn from(value: ApiContributor) -> Self {
        Self {
            login: value.login.unwrap_or_default(),
            avatar_url: value.avatar_url,
            contributions: value.contributions.unwrap_or_default(),
        }
    }
}

impl From<ApiPullRequestActivity> for PullRequestActivity {
    fn from(value: ApiPullRequestActivity) -> Self {
        Self {
            created_at: value.created_at,
            closed_at: value.closed_at,
            merged_at: value.merged_at,
            additions: value.additions,
            deletions: value.deletions,
        }
    }
}
