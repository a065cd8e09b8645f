//! GitHub pull request listings, contributors, and statistics.
//!
//! This module wraps Octocrab to parse repository URLs, page through pull
//! requests, and reduce lifecycle data into repository statistics. Errors
//! are mapped into user-friendly variants so that callers can surface
//! precise failures without exposing Octocrab internals.

pub mod error;
pub mod gateway;
pub mod lister;
pub mod locator;
pub mod models;
pub mod stats;

pub use error::GithubError;
pub use gateway::{OctocrabPullRequestGateway, PageRequest, PullRequestGateway, PullRequestPage};
pub use lister::{ContributorsLister, PullRequestLister};
pub use locator::{RepositoryLocator, RepositoryName, RepositoryOwner};
pub use models::{Contributor, PullRequest, PullRequestActivity};
pub use stats::{PullRequestStatistics, StatisticsLister, compute_statistics};

#[cfg(test)]
pub use gateway::MockPullRequestGateway;
