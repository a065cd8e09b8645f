//! Gateway for GitHub listings through Octocrab.
//!
//! The trait-based design enables mocking in tests while the Octocrab
//! implementation handles real HTTP requests. A fresh client is built per
//! call because the access token is acquired per fetch cycle by the
//! listing layer.

use async_trait::async_trait;
use http::{StatusCode, Uri};
use octocrab::{Octocrab, Page};

use crate::auth::AccessToken;

use super::error::GithubError;
use super::locator::RepositoryLocator;
use super::models::{
    ApiContributor, ApiPullRequest, ApiPullRequestActivity, Contributor, PullRequest,
    PullRequestActivity,
};

/// Largest page size the GitHub REST API accepts.
pub const MAX_PAGE_SIZE: u8 = 100;

/// A validated transport-level page request.
///
/// Page numbering here is 1-based, matching the GitHub REST API. The
/// listing layer owns the translation from 0-based view pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    per_page: u8,
}

impl PageRequest {
    /// Validates and builds a page request.
    ///
    /// # Errors
    ///
    /// Returns [`GithubError::InvalidPagination`] when `page` is zero or
    /// `per_page` is zero or above [`MAX_PAGE_SIZE`].
    pub fn new(page: u32, per_page: u8) -> Result<Self, GithubError> {
        if page == 0 {
            return Err(GithubError::InvalidPagination {
                message: "page must be at least 1".to_owned(),
            });
        }
        if per_page == 0 {
            return Err(GithubError::InvalidPagination {
                message: "per_page must be at least 1".to_owned(),
            });
        }
        if per_page > MAX_PAGE_SIZE {
            return Err(GithubError::InvalidPagination {
                message: format!("per_page must not exceed {MAX_PAGE_SIZE}"),
            });
        }
        Ok(Self { page, per_page })
    }

    /// The transport page number (1-based).
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Items per page.
    #[must_use]
    pub const fn per_page(&self) -> u8 {
        self.per_page
    }
}

/// One transport page of pull requests plus an optional total-count hint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestPage {
    /// Pull request records on this page.
    pub items: Vec<PullRequest>,
    /// Total item count hint when the transport reveals one.
    ///
    /// Derived from the `Link` header's last-page relation, so it is an
    /// upper bound rather than an exact count.
    pub total_hint: Option<u64>,
}

/// Gateway that can load repository listings from GitHub.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PullRequestGateway: Send + Sync {
    /// Fetches one page of pull requests.
    async fn list_pull_requests(
        &self,
        token: &AccessToken,
        locator: &RepositoryLocator,
        request: &PageRequest,
    ) -> Result<PullRequestPage, GithubError>;

    /// Fetches one page of pull request lifecycle data across all states.
    async fn list_pull_request_activity(
        &self,
        token: &AccessToken,
        locator: &RepositoryLocator,
        request: &PageRequest,
    ) -> Result<Vec<PullRequestActivity>, GithubError>;

    /// Fetches the top contributors for the repository.
    async fn list_contributors(
        &self,
        token: &AccessToken,
        locator: &RepositoryLocator,
        per_page: u8,
    ) -> Result<Vec<Contributor>, GithubError>;
}

/// Octocrab-backed gateway.
///
/// Stateless: a client is constructed per call from the supplied token and
/// the locator's API base.
#[derive(Debug, Clone, Copy, Default)]
pub struct OctocrabPullRequestGateway;

impl OctocrabPullRequestGateway {
    /// Creates the gateway.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn build_client(
        token: &AccessToken,
        locator: &RepositoryLocator,
    ) -> Result<Octocrab, GithubError> {
        let base_uri: Uri = locator
            .api_base()
            .as_str()
            .parse::<Uri>()
            .map_err(|error| GithubError::InvalidUrl(error.to_string()))?;

        Octocrab::builder()
            .personal_token(token.value().to_owned())
            .base_uri(base_uri)
            .map_err(|error| GithubError::Api {
                message: format!("build client failed: {error}"),
            })?
            .build()
            .map_err(|error| map_octocrab_error("build client", &error))
    }
}

#[async_trait]
impl PullRequestGateway for OctocrabPullRequestGateway {
    async fn list_pull_requests(
        &self,
        token: &AccessToken,
        locator: &RepositoryLocator,
        request: &PageRequest,
    ) -> Result<PullRequestPage, GithubError> {
        let client = Self::build_client(token, locator)?;

        let page_str = request.page().to_string();
        let per_page_str = request.per_page().to_string();
        let query_params = [("page", page_str.as_str()), ("per_page", per_page_str.as_str())];

        let page: Page<ApiPullRequest> = client
            .get(locator.pulls_path(), Some(&query_params))
            .await
            .map_err(|error| map_octocrab_error("list pulls", &error))?;

        let total_hint = total_hint_for(&page, request.per_page());
        let items = page.items.into_iter().map(ApiPullRequest::into).collect();

        Ok(PullRequestPage { items, total_hint })
    }

    async fn list_pull_request_activity(
        &self,
        token: &AccessToken,
        locator: &RepositoryLocator,
        request: &PageRequest,
    ) -> Result<Vec<PullRequestActivity>, GithubError> {
        let client = Self::build_client(token, locator)?;

        let page_str = request.page().to_string();
        let per_page_str = request.per_page().to_string();
        let query_params = [
            ("state", "all"),
            ("page", page_str.as_str()),
            ("per_page", per_page_str.as_str()),
        ];

        let page: Page<ApiPullRequestActivity> = client
            .get(locator.pulls_path(), Some(&query_params))
            .await
            .map_err(|error| map_octocrab_error("list pull activity", &error))?;

        Ok(page
            .items
            .into_iter()
            .map(ApiPullRequestActivity::into)
            .collect())
    }

    async fn list_contributors(
        &self,
        token: &AccessToken,
        locator: &RepositoryLocator,
        per_page: u8,
    ) -> Result<Vec<Contributor>, GithubError> {
        let client = Self::build_client(token, locator)?;

        let per_page_str = per_page.to_string();
        let query_params = [("per_page", per_page_str.as_str())];

        let page: Page<ApiContributor> = client
            .get(locator.contributors_path(), Some(&query_params))
            .await
            .map_err(|error| map_octocrab_error("list contributors", &error))?;

        Ok(page.items.into_iter().map(ApiContributor::into).collect())
    }
}

/// Derives a total-count hint from a transport page.
///
/// Prefers the explicit `total_count` field when the API supplies one and
/// falls back to `pages * per_page` from the `Link` header.
fn total_hint_for<T>(page: &Page<T>, per_page: u8) -> Option<u64> {
    page.total_count.or_else(|| {
        page.number_of_pages()
            .map(|pages| u64::from(pages) * u64::from(per_page))
    })
}

/// Checks if a GitHub error status indicates an authentication failure.
const fn is_auth_failure(status: StatusCode) -> bool {
    matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN)
}

/// Checks if an octocrab error represents a network/transport issue.
const fn is_network_error(error: &octocrab::Error) -> bool {
    matches!(
        error,
        octocrab::Error::Http { .. }
            | octocrab::Error::Hyper { .. }
            | octocrab::Error::Service { .. }
    )
}

pub(super) fn map_octocrab_error(operation: &str, error: &octocrab::Error) -> GithubError {
    if let octocrab::Error::GitHub { source, .. } = error {
        return if is_auth_failure(source.status_code) {
            GithubError::Authentication {
                message: format!(
                    "{operation} failed: GitHub returned {status} {message}",
                    status = source.status_code,
                    message = source.message
                ),
            }
        } else {
            GithubError::Api {
                message: format!(
                    "{operation} failed with status {status}: {message}",
                    status = source.status_code,
                    message = source.message
                ),
            }
        };
    }

    if is_network_error(error) {
        return GithubError::Network {
            message: format!("{operation} failed: {error}"),
        };
    }

    GithubError::Api {
        message: format!("{operation} failed: {error}"),
    }
}
