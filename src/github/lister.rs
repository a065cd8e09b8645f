//! Listing services that pair the GitHub gateway with fetch sessions.
//!
//! Each lister owns a [`FetchSession`] so overlapping refreshes resolve
//! deterministically: only the newest cycle may publish its outcome, and
//! page navigation during a slow fetch never shows stale rows.

use std::sync::{Arc, Mutex, PoisonError};

use crate::auth::TokenProvider;
use crate::fetch::{ErrorReporter, FetchFailure, FetchSession, FetchState};

use super::error::GithubError;
use super::gateway::{PageRequest, PullRequestGateway};
use super::locator::RepositoryLocator;
use super::models::{Contributor, PullRequest};

/// OAuth scopes requested for repository reads.
pub(super) const REPOSITORY_SCOPES: &[&str] = &["repo"];

/// Default number of pull requests per view page.
pub const DEFAULT_PAGE_SIZE: u8 = 5;

/// Default number of contributors fetched.
pub const DEFAULT_CONTRIBUTOR_COUNT: u8 = 10;

/// Mutable pagination state for a pull request listing.
///
/// `page` is 0-based: it counts view pages, while the transport counts
/// from 1. The translation happens in [`PullRequestLister::refresh`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PageState {
    page: u32,
    page_size: u8,
    total: u64,
}

impl Default for PageState {
    fn default() -> Self {
        Self {
            page: 0,
            page_size: DEFAULT_PAGE_SIZE,
            total: 0,
        }
    }
}

/// Paginated pull request listing service.
pub struct PullRequestLister<G, A> {
    gateway: G,
    tokens: A,
    reporter: Arc<dyn ErrorReporter>,
    repository: Option<RepositoryLocator>,
    session: FetchSession<Vec<PullRequest>>,
    pages: Mutex<PageState>,
}

impl<G, A> PullRequestLister<G, A>
where
    G: PullRequestGateway,
    A: TokenProvider,
{
    /// Creates a lister for an optional repository binding.
    ///
    /// A lister without a repository still answers [`Self::refresh`] by
    /// reporting the missing binding and publishing an empty failed state.
    #[must_use]
    pub fn new(
        gateway: G,
        tokens: A,
        reporter: Arc<dyn ErrorReporter>,
        repository: Option<RepositoryLocator>,
    ) -> Self {
        Self {
            gateway,
            tokens,
            reporter,
            repository,
            session: FetchSession::new("pull-requests"),
            pages: Mutex::new(PageState::default()),
        }
    }

    /// Current listing state without triggering a fetch.
    #[must_use]
    pub fn state(&self) -> FetchState<Vec<PullRequest>> {
        self.session.snapshot()
    }

    /// Current view page (0-based).
    #[must_use]
    pub fn page(&self) -> u32 {
        self.lock_pages().page
    }

    /// Current page size.
    #[must_use]
    pub fn page_size(&self) -> u8 {
        self.lock_pages().page_size
    }

    /// Latest total-count hint from the transport.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.lock_pages().total
    }

    /// Moves to a view page. Takes effect on the next refresh.
    pub fn set_page(&self, page: u32) {
        self.lock_pages().page = page;
    }

    /// Changes the page size and rewinds to the first page.
    pub fn set_page_size(&self, page_size: u8) {
        let mut pages = self.lock_pages();
        pages.page_size = page_size;
        pages.page = 0;
    }

    /// Fetches the current page and publishes the outcome.
    ///
    /// Starts a new fetch cycle, so any still-running older refresh is
    /// superseded and its resolution discarded. The returned state is the
    /// session snapshot after this cycle settles, which may already
    /// reflect an even newer cycle.
    pub async fn refresh(&self) -> FetchState<Vec<PullRequest>> {
        let cycle = self.session.begin();
        let (page, page_size) = {
            let pages = self.lock_pages();
            (pages.page, pages.page_size)
        };

        match self.fetch_page(page, page_size).await {
            Ok((items, total_hint)) => {
                // The hint belongs to this cycle, so it writes only when
                // the cycle is still the newest and its rows applied.
                if self.session.complete(cycle, Ok(items)) {
                    if let Some(total) = total_hint {
                        self.lock_pages().total = total;
                    }
                }
            }
            Err(error) => {
                self.reporter.post(&error);
                let _applied = self
                    .session
                    .complete(cycle, Err(FetchFailure::from_error(&error)));
            }
        }

        self.session.snapshot()
    }

    async fn fetch_page(
        &self,
        page: u32,
        page_size: u8,
    ) -> Result<(Vec<PullRequest>, Option<u64>), GithubError> {
        let locator = self
            .repository
            .as_ref()
            .ok_or(GithubError::MissingRepository)?;
        let token = self.tokens.access_token(REPOSITORY_SCOPES).await?;

        // View pages count from 0; the transport counts from 1.
        let request = PageRequest::new(page + 1, page_size)?;
        let fetched = self
            .gateway
            .list_pull_requests(&token, locator, &request)
            .await?;
        Ok((fetched.items, fetched.total_hint))
    }

    fn lock_pages(&self) -> std::sync::MutexGuard<'_, PageState> {
        self.pages.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Contributor listing service.
pub struct ContributorsLister<G, A> {
    gateway: G,
    tokens: A,
    reporter: Arc<dyn ErrorReporter>,
    repository: Option<RepositoryLocator>,
    session: FetchSession<Vec<Contributor>>,
    count: u8,
}

impl<G, A> ContributorsLister<G, A>
where
    G: PullRequestGateway,
    A: TokenProvider,
{
    /// Creates a contributor lister fetching the default contributor count.
    #[must_use]
    pub fn new(
        gateway: G,
        tokens: A,
        reporter: Arc<dyn ErrorReporter>,
        repository: Option<RepositoryLocator>,
    ) -> Self {
        Self {
            gateway,
            tokens,
            reporter,
            repository,
            session: FetchSession::new("contributors"),
            count: DEFAULT_CONTRIBUTOR_COUNT,
        }
    }

    /// Overrides how many contributors are fetched.
    #[must_use]
    pub fn with_count(mut self, count: u8) -> Self {
        self.count = count;
        self
    }

    /// Current listing state without triggering a fetch.
    #[must_use]
    pub fn state(&self) -> FetchState<Vec<Contributor>> {
        self.session.snapshot()
    }

    /// Fetches the contributor listing and publishes the outcome.
    pub async fn refresh(&self) -> FetchState<Vec<Contributor>> {
        let cycle = self.session.begin();

        match self.fetch_contributors().await {
            Ok(contributors) => {
                let _applied = self.session.complete(cycle, Ok(contributors));
            }
            Err(error) => {
                self.reporter.post(&error);
                let _applied = self
                    .session
                    .complete(cycle, Err(FetchFailure::from_error(&error)));
            }
        }

        self.session.snapshot()
    }

    async fn fetch_contributors(&self) -> Result<Vec<Contributor>, GithubError> {
        let locator = self
            .repository
            .as_ref()
            .ok_or(GithubError::MissingRepository)?;
        let token = self.tokens.access_token(REPOSITORY_SCOPES).await?;
        self.gateway
            .list_contributors(&token, locator, self.count)
            .await
    }
}

#[cfg(test)]
#[expect(clippy::expect_used, reason = "Tests panic on failure")]
mod tests {
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use tokio::sync::oneshot;

    use crate::auth::{AccessToken, StaticTokenProvider};
    use crate::fetch::RecordingReporter;
    use crate::github::gateway::{
        MockPullRequestGateway, PageRequest, PullRequestGateway, PullRequestPage,
    };
    use crate::github::locator::RepositoryLocator;
    use crate::github::models::{Contributor, PullRequest, PullRequestActivity};

    use super::{ContributorsLister, GithubError, PullRequestLister};

    fn locator() -> RepositoryLocator {
        RepositoryLocator::from_owner_repo("theorg", "the-service")
            .expect("owner and repo should validate")
    }

    fn tokens() -> StaticTokenProvider {
        StaticTokenProvider::new(None, Some("token".to_owned()))
    }

    fn pull_request(id: u64, title: &str) -> PullRequest {
        PullRequest {
            id,
            number: id,
            title: title.to_owned(),
            url: format!("https://example.com/pull/{id}"),
        }
    }

    #[tokio::test]
    async fn refresh_translates_view_page_to_transport_page() {
        let mut gateway = MockPullRequestGateway::new();
        gateway
            .expect_list_pull_requests()
            .withf(|_, _, request| request.page() == 1 && request.per_page() == 5)
            .times(1)
            .returning(|_, _, _| {
                Ok(PullRequestPage {
                    items: vec![],
                    total_hint: Some(12),
                })
            });

        let reporter = Arc::new(RecordingReporter::default());
        let lister = PullRequestLister::new(gateway, tokens(), reporter, Some(locator()));

        let state = lister.refresh().await;

        assert!(state.error.is_none(), "refresh should succeed");
        assert_eq!(lister.total(), 12, "total hint should be stored");
    }

    #[tokio::test]
    async fn set_page_advances_transport_page() {
        let mut gateway = MockPullRequestGateway::new();
        gateway
            .expect_list_pull_requests()
            .withf(|_, _, request| request.page() == 3 && request.per_page() == 5)
            .times(1)
            .returning(|_, _, _| {
                Ok(PullRequestPage {
                    items: vec![],
                    total_hint: None,
                })
            });

        let reporter = Arc::new(RecordingReporter::default());
        let lister = PullRequestLister::new(gateway, tokens(), reporter, Some(locator()));

        lister.set_page(2);
        let state = lister.refresh().await;

        assert!(state.error.is_none(), "refresh should succeed");
    }

    #[tokio::test]
    async fn set_page_size_rewinds_to_first_page() {
        let mut gateway = MockPullRequestGateway::new();
        gateway
            .expect_list_pull_requests()
            .withf(|_, _, request| request.page() == 1 && request.per_page() == 20)
            .times(1)
            .returning(|_, _, _| {
                Ok(PullRequestPage {
                    items: vec![],
                    total_hint: None,
                })
            });

        let reporter = Arc::new(RecordingReporter::default());
        let lister = PullRequestLister::new(gateway, tokens(), reporter, Some(locator()));

        lister.set_page(4);
        lister.set_page_size(20);
        assert_eq!(lister.page(), 0, "page should rewind");

        let state = lister.refresh().await;
        assert!(state.error.is_none(), "refresh should succeed");
    }

    #[tokio::test]
    async fn refresh_without_repository_reports_and_fails() {
        let gateway = MockPullRequestGateway::new();
        let reporter = Arc::new(RecordingReporter::default());
        let reporter_sink: Arc<dyn crate::fetch::ErrorReporter> = reporter.clone();
        let lister = PullRequestLister::new(gateway, tokens(), reporter_sink, None);

        let state = lister.refresh().await;

        assert!(!state.loading, "cycle should have settled");
        let failure = state.error.expect("missing repository should fail");
        assert!(
            failure.message.contains("repository"),
            "unexpected message: {}",
            failure.message
        );
        assert_eq!(
            reporter.messages().len(),
            1,
            "the failure should be reported once"
        );
        assert_eq!(
            state.value,
            Some(vec![]),
            "failed state should publish an empty listing"
        );
    }

    #[tokio::test]
    async fn gateway_failure_is_reported_and_published() {
        let mut gateway = MockPullRequestGateway::new();
        gateway.expect_list_pull_requests().times(1).returning(|_, _, _| {
            Err(GithubError::Api {
                message: "boom".to_owned(),
            })
        });

        let reporter = Arc::new(RecordingReporter::default());
        let reporter_sink: Arc<dyn crate::fetch::ErrorReporter> = reporter.clone();
        let lister = PullRequestLister::new(gateway, tokens(), reporter_sink, Some(locator()));

        let state = lister.refresh().await;

        let failure = state.error.expect("gateway failure should surface");
        assert!(failure.message.contains("boom"));
        assert_eq!(reporter.messages().len(), 1);
    }

    #[tokio::test]
    async fn contributors_refresh_publishes_records() {
        let mut gateway = MockPullRequestGateway::new();
        gateway
            .expect_list_contributors()
            .withf(|_, _, count| *count == 10)
            .times(1)
            .returning(|_, _, _| {
                Ok(vec![Contributor {
                    login: "alice".to_owned(),
                    avatar_url: None,
                    contributions: 3,
                }])
            });

        let reporter = Arc::new(RecordingReporter::default());
        let lister = ContributorsLister::new(gateway, tokens(), reporter, Some(locator()));

        let state = lister.refresh().await;

        let contributors = state.value.expect("listing should publish");
        assert_eq!(contributors.len(), 1);
        assert_eq!(
            contributors.first().map(|contributor| contributor.login.as_str()),
            Some("alice")
        );
    }

    /// Gateway whose responses block until the test releases them, in
    /// call order. Each gate signals when its call has started.
    struct GatedGateway {
        gates: Mutex<VecDeque<(oneshot::Sender<()>, oneshot::Receiver<()>, PullRequestPage)>>,
    }

    impl GatedGateway {
        fn new(
            gates: Vec<(oneshot::Sender<()>, oneshot::Receiver<()>, PullRequestPage)>,
        ) -> Self {
            Self {
                gates: Mutex::new(gates.into()),
            }
        }
    }

    #[async_trait]
    impl PullRequestGateway for GatedGateway {
        async fn list_pull_requests(
            &self,
            _token: &AccessToken,
            _locator: &RepositoryLocator,
            _request: &PageRequest,
        ) -> Result<PullRequestPage, GithubError> {
            let (started, release, page) = self
                .gates
                .lock()
                .expect("gate queue should not be poisoned")
                .pop_front()
                .expect("a gate should be queued for every call");
            started.send(()).expect("test should await the start signal");
            release.await.expect("test should release the gate");
            Ok(page)
        }

        async fn list_pull_request_activity(
            &self,
            _token: &AccessToken,
            _locator: &RepositoryLocator,
            _request: &PageRequest,
        ) -> Result<Vec<PullRequestActivity>, GithubError> {
            Err(GithubError::Api {
                message: "not exercised".to_owned(),
            })
        }

        async fn list_contributors(
            &self,
            _token: &AccessToken,
            _locator: &RepositoryLocator,
            _per_page: u8,
        ) -> Result<Vec<Contributor>, GithubError> {
            Err(GithubError::Api {
                message: "not exercised".to_owned(),
            })
        }
    }

    #[tokio::test]
    async fn superseded_refresh_never_clobbers_newer_rows() {
        let (started_a_tx, started_a_rx) = oneshot::channel();
        let (release_a_tx, release_a_rx) = oneshot::channel();
        let (started_b_tx, started_b_rx) = oneshot::channel();
        let (release_b_tx, release_b_rx) = oneshot::channel();

        let stale_page = PullRequestPage {
            items: vec![pull_request(1, "stale")],
            total_hint: Some(999),
        };
        let fresh_page = PullRequestPage {
            items: vec![pull_request(2, "fresh")],
            total_hint: Some(12),
        };

        let gateway = GatedGateway::new(vec![
            (started_a_tx, release_a_rx, stale_page),
            (started_b_tx, release_b_rx, fresh_page),
        ]);
        let reporter: Arc<dyn crate::fetch::ErrorReporter> =
            Arc::new(RecordingReporter::default());
        let lister = Arc::new(PullRequestLister::new(
            gateway,
            tokens(),
            reporter,
            Some(locator()),
        ));

        let first = tokio::spawn({
            let lister = Arc::clone(&lister);
            async move { lister.refresh().await }
        });
        started_a_rx.await.expect("first fetch should start");

        let second = tokio::spawn({
            let lister = Arc::clone(&lister);
            async move { lister.refresh().await }
        });
        started_b_rx.await.expect("second fetch should start");

        release_b_tx.send(()).expect("second gate should release");
        second.await.expect("second refresh should finish");

        release_a_tx.send(()).expect("first gate should release");
        first.await.expect("first refresh should finish");

        let state = lister.state();
        let rows = state.value.expect("listing should publish");
        assert_eq!(rows.len(), 1);
        assert_eq!(
            rows.first().map(|row| row.title.as_str()),
            Some("fresh"),
            "superseded rows must not replace newer rows"
        );
        assert!(state.error.is_none());
        assert_eq!(
            lister.total(),
            12,
            "superseded cycle must not overwrite the newer total hint"
        );
    }
}
