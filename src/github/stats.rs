//! Pull request statistics reduction and listing.
//!
//! One page of lifecycle data (default 100 rows) is reduced into counts
//! and averages, then formatted for display. Division by zero is defined:
//! an empty or never-closed page yields the zero strings rather than a
//! panic or a NaN artefact.

use std::sync::Arc;

use crate::auth::TokenProvider;
use crate::fetch::{ErrorReporter, FetchFailure, FetchSession, FetchState};

use super::error::GithubError;
use super::gateway::{PageRequest, PullRequestGateway};
use super::lister::REPOSITORY_SCOPES;
use super::locator::RepositoryLocator;
use super::models::PullRequestActivity;

/// Transport page size used for the statistics reduction.
pub const STATISTICS_PAGE_SIZE: u8 = 100;

/// Running totals accumulated over one page of lifecycle rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct StatsCounts {
    merge_seconds_total: i64,
    line_count_total: u64,
    sized_count: u64,
    closed_count: u64,
    merged_count: u64,
}

impl StatsCounts {
    fn reduce(rows: &[PullRequestActivity]) -> Self {
        rows.iter().fold(Self::default(), |mut counts, row| {
            if row.closed_at.is_some() {
                counts.closed_count += 1;
            }
            if let (Some(created), Some(merged)) = (row.created_at, row.merged_at) {
                counts.merged_count += 1;
                counts.merge_seconds_total += (merged - created).num_seconds().max(0);
            }
            if let (Some(additions), Some(deletions)) = (row.additions, row.deletions) {
                counts.line_count_total += additions + deletions;
                counts.sized_count += 1;
            }
            counts
        })
    }

    fn average_merge_seconds(&self) -> i64 {
        if self.merged_count == 0 {
            return 0;
        }
        let merged = i64::try_from(self.merged_count).unwrap_or(i64::MAX);
        self.merge_seconds_total.div_euclid(merged.max(1))
    }

    const fn average_line_count(&self) -> u64 {
        if self.sized_count == 0 {
            return 0;
        }
        self.line_count_total.div_euclid(self.sized_count)
    }

    const fn merged_to_closed_percent(&self) -> u64 {
        if self.closed_count == 0 {
            return 0;
        }
        (self.merged_count * 100).div_euclid(self.closed_count)
    }
}

/// Formatted statistics for one repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestStatistics {
    /// Average open-to-merge time, e.g. `"7h 20m"`.
    pub average_time_to_merge: String,
    /// Average changed line count across sized pull requests.
    pub average_size_in_lines: String,
    /// Merged-to-closed ratio as a rounded-down percentage, e.g. `"83%"`.
    pub merged_to_closed_ratio: String,
}

impl Default for PullRequestStatistics {
    fn default() -> Self {
        Self {
            average_time_to_merge: "0m".to_owned(),
            average_size_in_lines: "0".to_owned(),
            merged_to_closed_ratio: "0%".to_owned(),
        }
    }
}

/// Reduces one page of lifecycle rows into formatted statistics.
#[must_use]
pub fn compute_statistics(rows: &[PullRequestActivity]) -> PullRequestStatistics {
    let counts = StatsCounts::reduce(rows);
    PullRequestStatistics {
        average_time_to_merge: format_duration(counts.average_merge_seconds()),
        average_size_in_lines: counts.average_line_count().to_string(),
        merged_to_closed_ratio: format!("{}%", counts.merged_to_closed_percent()),
    }
}

/// Formats a duration in seconds as the largest two calendar units.
fn format_duration(seconds: i64) -> String {
    let minutes = seconds.max(0).div_euclid(60);
    let days = minutes.div_euclid(60 * 24);
    let hours = minutes.div_euclid(60) - days * 24;
    let remainder_minutes = minutes - days * 24 * 60 - hours * 60;

    if days > 0 {
        format!("{days}d {hours}h")
    } else if hours > 0 {
        format!("{hours}h {remainder_minutes}m")
    } else {
        format!("{remainder_minutes}m")
    }
}

/// Statistics fetching service.
pub struct StatisticsLister<G, A> {
    gateway: G,
    tokens: A,
    reporter: Arc<dyn ErrorReporter>,
    repository: Option<RepositoryLocator>,
    session: FetchSession<PullRequestStatistics>,
}

impl<G, A> StatisticsLister<G, A>
where
    G: PullRequestGateway,
    A: TokenProvider,
{
    /// Creates a statistics lister for an optional repository binding.
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
            session: FetchSession::new("pull-request-statistics"),
        }
    }

    /// Current statistics state without triggering a fetch.
    #[must_use]
    pub fn state(&self) -> FetchState<PullRequestStatistics> {
        self.session.snapshot()
    }

    /// Fetches one page of lifecycle rows and publishes the reduction.
    pub async fn refresh(&self) -> FetchState<PullRequestStatistics> {
        let cycle = self.session.begin();

        match self.fetch_statistics().await {
            Ok(statistics) => {
                let _applied = self.session.complete(cycle, Ok(statistics));
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

    async fn fetch_statistics(&self) -> Result<PullRequestStatistics, GithubError> {
        let locator = self
            .repository
            .as_ref()
            .ok_or(GithubError::MissingRepository)?;
        let token = self.tokens.access_token(REPOSITORY_SCOPES).await?;
        let request = PageRequest::new(1, STATISTICS_PAGE_SIZE)?;
        let rows = self
            .gateway
            .list_pull_request_activity(&token, locator, &request)
            .await?;
        Ok(compute_statistics(&rows))
    }
}

#[cfg(test)]
#[expect(clippy::expect_used, reason = "Tests panic on failure")]
mod tests {
    use std::sync::Arc;

    use chrono::{DateTime, Utc};
    use rstest::rstest;

    use crate::auth::StaticTokenProvider;
    use crate::fetch::RecordingReporter;
    use crate::github::gateway::MockPullRequestGateway;
    use crate::github::locator::RepositoryLocator;
    use crate::github::models::PullRequestActivity;

    use super::{
        PullRequestStatistics, STATISTICS_PAGE_SIZE, StatisticsLister, compute_statistics,
        format_duration,
    };

    fn timestamp(value: &str) -> Option<DateTime<Utc>> {
        Some(
            value
                .parse::<DateTime<Utc>>()
                .expect("timestamp literal should parse"),
        )
    }

    fn merged_row(created: &str, merged: &str, lines: u64) -> PullRequestActivity {
        PullRequestActivity {
            created_at: timestamp(created),
            closed_at: timestamp(merged),
            merged_at: timestamp(merged),
            additions: Some(lines),
            deletions: Some(0),
        }
    }

    fn closed_unmerged_row(created: &str, closed: &str) -> PullRequestActivity {
        PullRequestActivity {
            created_at: timestamp(created),
            closed_at: timestamp(closed),
            merged_at: None,
            additions: None,
            deletions: None,
        }
    }

    #[test]
    fn empty_page_yields_defined_zero_values() {
        let statistics = compute_statistics(&[]);

        assert_eq!(statistics, PullRequestStatistics::default());
        assert_eq!(statistics.merged_to_closed_ratio, "0%");
        assert_eq!(statistics.average_size_in_lines, "0");
        assert_eq!(statistics.average_time_to_merge, "0m");
    }

    #[test]
    fn closed_without_merges_keeps_ratio_defined() {
        let rows = [
            closed_unmerged_row("2026-08-01T00:00:00Z", "2026-08-02T00:00:00Z"),
            closed_unmerged_row("2026-08-03T00:00:00Z", "2026-08-04T00:00:00Z"),
        ];

        let statistics = compute_statistics(&rows);

        assert_eq!(statistics.merged_to_closed_ratio, "0%");
        assert_eq!(statistics.average_time_to_merge, "0m");
    }

    #[test]
    fn mixed_page_reduces_counts_and_averages() {
        let rows = [
            merged_row("2026-08-01T00:00:00Z", "2026-08-01T07:20:00Z", 120),
            merged_row("2026-08-02T00:00:00Z", "2026-08-02T07:20:00Z", 80),
            closed_unmerged_row("2026-08-03T00:00:00Z", "2026-08-04T00:00:00Z"),
        ];

        let statistics = compute_statistics(&rows);

        assert_eq!(statistics.average_time_to_merge, "7h 20m");
        assert_eq!(statistics.average_size_in_lines, "100");
        assert_eq!(statistics.merged_to_closed_ratio, "66%");
    }

    #[rstest]
    #[case::zero(0, "0m")]
    #[case::minutes_only(20 * 60, "20m")]
    #[case::hours_and_minutes(7 * 3600 + 20 * 60, "7h 20m")]
    #[case::days_and_hours(2 * 86_400 + 3 * 3600 + 5 * 60, "2d 3h")]
    fn durations_format_largest_two_units(#[case] seconds: i64, #[case] formatted: &str) {
        assert_eq!(format_duration(seconds), formatted);
    }

    #[tokio::test]
    async fn refresh_requests_a_full_page_and_publishes_the_reduction() {
        let mut gateway = MockPullRequestGateway::new();
        gateway
            .expect_list_pull_request_activity()
            .withf(|_, _, request| {
                request.page() == 1 && request.per_page() == STATISTICS_PAGE_SIZE
            })
            .times(1)
            .returning(|_, _, _| {
                Ok(vec![PullRequestActivity {
                    created_at: "2026-08-01T00:00:00Z".parse().ok(),
                    closed_at: "2026-08-01T01:00:00Z".parse().ok(),
                    merged_at: "2026-08-01T01:00:00Z".parse().ok(),
                    additions: Some(10),
                    deletions: Some(4),
                }])
            });

        let reporter = Arc::new(RecordingReporter::default());
        let tokens = StaticTokenProvider::new(None, Some("token".to_owned()));
        let locator = RepositoryLocator::from_owner_repo("theorg", "the-service")
            .expect("owner and repo should validate");
        let lister = StatisticsLister::new(gateway, tokens, reporter, Some(locator));

        let state = lister.refresh().await;

        let statistics = state.value.expect("statistics should publish");
        assert_eq!(statistics.average_time_to_merge, "1h 0m");
        assert_eq!(statistics.average_size_in_lines, "14");
        assert_eq!(statistics.merged_to_closed_ratio, "100%");
    }

    #[tokio::test]
    async fn refresh_without_repository_reports_and_fails() {
        let gateway = MockPullRequestGateway::new();
        let reporter = Arc::new(RecordingReporter::default());
        let reporter_sink: Arc<dyn crate::fetch::ErrorReporter> = reporter.clone();
        let tokens = StaticTokenProvider::new(None, Some("token".to_owned()));
        let lister = StatisticsLister::new(gateway, tokens, reporter_sink, None);

        let state = lister.refresh().await;

        assert!(state.error.is_some(), "missing repository should fail");
        assert_eq!(reporter.messages().len(), 1);
        assert_eq!(
            state.value,
            Some(PullRequestStatistics::default()),
            "failed state should publish the zero statistics"
        );
    }
}
