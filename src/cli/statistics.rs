//! Repository pull request statistics operation.

use std::io::{self, Write};
use std::sync::Arc;

use greenroom::github::PullRequestGateway;
use greenroom::{
    ErrorReporter, GreenroomConfig, OctocrabPullRequestGateway, RepositoryLocator,
    StatisticsLister, TracingReporter,
};

use super::CliError;
use super::output::write_statistics;

/// Summarises a repository's pull requests.
///
/// # Errors
///
/// Returns [`CliError::Config`] if required configuration is missing and
/// [`CliError::Fetch`] if the fetch resolves with a failure.
pub async fn run(config: &GreenroomConfig) -> Result<(), CliError> {
    let mut stdout = io::stdout().lock();
    run_with_gateway(config, OctocrabPullRequestGateway::new(), &mut stdout).await
}

/// Summarises pull requests using a custom gateway.
///
/// This function is exposed for testing with stub gateways.
pub async fn run_with_gateway<G, W>(
    config: &GreenroomConfig,
    gateway: G,
    writer: &mut W,
) -> Result<(), CliError>
where
    G: PullRequestGateway,
    W: Write,
{
    let (owner, repo) = config.require_repository_info()?;
    let locator = RepositoryLocator::from_owner_repo(owner, repo)?;
    let tokens = config.github_token_provider()?;
    let reporter: Arc<dyn ErrorReporter> = Arc::new(TracingReporter);

    let lister = StatisticsLister::new(gateway, tokens, reporter, Some(locator));
    let state = lister.refresh().await;
    if let Some(failure) = state.error {
        return Err(CliError::Fetch {
            message: failure.message,
        });
    }

    let statistics = state.value.unwrap_or_default();
    write_statistics(writer, &statistics, owner, repo)
}
