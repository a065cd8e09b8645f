//! Repository contributor listing operation.

use std::io::{self, Write};
use std::sync::Arc;

use greenroom::github::PullRequestGateway;
use greenroom::{
    ContributorsLister, ErrorReporter, GreenroomConfig, OctocrabPullRequestGateway,
    RepositoryLocator, TracingReporter,
};

use super::CliError;
use super::output::write_contributors;

/// Lists contributors for a repository.
///
/// # Errors
///
/// Returns [`CliError::Config`] if required configuration is missing and
/// [`CliError::Fetch`] if the listing resolves with a failure.
pub async fn run(config: &GreenroomConfig) -> Result<(), CliError> {
    let mut stdout = io::stdout().lock();
    run_with_gateway(config, OctocrabPullRequestGateway::new(), &mut stdout).await
}

/// Lists contributors using a custom gateway.
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

    let mut lister = ContributorsLister::new(gateway, tokens, reporter, Some(locator));
    if let Some(count) = config.contributor_count {
        lister = lister.with_count(count);
    }

    let state = lister.refresh().await;
    if let Some(failure) = state.error {
        return Err(CliError::Fetch {
            message: failure.message,
        });
    }

    let contributors = state.value.unwrap_or_default();
    write_contributors(writer, &contributors, owner, repo)
}
