//! Repository pull request listing operation.

use std::io::{self, Write};
use std::sync::Arc;

use greenroom::github::PullRequestGateway;
use greenroom::{
    ErrorReporter, GreenroomConfig, OctocrabPullRequestGateway, PullRequestLister,
    RepositoryLocator, TracingReporter,
};

use super::CliError;
use super::output::{ListingPagination, write_pull_request_listing};

/// Lists pull requests for a repository.
///
/// # Errors
///
/// Returns [`CliError::Config`] if required configuration is missing and
/// [`CliError::Fetch`] if the listing resolves with a failure.
pub async fn run(config: &GreenroomConfig) -> Result<(), CliError> {
    let mut stdout = io::stdout().lock();
    run_with_gateway(config, OctocrabPullRequestGateway::new(), &mut stdout).await
}

/// Lists pull requests using a custom gateway.
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

    let lister = PullRequestLister::new(gateway, tokens, reporter, Some(locator));
    if let Some(page_size) = config.page_size {
        lister.set_page_size(page_size);
    }
    if let Some(page) = config.page {
        lister.set_page(page);
    }

    let state = lister.refresh().await;
    if let Some(failure) = state.error {
        return Err(CliError::Fetch {
            message: failure.message,
        });
    }

    let pagination = ListingPagination {
        page: lister.page(),
        page_size: lister.page_size(),
        total: lister.total(),
    };
    let items = state.value.unwrap_or_default();
    write_pull_request_listing(writer, &items, &pagination, owner, repo)
}
