//! GCP Cloud Functions listing operation.

use std::io::{self, Write};
use std::sync::Arc;

use greenroom::gcp::{CloudFunctionsClient, CloudFunctionsGateway};
use greenroom::{ErrorReporter, FunctionsLister, GreenroomConfig, TracingReporter};

use super::CliError;
use super::output::write_functions_listing;

/// Lists Cloud Functions in the configured project.
///
/// # Errors
///
/// Returns [`CliError::Config`] if required configuration is missing and
/// [`CliError::Fetch`] if the listing resolves with a failure.
pub async fn run(config: &GreenroomConfig) -> Result<(), CliError> {
    let mut stdout = io::stdout().lock();
    run_with_gateway(config, CloudFunctionsClient::new(reqwest::Client::new()), &mut stdout).await
}

/// Lists Cloud Functions using a custom gateway.
///
/// This function is exposed for testing with stub gateways.
pub async fn run_with_gateway<G, W>(
    config: &GreenroomConfig,
    gateway: G,
    writer: &mut W,
) -> Result<(), CliError>
where
    G: CloudFunctionsGateway,
    W: Write,
{
    let settings = config.functions_settings()?;
    let project = settings.project.clone().unwrap_or_default();
    let tokens = config.google_token_provider();
    let reporter: Arc<dyn ErrorReporter> = Arc::new(TracingReporter);

    let lister = FunctionsLister::new(gateway, tokens, reporter, settings);
    let state = lister.refresh().await;
    if let Some(failure) = state.error {
        return Err(CliError::Fetch {
            message: failure.message,
        });
    }

    let functions = state.value.unwrap_or_default();
    write_functions_listing(writer, &functions, &project)
}
