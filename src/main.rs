//! Greenroom CLI entrypoint.
//!
//! Dispatches on the configured operation mode: resource listings print
//! to stdout, maintenance modes prepare the local database, and `--serve`
//! runs the catalog REST API.

use std::io::{self, Write};
use std::process::ExitCode;

use greenroom::{ConfigError, GreenroomConfig, OperationMode};
use ortho_config::OrthoConfig;
use tracing_subscriber::EnvFilter;

mod cli;

use cli::CliError;

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            if writeln!(io::stderr().lock(), "{error}").is_err() {
                return ExitCode::FAILURE;
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), CliError> {
    let config = load_config()?;

    match config.operation_mode() {
        OperationMode::MigrateDatabase => cli::migrations::run(&config),
        OperationMode::Serve => cli::serve::run(&config).await,
        OperationMode::LambdaListing => cli::lambdas::run(&config).await,
        OperationMode::FunctionsListing => cli::functions::run(&config).await,
        OperationMode::Statistics => cli::statistics::run(&config).await,
        OperationMode::Contributors => cli::contributors::run(&config).await,
        OperationMode::PullRequestListing => cli::pull_requests::run(&config).await,
        OperationMode::Unspecified => Err(CliError::Config(ConfigError::Invalid {
            message: "nothing to do: pass --owner and --repo, a cloud listing flag, \
                      --serve, or --migrate-db"
                .to_owned(),
        })),
    }
}

/// Loads configuration from CLI, environment, and files.
///
/// # Errors
///
/// Returns [`CliError::Config`] when ortho-config fails to parse arguments
/// or load configuration files.
fn load_config() -> Result<GreenroomConfig, CliError> {
    GreenroomConfig::load().map_err(|error| {
        CliError::Config(ConfigError::Invalid {
            message: error.to_string(),
        })
    })
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();
}
