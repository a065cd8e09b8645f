//! Database migration operations.

use greenroom::GreenroomConfig;
use greenroom::persistence::migrate_database;
use greenroom::telemetry::StderrJsonlTelemetrySink;

use super::CliError;

/// Runs database migrations.
///
/// # Errors
///
/// Returns [`CliError::Persistence`] if the database URL is missing or
/// blank, or if connecting or migrating fails.
pub fn run(config: &GreenroomConfig) -> Result<(), CliError> {
    let database_url = config.require_database_url()?;

    let telemetry = StderrJsonlTelemetrySink;
    migrate_database(database_url, &telemetry)
        .map(drop)
        .map_err(CliError::from)
}
