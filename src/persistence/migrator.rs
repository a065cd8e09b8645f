//! Schema migrations for the catalog database.
//!
//! Migrations are embedded in the binary so a catalog database can be
//! created or upgraded anywhere the binary runs. After applying, the
//! resulting schema version is read back and published as telemetry.

use diesel::sql_types::Text;
use diesel::sqlite::SqliteConnection;
use diesel::{Connection, OptionalExtension, QueryableByName, RunQueryDsl, sql_query};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};

use crate::telemetry::{TelemetryEvent, TelemetrySink};

use super::PersistenceError;

/// Embedded Diesel migrations shipped with the binary.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Version recorded by the first migration in this repository.
pub const INITIAL_SCHEMA_VERSION: &str = "20260829000000";

/// Version after every bundled migration has been applied.
pub const CURRENT_SCHEMA_VERSION: &str = INITIAL_SCHEMA_VERSION;

const LATEST_VERSION_QUERY: &str =
    "SELECT version FROM __diesel_schema_migrations ORDER BY version DESC LIMIT 1;";

#[derive(Debug, QueryableByName)]
struct VersionRow {
    #[diesel(sql_type = Text)]
    version: String,
}

/// A Diesel migration version string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaVersion(String);

impl SchemaVersion {
    /// Returns the inner version string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Applies pending migrations and reports the resulting schema version.
///
/// # Errors
///
/// Returns [`PersistenceError`] when the URL is blank, the database cannot
/// be opened, a migration fails, or the version cannot be read back.
pub fn migrate_database(
    database_url: &str,
    telemetry: &dyn TelemetrySink,
) -> Result<SchemaVersion, PersistenceError> {
    let url = database_url.trim();
    if url.is_empty() {
        return Err(PersistenceError::BlankDatabaseUrl);
    }

    let mut connection =
        SqliteConnection::establish(url).map_err(|error| PersistenceError::ConnectionFailed {
            message: error.to_string(),
        })?;
    enable_foreign_keys(&mut connection)?;

    connection
        .run_pending_migrations(MIGRATIONS)
        .map_err(|error| PersistenceError::MigrationFailed {
            message: error.to_string(),
        })?;

    let applied = latest_applied_version(&mut connection)?;
    telemetry.record(TelemetryEvent::SchemaVersionRecorded {
        schema_version: applied.as_str().to_owned(),
    });
    Ok(applied)
}

/// Turns on `SQLite` foreign-key enforcement for a connection.
///
/// Must run on every fresh connection; the pragma is per-connection state.
pub(crate) fn enable_foreign_keys(
    connection: &mut SqliteConnection,
) -> Result<(), PersistenceError> {
    sql_query("PRAGMA foreign_keys = ON;")
        .execute(connection)
        .map(drop)
        .map_err(|error| PersistenceError::ForeignKeysEnableFailed {
            message: error.to_string(),
        })
}

fn latest_applied_version(
    connection: &mut SqliteConnection,
) -> Result<SchemaVersion, PersistenceError> {
    let row: Option<VersionRow> = sql_query(LATEST_VERSION_QUERY)
        .get_result(connection)
        .optional()
        .map_err(|error| PersistenceError::SchemaVersionQueryFailed {
            message: error.to_string(),
        })?;

    row.map(|found| SchemaVersion(found.version))
        .ok_or(PersistenceError::MissingSchemaVersion)
}
