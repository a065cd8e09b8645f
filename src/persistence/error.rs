//! Failure cases for the catalog database.

use thiserror::Error;

/// Everything that can go wrong opening, upgrading, or using the catalog
/// `SQLite` database.
///
/// The first two variants are configuration problems and carry no detail;
/// the rest wrap a Diesel error message for diagnosis.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PersistenceError {
    /// No database URL/path was provided at all.
    #[error("a database URL is required (pass --database-url or set GREENROOM_DATABASE_URL)")]
    MissingDatabaseUrl,

    /// A database URL was provided but contains only whitespace.
    #[error("the database URL must not be blank")]
    BlankDatabaseUrl,

    /// The `SQLite` file could not be opened or created.
    #[error("could not open SQLite database: {message}")]
    ConnectionFailed {
        /// Connection error detail from Diesel.
        message: String,
    },

    /// The `PRAGMA foreign_keys` statement failed on a fresh connection.
    #[error("could not enable foreign keys: {message}")]
    ForeignKeysEnableFailed {
        /// Execution error detail from Diesel.
        message: String,
    },

    /// Applying pending migrations failed, leaving the schema unchanged
    /// or partially upgraded.
    #[error("could not run catalog migrations: {message}")]
    MigrationFailed {
        /// Migration error detail from Diesel.
        message: String,
    },

    /// The migration bookkeeping table could not be read back.
    #[error("could not read the schema version after migrating: {message}")]
    SchemaVersionQueryFailed {
        /// Query error detail from Diesel.
        message: String,
    },

    /// Migrations reported success but left no version row behind.
    #[error("no schema version was recorded after migrations ran")]
    MissingSchemaVersion,

    /// A catalog read failed.
    #[error("catalog query failed: {message}")]
    QueryFailed {
        /// Query error detail from Diesel.
        message: String,
    },

    /// A catalog write failed.
    #[error("catalog write failed: {message}")]
    WriteFailed {
        /// Statement error detail from Diesel.
        message: String,
    },
}
