//! Catalog persistence and database migrations.
//!
//! Greenroom stores catalog entities, locations, and location update
//! history in a local `SQLite` database. The schema is managed with Diesel
//! migrations so the database can be created and upgraded consistently
//! across machines.

mod error;
mod migrator;

pub use error::PersistenceError;
pub use migrator::{
    CURRENT_SCHEMA_VERSION, INITIAL_SCHEMA_VERSION, MIGRATIONS, SchemaVersion, migrate_database,
};

pub(crate) use migrator::enable_foreign_keys;
