//! Catalog REST API server operation.

use std::sync::Arc;

use greenroom::catalog::{
    CatalogState, CatalogStore, EntitiesCatalog, LocationsCatalog, SqliteEntitiesCatalog,
    SqliteLocationsCatalog, catalog_router,
};
use greenroom::persistence::migrate_database;
use greenroom::telemetry::StderrJsonlTelemetrySink;
use greenroom::GreenroomConfig;

use super::CliError;
use super::output::io_error;

/// Serves the catalog REST API until the process is stopped.
///
/// Pending migrations are applied before the listener binds, so a fresh
/// database file works without a separate migration run.
///
/// # Errors
///
/// Returns [`CliError::Persistence`] if the database cannot be prepared
/// and [`CliError::Io`] if the listener cannot bind or serving fails.
pub async fn run(config: &GreenroomConfig) -> Result<(), CliError> {
    let database_url = config.require_database_url()?;

    let telemetry = StderrJsonlTelemetrySink;
    migrate_database(database_url, &telemetry).map(drop)?;

    let store = CatalogStore::new(database_url)?;
    let router = catalog_router(catalog_state(store));

    let listen_addr = config.listen_addr();
    let listener = tokio::net::TcpListener::bind(listen_addr)
        .await
        .map_err(|error| io_error(&error))?;
    tracing::info!(addr = listen_addr, "serving catalog");

    axum::serve(listener, router)
        .await
        .map_err(|error| io_error(&error))
}

fn catalog_state(store: CatalogStore) -> CatalogState {
    let entities: Arc<dyn EntitiesCatalog> = Arc::new(SqliteEntitiesCatalog::new(store.clone()));
    let locations: Arc<dyn LocationsCatalog> = Arc::new(SqliteLocationsCatalog::new(store));
    CatalogState {
        entities,
        locations,
    }
}
