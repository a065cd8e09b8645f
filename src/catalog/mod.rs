//! Multi-tenant software catalog.
//!
//! Entities and locations live in `SQLite` behind the [`CatalogStore`];
//! the [`EntitiesCatalog`] and [`LocationsCatalog`] traits front it for
//! the HTTP layer, which [`catalog_router`] assembles.

mod error;
mod http;
mod model;
mod service;
mod storage;

pub use error::CatalogError;
pub use http::{CatalogState, TENANT_HEADER, catalog_router};
pub use model::{
    DEFAULT_LOCATIONS_TENANT, Entity, EntityFilter, Location, LocationCurrentStatus,
    LocationRecord, LocationResponse, LocationUpdateLogEvent, LocationUpdateStatus,
};
pub use service::{
    EntitiesCatalog, LocationsCatalog, SqliteEntitiesCatalog, SqliteLocationsCatalog,
};
pub use storage::CatalogStore;

#[cfg(test)]
pub use service::{MockEntitiesCatalog, MockLocationsCatalog};
