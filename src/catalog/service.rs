//! Catalog service traits and their `SQLite`-backed implementations.
//!
//! The HTTP layer talks to [`EntitiesCatalog`] and [`LocationsCatalog`];
//! the `SQLite` implementations run the blocking store off the async
//! runtime. Locations are shared across tenants and always live under
//! [`DEFAULT_LOCATIONS_TENANT`](super::model::DEFAULT_LOCATIONS_TENANT).

use async_trait::async_trait;

use crate::persistence::PersistenceError;

use super::error::CatalogError;
use super::model::{
    DEFAULT_LOCATIONS_TENANT, Entity, EntityFilter, Location, LocationRecord, LocationResponse,
    LocationUpdateLogEvent, LocationUpdateStatus,
};
use super::storage::CatalogStore;

/// Tenant-scoped entity catalog operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EntitiesCatalog: Send + Sync {
    /// Lists the tenant's entities matching every supplied filter.
    async fn entities(
        &self,
        tenant: &str,
        filters: &[EntityFilter],
    ) -> Result<Vec<Entity>, CatalogError>;

    /// Registers an entity or updates its payload, returning it with a uid.
    async fn add_entity(&self, tenant: &str, entity: Entity) -> Result<Entity, CatalogError>;

    /// Fetches one entity by uid.
    async fn entity_by_uid(&self, tenant: &str, uid: &str) -> Result<Entity, CatalogError>;

    /// Fetches one entity by its (kind, namespace, name) triple.
    async fn entity_by_name(
        &self,
        tenant: &str,
        kind: &str,
        namespace: &str,
        name: &str,
    ) -> Result<Entity, CatalogError>;

    /// Deletes an entity by uid.
    async fn remove_entity_by_uid(&self, tenant: &str, uid: &str) -> Result<(), CatalogError>;
}

/// Location registry operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LocationsCatalog: Send + Sync {
    /// Registers a location.
    async fn add_location(&self, location: Location) -> Result<LocationRecord, CatalogError>;

    /// Lists registered locations with their latest update status.
    async fn locations(&self) -> Result<Vec<LocationResponse>, CatalogError>;

    /// Fetches one location with its latest update status.
    async fn location(&self, id: &str) -> Result<LocationResponse, CatalogError>;

    /// Deletes a location and its update history.
    async fn remove_location(&self, id: &str) -> Result<(), CatalogError>;

    /// Lists a location's update history, newest first.
    async fn location_history(&self, id: &str)
    -> Result<Vec<LocationUpdateLogEvent>, CatalogError>;

    /// Records a successful update of a location.
    async fn log_update_success(
        &self,
        id: &str,
        entity_name: Option<String>,
    ) -> Result<(), CatalogError>;

    /// Records a failed update of a location.
    async fn log_update_failure(
        &self,
        id: &str,
        message: Option<String>,
    ) -> Result<(), CatalogError>;
}

/// Entity catalog backed by the `SQLite` store.
#[derive(Debug, Clone)]
pub struct SqliteEntitiesCatalog {
    store: CatalogStore,
}

impl SqliteEntitiesCatalog {
    /// Wraps the given store.
    #[must_use]
    pub const fn new(store: CatalogStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl EntitiesCatalog for SqliteEntitiesCatalog {
    async fn entities(
        &self,
        tenant: &str,
        filters: &[EntityFilter],
    ) -> Result<Vec<Entity>, CatalogError> {
        let store = self.store.clone();
        let tenant_owned = tenant.to_owned();
        let filters_owned = filters.to_vec();
        run_blocking(move || store.entities(&tenant_owned, &filters_owned)).await
    }

    async fn add_entity(&self, tenant: &str, entity: Entity) -> Result<Entity, CatalogError> {
        let store = self.store.clone();
        let tenant_owned = tenant.to_owned();
        run_blocking(move || store.add_or_update_entity(&tenant_owned, entity)).await
    }

    async fn entity_by_uid(&self, tenant: &str, uid: &str) -> Result<Entity, CatalogError> {
        let store = self.store.clone();
        let tenant_owned = tenant.to_owned();
        let uid_owned = uid.to_owned();
        let found = run_blocking(move || store.entity_by_uid(&tenant_owned, &uid_owned)).await?;
        found.ok_or_else(|| CatalogError::no_entity_with_uid(uid))
    }

    async fn entity_by_name(
        &self,
        tenant: &str,
        kind: &str,
        namespace: &str,
        name: &str,
    ) -> Result<Entity, CatalogError> {
        let store = self.store.clone();
        let tenant_owned = tenant.to_owned();
        let kind_owned = kind.to_owned();
        let namespace_owned = namespace.to_owned();
        let name_owned = name.to_owned();
        let found = run_blocking(move || {
            store.entity_by_name(&tenant_owned, &kind_owned, &namespace_owned, &name_owned)
        })
        .await?;
        found.ok_or_else(|| CatalogError::no_entity_with_name(kind, namespace, name))
    }

    async fn remove_entity_by_uid(&self, tenant: &str, uid: &str) -> Result<(), CatalogError> {
        let store = self.store.clone();
        let tenant_owned = tenant.to_owned();
        let uid_owned = uid.to_owned();
        let removed =
            run_blocking(move || store.remove_entity_by_uid(&tenant_owned, &uid_owned)).await?;
        if removed {
            Ok(())
        } else {
            Err(CatalogError::no_entity_with_uid(uid))
        }
    }
}

/// Location registry backed by the `SQLite` store.
#[derive(Debug, Clone)]
pub struct SqliteLocationsCatalog {
    store: CatalogStore,
}

impl SqliteLocationsCatalog {
    /// Wraps the given store.
    #[must_use]
    pub const fn new(store: CatalogStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl LocationsCatalog for SqliteLocationsCatalog {
    async fn add_location(&self, location: Location) -> Result<LocationRecord, CatalogError> {
        let store = self.store.clone();
        run_blocking(move || store.add_location(DEFAULT_LOCATIONS_TENANT, &location)).await
    }

    async fn locations(&self) -> Result<Vec<LocationResponse>, CatalogError> {
        let store = self.store.clone();
        run_blocking(move || store.locations(DEFAULT_LOCATIONS_TENANT)).await
    }

    async fn location(&self, id: &str) -> Result<LocationResponse, CatalogError> {
        let store = self.store.clone();
        let id_owned = id.to_owned();
        let found =
            run_blocking(move || store.location(DEFAULT_LOCATIONS_TENANT, &id_owned)).await?;
        found.ok_or_else(|| CatalogError::no_location_with_id(id))
    }

    async fn remove_location(&self, id: &str) -> Result<(), CatalogError> {
        let store = self.store.clone();
        let id_owned = id.to_owned();
        let removed =
            run_blocking(move || store.remove_location(DEFAULT_LOCATIONS_TENANT, &id_owned))
                .await?;
        if removed {
            Ok(())
        } else {
            Err(CatalogError::no_location_with_id(id))
        }
    }

    async fn location_history(
        &self,
        id: &str,
    ) -> Result<Vec<LocationUpdateLogEvent>, CatalogError> {
        let store = self.store.clone();
        let id_owned = id.to_owned();
        run_blocking(move || store.location_history(DEFAULT_LOCATIONS_TENANT, &id_owned)).await
    }

    async fn log_update_success(
        &self,
        id: &str,
        entity_name: Option<String>,
    ) -> Result<(), CatalogError> {
        let store = self.store.clone();
        let id_owned = id.to_owned();
        run_blocking(move || {
            store.add_location_update_log_event(
                DEFAULT_LOCATIONS_TENANT,
                &id_owned,
                LocationUpdateStatus::Success,
                entity_name.as_deref(),
                None,
            )
        })
        .await
    }

    async fn log_update_failure(
        &self,
        id: &str,
        message: Option<String>,
    ) -> Result<(), CatalogError> {
        let store = self.store.clone();
        let id_owned = id.to_owned();
        run_blocking(move || {
            store.add_location_update_log_event(
                DEFAULT_LOCATIONS_TENANT,
                &id_owned,
                LocationUpdateStatus::Fail,
                None,
                message.as_deref(),
            )
        })
        .await
    }
}

async fn run_blocking<T>(
    work: impl FnOnce() -> Result<T, PersistenceError> + Send + 'static,
) -> Result<T, CatalogError>
where
    T: Send + 'static,
{
    let outcome = tokio::task::spawn_blocking(work).await.map_err(|error| {
        PersistenceError::QueryFailed {
            message: format!("catalog task aborted: {error}"),
        }
    })?;
    outcome.map_err(CatalogError::from)
}
