//! `SQLite`-backed catalog store.
//!
//! All reads and writes are tenant-scoped. Entity filters compile into a
//! parameterised query: the well-known keys (`kind`, `namespace`, `name`,
//! `uid`) match their columns and any other key matches the same-named
//! field in the JSON payload via `json_extract`.

use diesel::Connection;
use diesel::OptionalExtension;
use diesel::QueryableByName;
use diesel::RunQueryDsl;
use diesel::sql_query;
use diesel::sql_types::{BigInt, Nullable, Text};
use diesel::sqlite::{Sqlite, SqliteConnection};
use uuid::Uuid;

use crate::persistence::{PersistenceError, enable_foreign_keys};

use super::model::{
    Entity, EntityFilter, Location, LocationCurrentStatus, LocationRecord, LocationResponse,
    LocationUpdateLogEvent, LocationUpdateStatus,
};

#[derive(Debug, QueryableByName)]
struct EntityRow {
    #[diesel(sql_type = Text)]
    uid: String,
    #[diesel(sql_type = Text)]
    kind: String,
    #[diesel(sql_type = Text)]
    namespace: String,
    #[diesel(sql_type = Text)]
    name: String,
    #[diesel(sql_type = Text)]
    payload: String,
}

#[derive(Debug, QueryableByName)]
struct UidRow {
    #[diesel(sql_type = Text)]
    uid: String,
}

#[derive(Debug, QueryableByName)]
struct LocationRow {
    #[diesel(sql_type = Text)]
    id: String,
    #[diesel(sql_type = Text)]
    location_type: String,
    #[diesel(sql_type = Text)]
    target: String,
    #[diesel(sql_type = Nullable<Text>)]
    status: Option<String>,
    #[diesel(sql_type = Nullable<Text>)]
    message: Option<String>,
    #[diesel(sql_type = Nullable<Text>)]
    event_created_at: Option<String>,
}

#[derive(Debug, QueryableByName)]
struct LogRow {
    #[diesel(sql_type = BigInt)]
    id: i64,
    #[diesel(sql_type = Text)]
    location_id: String,
    #[diesel(sql_type = Text)]
    status: String,
    #[diesel(sql_type = Nullable<Text>)]
    entity_name: Option<String>,
    #[diesel(sql_type = Nullable<Text>)]
    message: Option<String>,
    #[diesel(sql_type = Text)]
    created_at: String,
}

const ENTITY_COLUMNS: &str = "uid, kind, namespace, name, payload";

const LATEST_EVENT_JOIN: &str = "LEFT JOIN location_update_log e ON e.id = \
     (SELECT id FROM location_update_log \
      WHERE location_id = l.id ORDER BY created_at DESC, id DESC LIMIT 1)";

/// `SQLite`-backed store for catalog entities and locations.
#[derive(Debug, Clone)]
pub struct CatalogStore {
    database_url: String,
}

impl CatalogStore {
    /// Create a store targeting the configured `database_url`.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError::BlankDatabaseUrl`] when the URL is blank.
    pub fn new(database_url: impl Into<String>) -> Result<Self, PersistenceError> {
        let database_url_string = database_url.into();
        if database_url_string.trim().is_empty() {
            return Err(PersistenceError::BlankDatabaseUrl);
        }
        Ok(Self {
            database_url: database_url_string,
        })
    }

    /// Lists a tenant's entities matching every supplied filter.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] when the database cannot be opened or
    /// the query fails.
    pub fn entities(
        &self,
        tenant: &str,
        filters: &[EntityFilter],
    ) -> Result<Vec<Entity>, PersistenceError> {
        let mut connection = self.establish_connection()?;

        let mut sql = format!(
            "SELECT {ENTITY_COLUMNS} FROM entities WHERE tenant = ?"
        );
        let mut binds: Vec<String> = vec![tenant.to_owned()];

        for filter in filters {
            if filter.values.is_empty() {
                continue;
            }
            let placeholders = placeholders(filter.values.len());
            match filter.key.as_str() {
                column @ ("uid" | "kind" | "namespace" | "name") => {
                    sql.push_str(&format!(" AND lower({column}) IN ({placeholders})"));
                }
                key => {
                    sql.push_str(&format!(
                        " AND lower(coalesce(json_extract(payload, ?), '')) IN ({placeholders})"
                    ));
                    binds.push(format!("$.{key}"));
                }
            }
            binds.extend(filter.values.iter().map(|value| value.to_lowercase()));
        }

        sql.push_str(" ORDER BY kind, namespace, name;");

        let mut query = sql_query(sql).into_boxed::<Sqlite>();
        for bind in binds {
            query = query.bind::<Text, _>(bind);
        }

        let rows: Vec<EntityRow> = query
            .load(&mut connection)
            .map_err(|error| Self::query_failed(&error))?;

        rows.into_iter().map(Self::entity_from_row).collect()
    }

    /// Inserts an entity or updates its payload if the name triple exists.
    ///
    /// A uid is assigned on first registration and preserved on update.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] when the database cannot be opened or
    /// the write fails.
    pub fn add_or_update_entity(
        &self,
        tenant: &str,
        entity: Entity,
    ) -> Result<Entity, PersistenceError> {
        let mut connection = self.establish_connection()?;

        let existing: Option<UidRow> = sql_query(
            "SELECT uid FROM entities \
             WHERE tenant = ? AND kind = ? AND namespace = ? AND name = ? LIMIT 1;",
        )
        .bind::<Text, _>(tenant)
        .bind::<Text, _>(&entity.kind)
        .bind::<Text, _>(&entity.namespace)
        .bind::<Text, _>(&entity.name)
        .get_result(&mut connection)
        .optional()
        .map_err(|error| Self::query_failed(&error))?;

        let uid = existing.map_or_else(
            || {
                entity
                    .uid
                    .clone()
                    .unwrap_or_else(|| Uuid::new_v4().to_string())
            },
            |row| row.uid,
        );

        let payload = serde_json::to_string(&entity.payload).map_err(|error| {
            PersistenceError::WriteFailed {
                message: format!("could not serialise payload: {error}"),
            }
        })?;

        sql_query(
            "INSERT INTO entities (tenant, uid, kind, namespace, name, payload) \
             VALUES (?, ?, ?, ?, ?, ?) \
             ON CONFLICT(tenant, kind, namespace, name) DO UPDATE SET \
               payload = excluded.payload, \
               updated_at = CURRENT_TIMESTAMP;",
        )
        .bind::<Text, _>(tenant)
        .bind::<Text, _>(&uid)
        .bind::<Text, _>(&entity.kind)
        .bind::<Text, _>(&entity.namespace)
        .bind::<Text, _>(&entity.name)
        .bind::<Text, _>(&payload)
        .execute(&mut connection)
        .map(drop)
        .map_err(|error| Self::write_failed(&error))?;

        Ok(Entity {
            uid: Some(uid),
            ..entity
        })
    }

    /// Fetches one entity by uid.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] when the database cannot be opened or
    /// the query fails.
    pub fn entity_by_uid(
        &self,
        tenant: &str,
        uid: &str,
    ) -> Result<Option<Entity>, PersistenceError> {
        let mut connection = self.establish_connection()?;

        let row: Option<EntityRow> = sql_query(format!(
            "SELECT {ENTITY_COLUMNS} FROM entities WHERE tenant = ? AND uid = ? LIMIT 1;"
        ))
        .bind::<Text, _>(tenant)
        .bind::<Text, _>(uid)
        .get_result(&mut connection)
        .optional()
        .map_err(|error| Self::query_failed(&error))?;

        row.map(Self::entity_from_row).transpose()
    }

    /// Fetches one entity by its (kind, namespace, name) triple.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] when the database cannot be opened or
    /// the query fails.
    pub fn entity_by_name(
        &self,
        tenant: &str,
        kind: &str,
        namespace: &str,
        name: &str,
    ) -> Result<Option<Entity>, PersistenceError> {
        let mut connection = self.establish_connection()?;

        let row: Option<EntityRow> = sql_query(format!(
            "SELECT {ENTITY_COLUMNS} FROM entities \
             WHERE tenant = ? AND kind = ? AND namespace = ? AND name = ? LIMIT 1;"
        ))
        .bind::<Text, _>(tenant)
        .bind::<Text, _>(kind)
        .bind::<Text, _>(namespace)
        .bind::<Text, _>(name)
        .get_result(&mut connection)
        .optional()
        .map_err(|error| Self::query_failed(&error))?;

        row.map(Self::entity_from_row).transpose()
    }

    /// Deletes an entity by uid, reporting whether a row was removed.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] when the database cannot be opened or
    /// the write fails.
    pub fn remove_entity_by_uid(&self, tenant: &str, uid: &str) -> Result<bool, PersistenceError> {
        let mut connection = self.establish_connection()?;

        let affected = sql_query("DELETE FROM entities WHERE tenant = ? AND uid = ?;")
            .bind::<Text, _>(tenant)
            .bind::<Text, _>(uid)
            .execute(&mut connection)
            .map_err(|error| Self::write_failed(&error))?;

        Ok(affected > 0)
    }

    /// Registers a location, assigning it an identifier.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] when the database cannot be opened or
    /// the write fails.
    pub fn add_location(
        &self,
        tenant: &str,
        location: &Location,
    ) -> Result<LocationRecord, PersistenceError> {
        let mut connection = self.establish_connection()?;
        let id = Uuid::new_v4().to_string();

        sql_query(
            "INSERT INTO locations (id, tenant, location_type, target) VALUES (?, ?, ?, ?);",
        )
        .bind::<Text, _>(&id)
        .bind::<Text, _>(tenant)
        .bind::<Text, _>(&location.location_type)
        .bind::<Text, _>(&location.target)
        .execute(&mut connection)
        .map(drop)
        .map_err(|error| Self::write_failed(&error))?;

        Ok(LocationRecord {
            id,
            location_type: location.location_type.clone(),
            target: location.target.clone(),
        })
    }

    /// Lists a tenant's locations with their latest update status.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] when the database cannot be opened or
    /// the query fails.
    pub fn locations(&self, tenant: &str) -> Result<Vec<LocationResponse>, PersistenceError> {
        let mut connection = self.establish_connection()?;

        let rows: Vec<LocationRow> = sql_query(format!(
            "SELECT l.id, l.location_type, l.target, \
                    e.status, e.message, e.created_at AS event_created_at \
             FROM locations l {LATEST_EVENT_JOIN} \
             WHERE l.tenant = ? ORDER BY l.created_at, l.id;"
        ))
        .bind::<Text, _>(tenant)
        .load(&mut connection)
        .map_err(|error| Self::query_failed(&error))?;

        rows.into_iter().map(Self::location_from_row).collect()
    }

    /// Fetches one location with its latest update status.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] when the database cannot be opened or
    /// the query fails.
    pub fn location(
        &self,
        tenant: &str,
        id: &str,
    ) -> Result<Option<LocationResponse>, PersistenceError> {
        let mut connection = self.establish_connection()?;

        let row: Option<LocationRow> = sql_query(format!(
            "SELECT l.id, l.location_type, l.target, \
                    e.status, e.message, e.created_at AS event_created_at \
             FROM locations l {LATEST_EVENT_JOIN} \
             WHERE l.tenant = ? AND l.id = ? LIMIT 1;"
        ))
        .bind::<Text, _>(tenant)
        .bind::<Text, _>(id)
        .get_result(&mut connection)
        .optional()
        .map_err(|error| Self::query_failed(&error))?;

        row.map(Self::location_from_row).transpose()
    }

    /// Deletes a location and its history, reporting whether it existed.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] when the database cannot be opened or
    /// the write fails.
    pub fn remove_location(&self, tenant: &str, id: &str) -> Result<bool, PersistenceError> {
        let mut connection = self.establish_connection()?;

        let affected = sql_query("DELETE FROM locations WHERE tenant = ? AND id = ?;")
            .bind::<Text, _>(tenant)
            .bind::<Text, _>(id)
            .execute(&mut connection)
            .map_err(|error| Self::write_failed(&error))?;

        Ok(affected > 0)
    }

    /// Lists a location's update history, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] when the database cannot be opened or
    /// the query fails.
    pub fn location_history(
        &self,
        tenant: &str,
        id: &str,
    ) -> Result<Vec<LocationUpdateLogEvent>, PersistenceError> {
        let mut connection = self.establish_connection()?;

        let rows: Vec<LogRow> = sql_query(
            "SELECT id, location_id, status, entity_name, message, created_at \
             FROM location_update_log \
             WHERE tenant = ? AND location_id = ? \
             ORDER BY created_at DESC, id DESC;",
        )
        .bind::<Text, _>(tenant)
        .bind::<Text, _>(id)
        .load(&mut connection)
        .map_err(|error| Self::query_failed(&error))?;

        rows.into_iter().map(Self::log_event_from_row).collect()
    }

    /// Appends an update outcome to a location's history.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] when the database cannot be opened or
    /// the write fails.
    pub fn add_location_update_log_event(
        &self,
        tenant: &str,
        location_id: &str,
        status: LocationUpdateStatus,
        entity_name: Option<&str>,
        message: Option<&str>,
    ) -> Result<(), PersistenceError> {
        let mut connection = self.establish_connection()?;

        sql_query(
            "INSERT INTO location_update_log (tenant, location_id, status, entity_name, message) \
             VALUES (?, ?, ?, ?, ?);",
        )
        .bind::<Text, _>(tenant)
        .bind::<Text, _>(location_id)
        .bind::<Text, _>(status.as_str())
        .bind::<Nullable<Text>, _>(entity_name)
        .bind::<Nullable<Text>, _>(message)
        .execute(&mut connection)
        .map(drop)
        .map_err(|error| Self::write_failed(&error))
    }

    fn entity_from_row(row: EntityRow) -> Result<Entity, PersistenceError> {
        let payload = serde_json::from_str(&row.payload).map_err(|error| {
            PersistenceError::QueryFailed {
                message: format!("could not decode entity payload: {error}"),
            }
        })?;
        Ok(Entity {
            uid: Some(row.uid),
            kind: row.kind,
            namespace: row.namespace,
            name: row.name,
            payload,
        })
    }

    fn location_from_row(row: LocationRow) -> Result<LocationResponse, PersistenceError> {
        let current_status = match (row.status, row.event_created_at) {
            (Some(raw_status), Some(timestamp)) => {
                let status = LocationUpdateStatus::parse(&raw_status).ok_or_else(|| {
                    PersistenceError::QueryFailed {
                        message: format!("unknown update status {raw_status}"),
                    }
                })?;
                Some(LocationCurrentStatus {
                    status,
                    message: row.message,
                    timestamp,
                })
            }
            _ => None,
        };

        Ok(LocationResponse {
            data: LocationRecord {
                id: row.id,
                location_type: row.location_type,
                target: row.target,
            },
            current_status,
        })
    }

    fn log_event_from_row(row: LogRow) -> Result<LocationUpdateLogEvent, PersistenceError> {
        let status = LocationUpdateStatus::parse(&row.status).ok_or_else(|| {
            PersistenceError::QueryFailed {
                message: format!("unknown update status {status}", status = row.status),
            }
        })?;
        Ok(LocationUpdateLogEvent {
            id: row.id,
            location_id: row.location_id,
            status,
            entity_name: row.entity_name,
            message: row.message,
            created_at: row.created_at,
        })
    }

    fn establish_connection(&self) -> Result<SqliteConnection, PersistenceError> {
        let mut connection = SqliteConnection::establish(&self.database_url).map_err(|error| {
            PersistenceError::ConnectionFailed {
                message: error.to_string(),
            }
        })?;
        enable_foreign_keys(&mut connection)?;
        Ok(connection)
    }

    fn query_failed(error: &diesel::result::Error) -> PersistenceError {
        PersistenceError::QueryFailed {
            message: error.to_string(),
        }
    }

    fn write_failed(error: &diesel::result::Error) -> PersistenceError {
        PersistenceError::WriteFailed {
            message: error.to_string(),
        }
    }
}

fn placeholders(count: usize) -> String {
    let mut list = String::new();
    for index in 0..count {
        if index > 0 {
            list.push_str(", ");
        }
        list.push('?');
    }
    list
}
