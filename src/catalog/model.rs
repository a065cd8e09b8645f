//! Catalog data model: entities, locations, and update history.

use serde::{Deserialize, Serialize};

/// Tenant the locations catalog is scoped to by default.
pub const DEFAULT_LOCATIONS_TENANT: &str = "tenant1";

fn default_namespace() -> String {
    "default".to_owned()
}

fn default_payload() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

/// One catalog entity.
///
/// The `uid` is assigned by the catalog on first registration; clients may
/// omit it when posting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    /// Catalog-assigned unique identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    /// Entity kind, e.g. `Component`.
    pub kind: String,
    /// Namespace, defaulting to `default`.
    #[serde(default = "default_namespace")]
    pub namespace: String,
    /// Name, unique within (tenant, kind, namespace).
    pub name: String,
    /// Free-form descriptor body.
    #[serde(default = "default_payload")]
    pub payload: serde_json::Value,
}

/// One filter condition against the entity listing.
///
/// `kind`, `namespace`, `name`, and `uid` match their columns; any other
/// key matches the same-named field in the payload. An entity matches a
/// filter when its value for the key equals any of the listed values,
/// case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityFilter {
    /// Field or payload key to match.
    pub key: String,
    /// Accepted values.
    pub values: Vec<String>,
}

/// A location registration request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    /// Location type, e.g. `github`.
    #[serde(rename = "type")]
    pub location_type: String,
    /// Target address the location points at.
    pub target: String,
}

/// A registered location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationRecord {
    /// Catalog-assigned identifier.
    pub id: String,
    /// Location type, e.g. `github`.
    #[serde(rename = "type")]
    pub location_type: String,
    /// Target address the location points at.
    pub target: String,
}

/// Outcome of one location update attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LocationUpdateStatus {
    /// The update applied.
    #[serde(rename = "SUCCESS")]
    Success,
    /// The update failed.
    #[serde(rename = "FAIL")]
    Fail,
}

/// One entry in a location's update history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationUpdateLogEvent {
    /// Log entry identifier.
    pub id: i64,
    /// Location the entry belongs to.
    pub location_id: String,
    /// Outcome of the update.
    pub status: LocationUpdateStatus,
    /// Entity the update concerned, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_name: Option<String>,
    /// Failure detail, when the update failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Timestamp the entry was written.
    pub created_at: String,
}

/// Latest known update status for a location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationCurrentStatus {
    /// Outcome of the most recent update.
    pub status: LocationUpdateStatus,
    /// Failure detail, when the update failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Timestamp of the most recent update.
    pub timestamp: String,
}

/// A location together with its latest update status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationResponse {
    /// The registered location.
    pub data: LocationRecord,
    /// Latest update status, absent before the first update attempt.
    #[serde(rename = "currentStatus", skip_serializing_if = "Option::is_none")]
    pub current_status: Option<LocationCurrentStatus>,
}

impl LocationUpdateStatus {
    /// Database representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "SUCCESS",
            Self::Fail => "FAIL",
        }
    }

    /// Parses the database representation.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "SUCCESS" => Some(Self::Success),
            "FAIL" => Some(Self::Fail),
            _ => None,
        }
    }
}
