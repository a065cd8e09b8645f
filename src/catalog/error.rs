//! Error taxonomy for the catalog REST surface.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::persistence::PersistenceError;

/// Errors raised by catalog operations and mapped onto HTTP statuses.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The `x-tenant` header was missing or empty.
    #[error("the x-tenant header is required")]
    MissingTenant,

    /// The request carried input the catalog cannot interpret.
    #[error("invalid input: {message}")]
    InvalidInput {
        /// Description of the rejected input.
        message: String,
    },

    /// The requested entity or location does not exist.
    #[error("{message}")]
    NotFound {
        /// Description of what was not found.
        message: String,
    },

    /// The storage layer failed.
    #[error(transparent)]
    Storage(#[from] PersistenceError),
}

impl CatalogError {
    /// HTTP status this error maps onto.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::MissingTenant | Self::InvalidInput { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Builds a not-found error for an entity uid.
    #[must_use]
    pub fn no_entity_with_uid(uid: &str) -> Self {
        Self::NotFound {
            message: format!("No entity with uid {uid}"),
        }
    }

    /// Builds a not-found error for an entity name triple.
    #[must_use]
    pub fn no_entity_with_name(kind: &str, namespace: &str, name: &str) -> Self {
        Self::NotFound {
            message: format!("No entity with kind {kind} namespace {namespace} name {name}"),
        }
    }

    /// Builds a not-found error for a location id.
    #[must_use]
    pub fn no_location_with_id(id: &str) -> Self {
        Self::NotFound {
            message: format!("No location with id {id}"),
        }
    }
}

impl IntoResponse for CatalogError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "catalog request failed");
        }
        (status, self.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use crate::persistence::PersistenceError;

    use super::CatalogError;

    #[test]
    fn statuses_follow_the_rest_contract() {
        assert_eq!(CatalogError::MissingTenant.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            CatalogError::no_entity_with_uid("u-1").status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            CatalogError::Storage(PersistenceError::MissingSchemaVersion).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
