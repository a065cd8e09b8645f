//! HTTP surface of the catalog.
//!
//! Entity routes require an `x-tenant` header and reject requests without
//! one before touching the catalog. Location routes are shared across
//! tenants and take no header. Query parameters on the entity listing
//! translate into [`EntityFilter`]s, with repeated keys merging into one
//! filter.

use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;

use super::error::CatalogError;
use super::model::{Entity, EntityFilter, Location};
use super::service::{EntitiesCatalog, LocationsCatalog};

/// Header naming the tenant an entity request acts for.
pub const TENANT_HEADER: &str = "x-tenant";

/// Shared handler state: the catalogs behind the routes.
#[derive(Clone)]
pub struct CatalogState {
    /// Tenant-scoped entity catalog.
    pub entities: Arc<dyn EntitiesCatalog>,
    /// Shared location registry.
    pub locations: Arc<dyn LocationsCatalog>,
}

/// Builds the catalog router over the given state.
#[must_use]
pub fn catalog_router(state: CatalogState) -> Router {
    Router::new()
        .route("/entities", get(list_entities).post(add_entity))
        .route(
            "/entities/by-uid/{uid}",
            get(entity_by_uid).delete(remove_entity_by_uid),
        )
        .route(
            "/entities/by-name/{kind}/{namespace}/{name}",
            get(entity_by_name),
        )
        .route("/locations", get(list_locations).post(add_location))
        .route(
            "/locations/{id}",
            get(location).delete(remove_location),
        )
        .route("/locations/{id}/history", get(location_history))
        .with_state(state)
}

fn require_tenant(headers: &HeaderMap) -> Result<String, CatalogError> {
    headers
        .get(TENANT_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|tenant| !tenant.is_empty())
        .map(str::to_owned)
        .ok_or(CatalogError::MissingTenant)
}

fn filters_from_query(pairs: Vec<(String, String)>) -> Vec<EntityFilter> {
    let mut filters: Vec<EntityFilter> = Vec::new();
    for (key, value) in pairs {
        if let Some(filter) = filters.iter_mut().find(|filter| filter.key == key) {
            filter.values.push(value);
            continue;
        }
        filters.push(EntityFilter {
            key,
            values: vec![value],
        });
    }
    filters
}

async fn list_entities(
    State(state): State<CatalogState>,
    headers: HeaderMap,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<Vec<Entity>>, CatalogError> {
    let tenant = require_tenant(&headers)?;
    let filters = filters_from_query(pairs);
    let entities = state.entities.entities(&tenant, &filters).await?;
    Ok(Json(entities))
}

async fn add_entity(
    State(state): State<CatalogState>,
    headers: HeaderMap,
    Json(entity): Json<Entity>,
) -> Result<Json<Entity>, CatalogError> {
    let tenant = require_tenant(&headers)?;
    let added = state.entities.add_entity(&tenant, entity).await?;
    Ok(Json(added))
}

async fn entity_by_uid(
    State(state): State<CatalogState>,
    headers: HeaderMap,
    Path(uid): Path<String>,
) -> Result<Json<Entity>, CatalogError> {
    let tenant = require_tenant(&headers)?;
    let entity = state.entities.entity_by_uid(&tenant, &uid).await?;
    Ok(Json(entity))
}

async fn remove_entity_by_uid(
    State(state): State<CatalogState>,
    headers: HeaderMap,
    Path(uid): Path<String>,
) -> Result<impl IntoResponse, CatalogError> {
    let tenant = require_tenant(&headers)?;
    state.entities.remove_entity_by_uid(&tenant, &uid).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn entity_by_name(
    State(state): State<CatalogState>,
    headers: HeaderMap,
    Path((kind, namespace, name)): Path<(String, String, String)>,
) -> Result<Json<Entity>, CatalogError> {
    let tenant = require_tenant(&headers)?;
    let entity = state
        .entities
        .entity_by_name(&tenant, &kind, &namespace, &name)
        .await?;
    Ok(Json(entity))
}

async fn list_locations(
    State(state): State<CatalogState>,
) -> Result<impl IntoResponse, CatalogError> {
    let locations = state.locations.locations().await?;
    Ok(Json(locations))
}

async fn add_location(
    State(state): State<CatalogState>,
    Json(location): Json<Location>,
) -> Result<impl IntoResponse, CatalogError> {
    let registered = state.locations.add_location(location).await?;
    Ok(Json(registered))
}

async fn location(
    State(state): State<CatalogState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, CatalogError> {
    let found = state.locations.location(&id).await?;
    Ok(Json(found))
}

async fn remove_location(
    State(state): State<CatalogState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, CatalogError> {
    state.locations.remove_location(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn location_history(
    State(state): State<CatalogState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, CatalogError> {
    let history = state.locations.location_history(&id).await?;
    Ok(Json(history))
}

#[cfg(test)]
#[expect(clippy::expect_used, reason = "Tests panic on failure")]
#[expect(clippy::indexing_slicing, reason = "Tests index into known-size fixtures")]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use crate::catalog::error::CatalogError;
    use crate::catalog::model::{Entity, LocationRecord, LocationResponse};
    use crate::catalog::service::{
        EntitiesCatalog, LocationsCatalog, MockEntitiesCatalog, MockLocationsCatalog,
    };

    use super::{CatalogState, TENANT_HEADER, catalog_router, filters_from_query};

    fn state_with(
        entities: MockEntitiesCatalog,
        locations: MockLocationsCatalog,
    ) -> CatalogState {
        let entities: Arc<dyn EntitiesCatalog> = Arc::new(entities);
        let locations: Arc<dyn LocationsCatalog> = Arc::new(locations);
        CatalogState {
            entities,
            locations,
        }
    }

    fn sample_entity() -> Entity {
        Entity {
            uid: Some("uid-1".to_owned()),
            kind: "Component".to_owned(),
            namespace: "default".to_owned(),
            name: "payments".to_owned(),
            payload: serde_json::json!({}),
        }
    }

    async fn body_string(body: Body) -> String {
        let bytes = axum::body::to_bytes(body, usize::MAX)
            .await
            .expect("body should collect");
        String::from_utf8(bytes.to_vec()).expect("body should be UTF-8")
    }

    #[test]
    fn repeated_query_keys_merge_into_one_filter() {
        let filters = filters_from_query(vec![
            ("kind".to_owned(), "Component".to_owned()),
            ("owner".to_owned(), "team-a".to_owned()),
            ("kind".to_owned(), "Api".to_owned()),
        ]);

        assert_eq!(filters.len(), 2);
        assert_eq!(filters[0].key, "kind");
        assert_eq!(filters[0].values, vec!["Component", "Api"]);
        assert_eq!(filters[1].key, "owner");
        assert_eq!(filters[1].values, vec!["team-a"]);
    }

    #[tokio::test]
    async fn entity_routes_reject_requests_without_a_tenant() {
        let mut entities = MockEntitiesCatalog::new();
        entities.expect_entities().times(0);
        let router = catalog_router(state_with(entities, MockLocationsCatalog::new()));

        let response = router
            .oneshot(
                Request::builder()
                    .uri("/entities")
                    .body(Body::empty())
                    .expect("request should build"),
            )
            .await
            .expect("router should respond");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn entity_listing_passes_tenant_and_filters_through() {
        let mut entities = MockEntitiesCatalog::new();
        entities
            .expect_entities()
            .withf(|tenant, filters| {
                tenant == "acme"
                    && filters.len() == 1
                    && filters[0].key == "kind"
                    && filters[0].values == ["Component"]
            })
            .returning(|_, _| Ok(vec![]));
        let router = catalog_router(state_with(entities, MockLocationsCatalog::new()));

        let response = router
            .oneshot(
                Request::builder()
                    .uri("/entities?kind=Component")
                    .header(TENANT_HEADER, "acme")
                    .body(Body::empty())
                    .expect("request should build"),
            )
            .await
            .expect("router should respond");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response.into_body()).await, "[]");
    }

    #[tokio::test]
    async fn deleting_an_entity_returns_no_content() {
        let mut entities = MockEntitiesCatalog::new();
        entities
            .expect_remove_entity_by_uid()
            .withf(|tenant, uid| tenant == "acme" && uid == "uid-1")
            .returning(|_, _| Ok(()));
        let router = catalog_router(state_with(entities, MockLocationsCatalog::new()));

        let response = router
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri("/entities/by-uid/uid-1")
                    .header(TENANT_HEADER, "acme")
                    .body(Body::empty())
                    .expect("request should build"),
            )
            .await
            .expect("router should respond");

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert!(body_string(response.into_body()).await.is_empty());
    }

    #[tokio::test]
    async fn unknown_entities_map_to_not_found_with_the_catalog_message() {
        let mut entities = MockEntitiesCatalog::new();
        entities
            .expect_entity_by_uid()
            .returning(|_, uid| Err(CatalogError::no_entity_with_uid(uid)));
        let router = catalog_router(state_with(entities, MockLocationsCatalog::new()));

        let response = router
            .oneshot(
                Request::builder()
                    .uri("/entities/by-uid/missing")
                    .header(TENANT_HEADER, "acme")
                    .body(Body::empty())
                    .expect("request should build"),
            )
            .await
            .expect("router should respond");

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            body_string(response.into_body()).await,
            "No entity with uid missing"
        );
    }

    #[tokio::test]
    async fn registering_an_entity_echoes_it_with_a_uid() {
        let mut entities = MockEntitiesCatalog::new();
        entities
            .expect_add_entity()
            .withf(|tenant, entity| tenant == "acme" && entity.name == "payments")
            .returning(|_, entity| {
                Ok(Entity {
                    uid: Some("uid-1".to_owned()),
                    ..entity
                })
            });
        let router = catalog_router(state_with(entities, MockLocationsCatalog::new()));

        let response = router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/entities")
                    .header(TENANT_HEADER, "acme")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        r#"{"kind":"Component","name":"payments"}"#,
                    ))
                    .expect("request should build"),
            )
            .await
            .expect("router should respond");

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_string(response.into_body()).await;
        let echoed: Entity = serde_json::from_str(&body).expect("body should decode");
        assert_eq!(echoed.uid.as_deref(), Some("uid-1"));
        assert_eq!(echoed.namespace, "default", "namespace defaults");
    }

    #[tokio::test]
    async fn location_routes_need_no_tenant_header() {
        let mut locations = MockLocationsCatalog::new();
        locations.expect_locations().returning(|| {
            Ok(vec![LocationResponse {
                data: LocationRecord {
                    id: "loc-1".to_owned(),
                    location_type: "github".to_owned(),
                    target: "https://example.com/catalog.yaml".to_owned(),
                },
                current_status: None,
            }])
        });
        let router = catalog_router(state_with(MockEntitiesCatalog::new(), locations));

        let response = router
            .oneshot(
                Request::builder()
                    .uri("/locations")
                    .body(Body::empty())
                    .expect("request should build"),
            )
            .await
            .expect("router should respond");

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_string(response.into_body()).await;
        assert!(body.contains("\"loc-1\""));
        assert!(body.contains("\"github\""));
    }

    #[tokio::test]
    async fn deleting_a_location_returns_no_content() {
        let mut locations = MockLocationsCatalog::new();
        locations
            .expect_remove_location()
            .withf(|id| id == "loc-1")
            .returning(|_| Ok(()));
        let router = catalog_router(state_with(MockEntitiesCatalog::new(), locations));

        let response = router
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri("/locations/loc-1")
                    .body(Body::empty())
                    .expect("request should build"),
            )
            .await
            .expect("router should respond");

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }
}
