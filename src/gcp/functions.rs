//! REST client for the Cloud Functions list endpoint.
//!
//! The endpoint is cursor-paginated: each page may carry a `nextPageToken`
//! which must be echoed back to fetch the following page. The listing
//! terminates when the server omits the cursor.

use reqwest::Url;
use serde::Deserialize;

use crate::auth::AccessToken;

use super::error::GcpError;

/// Page size requested from the Cloud Functions API.
pub const PAGE_SIZE: u8 = 20;

const DEFAULT_ENDPOINT: &str = "https://cloudfunctions.googleapis.com/";

/// One Cloud Function, normalised for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloudFunction {
    /// Short function name, the last segment of the resource name.
    pub name: String,
    /// HTTPS trigger URL, empty for non-HTTP triggers.
    pub url_trigger: String,
    /// Deployment status, e.g. `ACTIVE`.
    pub status: String,
    /// Last update timestamp as reported by the API.
    pub update_time: String,
    /// Runtime identifier, e.g. `nodejs22`.
    pub runtime: String,
    /// Memory limit in megabytes.
    pub available_memory_mb: u32,
    /// Project the listing was made against.
    pub project: String,
    /// Region parsed from the resource name.
    pub region: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiHttpsTrigger {
    #[serde(default)]
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiCloudFunction {
    name: String,
    #[serde(default)]
    https_trigger: Option<ApiHttpsTrigger>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    update_time: Option<String>,
    #[serde(default)]
    runtime: Option<String>,
    #[serde(default)]
    available_memory_mb: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListFunctionsResponse {
    #[serde(default)]
    functions: Vec<ApiCloudFunction>,
    #[serde(default)]
    next_page_token: Option<String>,
}

impl ApiCloudFunction {
    /// Resource names look like
    /// `projects/{project}/locations/{region}/functions/{name}`.
    fn normalise(self, project: &str) -> CloudFunction {
        let mut segments = self.name.rsplit('/');
        let name = segments.next().unwrap_or_default().to_owned();
        let region = segments.nth(1).unwrap_or_default().to_owned();

        CloudFunction {
            name,
            url_trigger: self
                .https_trigger
                .and_then(|trigger| trigger.url)
                .unwrap_or_default(),
            status: self.status.unwrap_or_default(),
            update_time: self.update_time.unwrap_or_default(),
            runtime: self.runtime.unwrap_or_default(),
            available_memory_mb: self.available_memory_mb.unwrap_or_default(),
            project: project.to_owned(),
            region,
        }
    }
}

/// Client for the Cloud Functions v1 REST API.
#[derive(Debug, Clone)]
pub struct CloudFunctionsClient {
    http: reqwest::Client,
    endpoint: Url,
}

impl Default for CloudFunctionsClient {
    fn default() -> Self {
        Self::new(reqwest::Client::new())
    }
}

impl CloudFunctionsClient {
    /// Creates a client against the public endpoint.
    ///
    /// # Panics
    ///
    /// Does not panic in practice: the endpoint literal is a valid URL.
    #[must_use]
    #[expect(clippy::expect_used, reason = "the endpoint literal is a valid URL")]
    pub fn new(http: reqwest::Client) -> Self {
        let endpoint = Url::parse(DEFAULT_ENDPOINT).expect("default endpoint should parse");
        Self { http, endpoint }
    }

    /// Creates a client against an explicit endpoint, e.g. an emulator.
    #[must_use]
    pub const fn with_endpoint(http: reqwest::Client, endpoint: Url) -> Self {
        Self { http, endpoint }
    }

    /// Lists every function in the project across all regions.
    ///
    /// Follows the `nextPageToken` cursor until the server omits it,
    /// accumulating all pages into one listing.
    ///
    /// # Errors
    ///
    /// Returns [`GcpError::Api`] on a non-success status, [`GcpError::Network`]
    /// on transport failure, and [`GcpError::ResponseDecode`] when a body
    /// does not match the documented shape.
    pub async fn list_functions(
        &self,
        token: &AccessToken,
        project: &str,
    ) -> Result<Vec<CloudFunction>, GcpError> {
        let url = self
            .endpoint
            .join(&format!("v1/projects/{project}/locations/-/functions"))
            .map_err(|error| GcpError::Network {
                message: format!("invalid list URL: {error}"),
            })?;

        let mut functions = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let page = self.fetch_page(token, &url, cursor.as_deref()).await?;
            functions.extend(
                page.functions
                    .into_iter()
                    .map(|function| function.normalise(project)),
            );

            match page.next_page_token {
                Some(next) if !next.is_empty() => cursor = Some(next),
                _ => break,
            }
        }

        Ok(functions)
    }

    async fn fetch_page(
        &self,
        token: &AccessToken,
        url: &Url,
        cursor: Option<&str>,
    ) -> Result<ListFunctionsResponse, GcpError> {
        let mut request = self
            .http
            .get(url.clone())
            .bearer_auth(token.value())
            .query(&[("pageSize", PAGE_SIZE.to_string())]);
        if let Some(page_token) = cursor {
            request = request.query(&[("pageToken", page_token)]);
        }

        let response = request.send().await.map_err(|error| GcpError::Network {
            message: error.to_string(),
        })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(GcpError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<ListFunctionsResponse>()
            .await
            .map_err(|error| GcpError::ResponseDecode {
                message: error.to_string(),
            })
    }
}

#[cfg(test)]
#[expect(clippy::expect_used, reason = "Tests panic on failure")]
mod tests {
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::auth::AccessToken;

    use super::{CloudFunctionsClient, GcpError, PAGE_SIZE};

    fn client_for(server: &MockServer) -> CloudFunctionsClient {
        let endpoint = server.uri().parse().expect("mock server URL should parse");
        CloudFunctionsClient::with_endpoint(reqwest::Client::new(), endpoint)
    }

    fn function_body(name: &str) -> serde_json::Value {
        serde_json::json!({
            "name": format!("projects/the-project/locations/us-central1/functions/{name}"),
            "httpsTrigger": { "url": format!("https://example.com/{name}") },
            "status": "ACTIVE",
            "updateTime": "2026-08-20T10:00:00Z",
            "runtime": "nodejs22",
            "availableMemoryMb": 256
        })
    }

    #[test]
    fn default_endpoint_parses() {
        let client = CloudFunctionsClient::default();
        assert!(format!("{client:?}").contains("cloudfunctions.googleapis.com"));
    }

    #[tokio::test]
    async fn listing_follows_the_cursor_until_omitted() {
        let server = MockServer::start().await;
        let client = client_for(&server);
        let list_path = "/v1/projects/the-project/locations/-/functions";

        Mock::given(method("GET"))
            .and(path(list_path))
            .and(query_param("pageSize", PAGE_SIZE.to_string()))
            .and(query_param("pageToken", "cursor-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "functions": [function_body("second")]
            })))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path(list_path))
            .and(query_param("pageSize", PAGE_SIZE.to_string()))
            .and(header("authorization", "Bearer google-access-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "functions": [function_body("first")],
                "nextPageToken": "cursor-1"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let functions = client
            .list_functions(&AccessToken::new("google-access-token"), "the-project")
            .await
            .expect("listing should succeed");

        assert_eq!(functions.len(), 2, "both pages should accumulate");
        let first = functions.first().expect("should have first function");
        assert_eq!(first.name, "first");
        assert_eq!(first.region, "us-central1");
        assert_eq!(first.project, "the-project");
        assert_eq!(first.url_trigger, "https://example.com/first");
    }

    #[tokio::test]
    async fn non_success_status_maps_to_api_error() {
        let server = MockServer::start().await;
        let client = client_for(&server);

        Mock::given(method("GET"))
            .and(path("/v1/projects/the-project/locations/-/functions"))
            .respond_with(ResponseTemplate::new(403).set_body_string("PERMISSION_DENIED"))
            .mount(&server)
            .await;

        let error = client
            .list_functions(&AccessToken::new("google-access-token"), "the-project")
            .await
            .expect_err("listing should fail");

        assert!(
            matches!(error, GcpError::Api { status: 403, .. }),
            "expected Api 403, got {error:?}"
        );
    }
}
