//! REST client for the Lambda list-functions endpoint.

use reqwest::Url;
use serde::Deserialize;

use super::credentials::TemporaryCredentials;
use super::error::AwsError;

/// Default cap on the number of functions listed per call.
pub const DEFAULT_MAX_ITEMS: u8 = 2;

const LIST_FUNCTIONS_PATH: &str = "2015-03-31/functions/";
const SECURITY_TOKEN_HEADER: &str = "x-amz-security-token";

/// One Lambda function, normalised for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LambdaFunction {
    /// Function name.
    pub function_name: String,
    /// Free-text description.
    pub description: String,
    /// Deployment package size in bytes.
    pub code_size: u64,
    /// Last-modified timestamp as reported by AWS.
    pub last_modified: String,
    /// Runtime identifier, e.g. `nodejs22.x`.
    pub runtime: String,
    /// Memory limit in megabytes.
    pub memory: u32,
    /// Region the listing was made against.
    pub region: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ApiFunctionConfiguration {
    function_name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    code_size: Option<u64>,
    #[serde(default)]
    last_modified: Option<String>,
    #[serde(default)]
    runtime: Option<String>,
    #[serde(default)]
    memory_size: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ListFunctionsResponse {
    #[serde(default)]
    functions: Vec<ApiFunctionConfiguration>,
}

/// Client for one region's Lambda endpoint.
///
/// Requests are unsigned; the session token travels in its own header so
/// the client works against credential-aware local stacks without a
/// signing dependency.
#[derive(Debug, Clone)]
pub struct LambdaClient {
    http: reqwest::Client,
    endpoint: Url,
    region: String,
}

impl LambdaClient {
    /// Creates a client against a region's public Lambda endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`AwsError::Network`] when the region does not form a valid
    /// endpoint URL.
    pub fn for_region(http: reqwest::Client, region: &str) -> Result<Self, AwsError> {
        let endpoint = Url::parse(&format!("https://lambda.{region}.amazonaws.com/")).map_err(
            |error| AwsError::Network {
                message: format!("invalid region {region}: {error}"),
            },
        )?;
        Ok(Self {
            http,
            endpoint,
            region: region.to_owned(),
        })
    }

    /// Creates a client against an explicit endpoint, e.g. a local stack.
    #[must_use]
    pub fn with_endpoint(http: reqwest::Client, endpoint: Url, region: &str) -> Self {
        Self {
            http,
            endpoint,
            region: region.to_owned(),
        }
    }

    /// Lists up to `max_items` functions in the client's region.
    ///
    /// # Errors
    ///
    /// Returns [`AwsError::Api`] on a non-success status, [`AwsError::Network`]
    /// on transport failure, and [`AwsError::ResponseDecode`] when the body
    /// does not match the documented shape.
    pub async fn list_functions(
        &self,
        credentials: &TemporaryCredentials,
        max_items: u8,
    ) -> Result<Vec<LambdaFunction>, AwsError> {
        let url = self
            .endpoint
            .join(LIST_FUNCTIONS_PATH)
            .map_err(|error| AwsError::Network {
                message: format!("invalid list-functions URL: {error}"),
            })?;

        let mut request = self
            .http
            .get(url)
            .query(&[("MaxItems", max_items.to_string())]);
        if let Some(session_token) = credentials.session_token.as_deref() {
            request = request.header(SECURITY_TOKEN_HEADER, session_token);
        }

        let response = request
            .send()
            .await
            .map_err(|error| AwsError::network(&error))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(AwsError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let listing: ListFunctionsResponse = response
            .json()
            .await
            .map_err(|error| AwsError::decode(&error))?;

        Ok(listing
            .functions
            .into_iter()
            .map(|function| self.normalise(function))
            .collect())
    }

    fn normalise(&self, function: ApiFunctionConfiguration) -> LambdaFunction {
        LambdaFunction {
            function_name: function.function_name,
            description: function.description.unwrap_or_default(),
            code_size: function.code_size.unwrap_or_default(),
            last_modified: function.last_modified.unwrap_or_default(),
            runtime: function.runtime.unwrap_or_default(),
            memory: function.memory_size.unwrap_or_default(),
            region: self.region.clone(),
        }
    }
}
