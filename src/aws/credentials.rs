//! Cognito identity exchange for Google-authenticated listings.
//!
//! Mirrors the unsigned Cognito Identity JSON API: `GetId` resolves the
//! caller's identity from a Google token, then `GetCredentialsForIdentity`
//! trades that identity for temporary credentials.

use std::collections::HashMap;

use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::auth::IdentityToken;

use super::error::AwsError;

/// Login provider key Cognito expects for Google identity tokens.
pub const GOOGLE_LOGIN_PROVIDER: &str = "accounts.google.com";

const TARGET_HEADER: &str = "x-amz-target";
const GET_ID_TARGET: &str = "AWSCognitoIdentityService.GetId";
const GET_CREDENTIALS_TARGET: &str = "AWSCognitoIdentityService.GetCredentialsForIdentity";
const AMZ_JSON: &str = "application/x-amz-json-1.1";

/// Temporary credentials for one listing session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemporaryCredentials {
    /// Access key identifier.
    pub access_key_id: String,
    /// Access key secret.
    pub secret_access_key: String,
    /// Session token, absent for long-lived key pairs.
    pub session_token: Option<String>,
}

impl TemporaryCredentials {
    /// Builds credentials from a configured long-lived key pair.
    #[must_use]
    pub const fn from_key_pair(access_key_id: String, secret_access_key: String) -> Self {
        Self {
            access_key_id,
            secret_access_key,
            session_token: None,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct GetIdRequest<'a> {
    identity_pool_id: &'a str,
    logins: HashMap<&'a str, &'a str>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct GetIdResponse {
    identity_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct GetCredentialsRequest<'a> {
    identity_id: &'a str,
    logins: HashMap<&'a str, &'a str>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct GetCredentialsResponse {
    credentials: ApiCredentials,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ApiCredentials {
    access_key_id: String,
    secret_key: String,
    session_token: Option<String>,
}

/// Client for the Cognito Identity JSON API.
#[derive(Debug, Clone)]
pub struct CognitoIdentityBroker {
    http: reqwest::Client,
    endpoint: Url,
}

impl CognitoIdentityBroker {
    /// Creates a broker against a region's public Cognito endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`AwsError::IdentityExchange`] when the region does not form
    /// a valid endpoint URL.
    pub fn for_region(http: reqwest::Client, region: &str) -> Result<Self, AwsError> {
        let endpoint = Url::parse(&format!("https://cognito-identity.{region}.amazonaws.com/"))
            .map_err(|error| AwsError::IdentityExchange {
                message: format!("invalid region {region}: {error}"),
            })?;
        Ok(Self { http, endpoint })
    }

    /// Creates a broker against an explicit endpoint, e.g. a local stack.
    #[must_use]
    pub const fn with_endpoint(http: reqwest::Client, endpoint: Url) -> Self {
        Self { http, endpoint }
    }

    /// Exchanges a Google identity token for temporary credentials.
    ///
    /// # Errors
    ///
    /// Returns [`AwsError::Api`] on a rejected exchange, [`AwsError::Network`]
    /// on transport failure, and [`AwsError::ResponseDecode`] when a response
    /// body does not match the documented shape.
    pub async fn exchange_google_token(
        &self,
        identity_pool_id: &str,
        id_token: &IdentityToken,
    ) -> Result<TemporaryCredentials, AwsError> {
        let logins: HashMap<&str, &str> =
            HashMap::from([(GOOGLE_LOGIN_PROVIDER, id_token.value())]);

        let identity: GetIdResponse = self
            .post_target(
                GET_ID_TARGET,
                &GetIdRequest {
                    identity_pool_id,
                    logins: logins.clone(),
                },
            )
            .await?;

        let granted: GetCredentialsResponse = self
            .post_target(
                GET_CREDENTIALS_TARGET,
                &GetCredentialsRequest {
                    identity_id: &identity.identity_id,
                    logins,
                },
            )
            .await?;

        Ok(TemporaryCredentials {
            access_key_id: granted.credentials.access_key_id,
            secret_access_key: granted.credentials.secret_key,
            session_token: granted.credentials.session_token,
        })
    }

    async fn post_target<Request, Response>(
        &self,
        target: &str,
        request: &Request,
    ) -> Result<Response, AwsError>
    where
        Request: Serialize + Sync,
        Response: for<'de> Deserialize<'de>,
    {
        let response = self
            .http
            .post(self.endpoint.clone())
            .header(TARGET_HEADER, target)
            .header(reqwest::header::CONTENT_TYPE, AMZ_JSON)
            .json(request)
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

        response
            .json::<Response>()
            .await
            .map_err(|error| AwsError::decode(&error))
    }
}
