//! Lambda listing service with credential preparation.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use crate::auth::{IdentityToken, TokenProvider};
use crate::fetch::{ErrorReporter, FetchFailure, FetchSession, FetchState};

use super::credentials::{CognitoIdentityBroker, TemporaryCredentials};
use super::error::AwsError;
use super::lambda::{DEFAULT_MAX_ITEMS, LambdaClient, LambdaFunction};

/// How listing credentials are obtained.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AwsAuthMethod {
    /// Exchange a Google identity token through a Cognito identity pool.
    #[default]
    Google,
    /// Use a configured long-lived access key pair directly.
    #[serde(alias = "aws")]
    AccessKeys,
}

/// Settings a Lambda listing reads on every refresh.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LambdaSettings {
    /// Region to list, e.g. `eu-west-1`. Required.
    pub region: Option<String>,
    /// Cognito identity pool for the Google exchange.
    pub identity_pool_id: Option<String>,
    /// Long-lived access key identifier.
    pub access_key_id: Option<String>,
    /// Long-lived access key secret.
    pub access_key_secret: Option<String>,
    /// Selected credential path.
    pub auth_method: AwsAuthMethod,
    /// Cap on listed functions.
    pub max_items: u8,
}

impl LambdaSettings {
    /// Settings for a Google-authenticated listing.
    #[must_use]
    pub const fn for_google(region: String, identity_pool_id: String) -> Self {
        Self {
            region: Some(region),
            identity_pool_id: Some(identity_pool_id),
            access_key_id: None,
            access_key_secret: None,
            auth_method: AwsAuthMethod::Google,
            max_items: DEFAULT_MAX_ITEMS,
        }
    }

    fn region(&self) -> Result<&str, AwsError> {
        self.region
            .as_deref()
            .filter(|region| !region.is_empty())
            .ok_or(AwsError::MissingRegion)
    }
}

/// Gateway that can exchange credentials and list functions.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LambdaGateway: Send + Sync {
    /// Exchanges a Google identity token for temporary credentials.
    async fn credentials_for_google(
        &self,
        region: &str,
        identity_pool_id: &str,
        id_token: &IdentityToken,
    ) -> Result<TemporaryCredentials, AwsError>;

    /// Lists functions in a region.
    async fn list_functions(
        &self,
        region: &str,
        credentials: &TemporaryCredentials,
        max_items: u8,
    ) -> Result<Vec<LambdaFunction>, AwsError>;
}

/// REST-backed gateway combining the Cognito broker and Lambda client.
#[derive(Debug, Clone, Default)]
pub struct AwsRestGateway {
    http: reqwest::Client,
}

impl AwsRestGateway {
    /// Creates the gateway with a shared HTTP client.
    #[must_use]
    pub const fn new(http: reqwest::Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl LambdaGateway for AwsRestGateway {
    async fn credentials_for_google(
        &self,
        region: &str,
        identity_pool_id: &str,
        id_token: &IdentityToken,
    ) -> Result<TemporaryCredentials, AwsError> {
        CognitoIdentityBroker::for_region(self.http.clone(), region)?
            .exchange_google_token(identity_pool_id, id_token)
            .await
    }

    async fn list_functions(
        &self,
        region: &str,
        credentials: &TemporaryCredentials,
        max_items: u8,
    ) -> Result<Vec<LambdaFunction>, AwsError> {
        LambdaClient::for_region(self.http.clone(), region)?
            .list_functions(credentials, max_items)
            .await
    }
}

/// Lambda listing service.
pub struct LambdaLister<G, A> {
    gateway: G,
    tokens: A,
    reporter: Arc<dyn ErrorReporter>,
    settings: LambdaSettings,
    session: FetchSession<Vec<LambdaFunction>>,
}

impl<G, A> LambdaLister<G, A>
where
    G: LambdaGateway,
    A: TokenProvider,
{
    /// Creates a lister over the given settings.
    #[must_use]
    pub fn new(
        gateway: G,
        tokens: A,
        reporter: Arc<dyn ErrorReporter>,
        settings: LambdaSettings,
    ) -> Self {
        Self {
            gateway,
            tokens,
            reporter,
            settings,
            session: FetchSession::new("lambda-functions"),
        }
    }

    /// Current listing state without triggering a fetch.
    #[must_use]
    pub fn state(&self) -> FetchState<Vec<LambdaFunction>> {
        self.session.snapshot()
    }

    /// Fetches the function listing and publishes the outcome.
    ///
    /// Preconditions are validated before any network call: a missing
    /// region or credential configuration is reported and resolves to an
    /// empty listing.
    pub async fn refresh(&self) -> FetchState<Vec<LambdaFunction>> {
        let cycle = self.session.begin();

        match self.fetch_functions().await {
            Ok(functions) => {
                let _applied = self.session.complete(cycle, Ok(functions));
            }
            Err(error) => {
                self.reporter.post(&error);
                let _applied = self
                    .session
                    .complete(cycle, Err(FetchFailure::from_error(&error)));
            }
        }

        self.session.snapshot()
    }

    async fn fetch_functions(&self) -> Result<Vec<LambdaFunction>, AwsError> {
        let region = self.settings.region()?;
        let credentials = self.prepare_credentials(region).await?;
        let max_items = if self.settings.max_items == 0 {
            DEFAULT_MAX_ITEMS
        } else {
            self.settings.max_items
        };
        self.gateway
            .list_functions(region, &credentials, max_items)
            .await
    }

    async fn prepare_credentials(&self, region: &str) -> Result<TemporaryCredentials, AwsError> {
        match self.settings.auth_method {
            AwsAuthMethod::Google => {
                let identity_pool_id = self
                    .settings
                    .identity_pool_id
                    .as_deref()
                    .filter(|pool| !pool.is_empty())
                    .ok_or(AwsError::MissingIdentityPool)?;
                let id_token = self.tokens.id_token().await?;
                self.gateway
                    .credentials_for_google(region, identity_pool_id, &id_token)
                    .await
            }
            AwsAuthMethod::AccessKeys => {
                let access_key_id = self.settings.access_key_id.clone();
                let access_key_secret = self.settings.access_key_secret.clone();
                match (access_key_id, access_key_secret) {
                    (Some(id), Some(secret)) if !id.is_empty() && !secret.is_empty() => {
                        Ok(TemporaryCredentials::from_key_pair(id, secret))
                    }
                    _ => Err(AwsError::MissingAccessKeys),
                }
            }
        }
    }
}
