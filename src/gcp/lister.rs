//! Cloud Functions listing service.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use crate::auth::{AccessToken, TokenProvider};
use crate::fetch::{ErrorReporter, FetchFailure, FetchSession, FetchState};

use super::error::GcpError;
use super::functions::{CloudFunction, CloudFunctionsClient};

/// OAuth scope requested for Cloud Functions reads.
const CLOUD_PLATFORM_SCOPES: &[&str] = &["https://www.googleapis.com/auth/cloud-platform"];

/// How the listing authenticates against the API.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GcpAuthMethod {
    /// OAuth access token from the auth collaborator.
    #[default]
    Google,
    /// Raw API key. The list endpoint needs a bearer token, so this
    /// method fails closed with an empty listing and no network call.
    #[serde(alias = "API_KEY")]
    ApiKey,
}

/// Settings a Cloud Functions listing reads on every refresh.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FunctionsSettings {
    /// Project to list. Required for authenticated listings.
    pub project: Option<String>,
    /// Selected credential path.
    pub auth_method: GcpAuthMethod,
}

/// Gateway that can list Cloud Functions.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CloudFunctionsGateway: Send + Sync {
    /// Lists every function in a project across all regions.
    async fn list_functions(
        &self,
        token: &AccessToken,
        project: &str,
    ) -> Result<Vec<CloudFunction>, GcpError>;
}

#[async_trait]
impl CloudFunctionsGateway for CloudFunctionsClient {
    async fn list_functions(
        &self,
        token: &AccessToken,
        project: &str,
    ) -> Result<Vec<CloudFunction>, GcpError> {
        CloudFunctionsClient::list_functions(self, token, project).await
    }
}

/// Cloud Functions listing service.
pub struct FunctionsLister<G, A> {
    gateway: G,
    tokens: A,
    reporter: Arc<dyn ErrorReporter>,
    settings: FunctionsSettings,
    session: FetchSession<Vec<CloudFunction>>,
}

impl<G, A> FunctionsLister<G, A>
where
    G: CloudFunctionsGateway,
    A: TokenProvider,
{
    /// Creates a lister over the given settings.
    #[must_use]
    pub fn new(
        gateway: G,
        tokens: A,
        reporter: Arc<dyn ErrorReporter>,
        settings: FunctionsSettings,
    ) -> Self {
        Self {
            gateway,
            tokens,
            reporter,
            settings,
            session: FetchSession::new("cloud-functions"),
        }
    }

    /// Current listing state without triggering a fetch.
    #[must_use]
    pub fn state(&self) -> FetchState<Vec<CloudFunction>> {
        self.session.snapshot()
    }

    /// Fetches the function listing and publishes the outcome.
    ///
    /// The API-key method resolves to an empty listing without touching
    /// the network; it is not reported as an error.
    pub async fn refresh(&self) -> FetchState<Vec<CloudFunction>> {
        let cycle = self.session.begin();

        if self.settings.auth_method == GcpAuthMethod::ApiKey {
            let _applied = self.session.complete(cycle, Ok(Vec::new()));
            return self.session.snapshot();
        }

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

    async fn fetch_functions(&self) -> Result<Vec<CloudFunction>, GcpError> {
        let project = self
            .settings
            .project
            .as_deref()
            .filter(|project| !project.is_empty())
            .ok_or(GcpError::MissingProject)?;
        let token = self.tokens.access_token(CLOUD_PLATFORM_SCOPES).await?;
        self.gateway.list_functions(&token, project).await
    }
}
