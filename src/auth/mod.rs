//! Token acquisition collaborator.
//!
//! The listing operations never talk to an identity provider themselves;
//! they ask a [`TokenProvider`] for the token kind their transport needs.
//! In the CLI the provider serves statically configured values, while a
//! host application can plug in a real OAuth flow.

use async_trait::async_trait;
use thiserror::Error;

/// Errors surfaced while acquiring tokens.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    /// No identity-provider token is available.
    #[error("identity token is not configured")]
    MissingIdentityToken,

    /// No OAuth access token is available.
    #[error("access token is not configured")]
    MissingAccessToken,

    /// The underlying provider rejected the request.
    #[error("token provider failed: {message}")]
    Provider {
        /// Detail from the provider.
        message: String,
    },
}

/// An identity-provider (OpenID) token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityToken(String);

impl IdentityToken {
    /// Wraps a raw token value.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrow the token value.
    #[must_use]
    pub fn value(&self) -> &str {
        self.0.as_str()
    }
}

/// An OAuth access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    /// Wraps a raw token value.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrow the token value.
    #[must_use]
    pub fn value(&self) -> &str {
        self.0.as_str()
    }
}

/// Collaborator that supplies tokens on demand.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Returns an identity-provider token.
    async fn id_token(&self) -> Result<IdentityToken, AuthError>;

    /// Returns an OAuth access token covering the given scopes.
    async fn access_token(&self, scopes: &[&str]) -> Result<AccessToken, AuthError>;
}

/// Provider backed by statically configured token values.
///
/// Scopes are accepted but not differentiated; the configured access token
/// is expected to cover whatever scopes the caller requests.
#[derive(Debug, Clone, Default)]
pub struct StaticTokenProvider {
    id_token: Option<String>,
    access_token: Option<String>,
}

impl StaticTokenProvider {
    /// Creates a provider from optional configured values.
    #[must_use]
    pub const fn new(id_token: Option<String>, access_token: Option<String>) -> Self {
        Self {
            id_token,
            access_token,
        }
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn id_token(&self) -> Result<IdentityToken, AuthError> {
        self.id_token
            .as_deref()
            .map(IdentityToken::new)
            .ok_or(AuthError::MissingIdentityToken)
    }

    async fn access_token(&self, _scopes: &[&str]) -> Result<AccessToken, AuthError> {
        self.access_token
            .as_deref()
            .map(AccessToken::new)
            .ok_or(AuthError::MissingAccessToken)
    }
}

#[cfg(test)]
#[expect(clippy::expect_used, reason = "Tests panic on failure")]
mod tests {
    use super::{AuthError, StaticTokenProvider, TokenProvider};

    #[tokio::test]
    async fn static_provider_serves_configured_values() {
        let provider =
            StaticTokenProvider::new(Some("id-token".to_owned()), Some("oauth-token".to_owned()));

        let id_token = provider.id_token().await.expect("id token should resolve");
        assert_eq!(id_token.value(), "id-token");

        let access = provider
            .access_token(&["repo"])
            .await
            .expect("access token should resolve");
        assert_eq!(access.value(), "oauth-token");
    }

    #[tokio::test]
    async fn static_provider_rejects_missing_values() {
        let provider = StaticTokenProvider::default();

        assert_eq!(
            provider.id_token().await,
            Err(AuthError::MissingIdentityToken)
        );
        assert_eq!(
            provider.access_token(&["repo"]).await,
            Err(AuthError::MissingAccessToken)
        );
    }
}
