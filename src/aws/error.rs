//! Error taxonomy for AWS Lambda listings.

use thiserror::Error;

use crate::auth::AuthError;

/// Errors raised while exchanging credentials or listing functions.
#[derive(Debug, Error)]
pub enum AwsError {
    /// No region configured; no network call is attempted.
    #[error("set credentials and a region before listing functions")]
    MissingRegion,

    /// Google auth selected without an identity pool to exchange against.
    #[error("no Cognito identity pool configured for Google sign-in")]
    MissingIdentityPool,

    /// Access-key auth selected without a usable key pair.
    #[error("no AWS access key pair configured")]
    MissingAccessKeys,

    /// Token acquisition from the auth collaborator failed.
    #[error(transparent)]
    Token(#[from] AuthError),

    /// The Cognito identity exchange was rejected.
    #[error("identity exchange failed: {message}")]
    IdentityExchange {
        /// Description of the rejection.
        message: String,
    },

    /// AWS answered with a non-success status.
    #[error("AWS request failed with status {status}: {message}")]
    Api {
        /// HTTP status code returned.
        status: u16,
        /// Response body or reason phrase.
        message: String,
    },

    /// The transport failed before a response arrived.
    #[error("AWS request failed: {message}")]
    Network {
        /// Description of the transport failure.
        message: String,
    },

    /// A response arrived but could not be decoded.
    #[error("could not decode AWS response: {message}")]
    ResponseDecode {
        /// Description of the decoding failure.
        message: String,
    },
}

impl AwsError {
    pub(super) fn network(error: &reqwest::Error) -> Self {
        Self::Network {
            message: error.to_string(),
        }
    }

    pub(super) fn decode(error: &reqwest::Error) -> Self {
        Self::ResponseDecode {
            message: error.to_string(),
        }
    }
}
