//! Error taxonomy for Cloud Functions listings.

use thiserror::Error;

use crate::auth::AuthError;

/// Errors raised while listing Cloud Functions.
#[derive(Debug, Error)]
pub enum GcpError {
    /// No project configured; no network call is attempted.
    #[error("set a GCP project before listing functions")]
    MissingProject,

    /// Token acquisition from the auth collaborator failed.
    #[error(transparent)]
    Token(#[from] AuthError),

    /// The API answered with a non-success status.
    #[error("Cloud Functions request failed with status {status}: {message}")]
    Api {
        /// HTTP status code returned.
        status: u16,
        /// Response body or reason phrase.
        message: String,
    },

    /// The transport failed before a response arrived.
    #[error("Cloud Functions request failed: {message}")]
    Network {
        /// Description of the transport failure.
        message: String,
    },

    /// A response arrived but could not be decoded.
    #[error("could not decode Cloud Functions response: {message}")]
    ResponseDecode {
        /// Description of the decoding failure.
        message: String,
    },
}
