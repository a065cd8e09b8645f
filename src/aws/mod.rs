//! AWS Lambda function listings.
//!
//! This module exchanges a Google identity token for temporary Cognito
//! credentials (or uses a configured key pair), then lists Lambda
//! functions over the REST endpoint and normalises them for display.

pub mod credentials;
pub mod error;
pub mod lambda;
pub mod lister;

pub use credentials::{CognitoIdentityBroker, GOOGLE_LOGIN_PROVIDER, TemporaryCredentials};
pub use error::AwsError;
pub use lambda::{DEFAULT_MAX_ITEMS, LambdaClient, LambdaFunction};
pub use lister::{AwsAuthMethod, AwsRestGateway, LambdaGateway, LambdaLister, LambdaSettings};

#[cfg(test)]
pub use lister::MockLambdaGateway;
