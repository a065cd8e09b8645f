//! Greenroom library crate: developer-portal listings and catalog.
//!
//! The library lists resources developers care about — GitHub pull
//! requests, contributors, and merge statistics, AWS Lambda functions,
//! and GCP Cloud Functions — through generation-guarded fetch sessions,
//! and serves a tenant-scoped software catalog over REST backed by
//! `SQLite`.

pub mod auth;
pub mod aws;
pub mod catalog;
pub mod config;
pub mod fetch;
pub mod gcp;
pub mod github;
pub mod persistence;
pub mod telemetry;

pub use auth::{AccessToken, AuthError, IdentityToken, StaticTokenProvider, TokenProvider};
pub use aws::{AwsAuthMethod, AwsError, AwsRestGateway, LambdaFunction, LambdaLister, LambdaSettings};
pub use catalog::{CatalogError, CatalogState, CatalogStore, catalog_router};
pub use config::{ConfigError, GreenroomConfig, OperationMode};
pub use fetch::{ErrorReporter, FetchFailure, FetchSession, FetchState, TracingReporter};
pub use gcp::{CloudFunction, FunctionsLister, FunctionsSettings, GcpAuthMethod, GcpError};
pub use github::{
    ContributorsLister, GithubError, OctocrabPullRequestGateway, PullRequestLister,
    PullRequestStatistics, RepositoryLocator, StatisticsLister,
};
pub use persistence::PersistenceError;
