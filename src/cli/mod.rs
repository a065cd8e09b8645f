//! CLI operation mode handlers.
//!
//! This module contains the implementations for different operation modes:
//! - [`pull_requests`]: List a repository's open pull requests
//! - [`statistics`]: Summarise a repository's pull requests
//! - [`contributors`]: List a repository's contributors
//! - [`lambdas`]: List AWS Lambda functions in a region
//! - [`functions`]: List GCP Cloud Functions in a project
//! - [`migrations`]: Database schema migrations
//! - [`serve`]: Serve the catalog REST API
//!
//! Output formatting utilities are in [`output`].

use thiserror::Error;

use greenroom::{ConfigError, GithubError, PersistenceError};

pub mod contributors;
pub mod functions;
pub mod lambdas;
pub mod migrations;
pub mod output;
pub mod pull_requests;
pub mod serve;
pub mod statistics;

/// Failures surfaced by the CLI handlers.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration was missing or unusable.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// A GitHub precondition failed before fetching.
    #[error(transparent)]
    Github(#[from] GithubError),
    /// The local database was missing, unreachable, or inconsistent.
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
    /// A listing fetch resolved with a failure.
    #[error("fetch failed: {message}")]
    Fetch {
        /// Display form of the underlying failure.
        message: String,
    },
    /// Writing output or binding the server failed.
    #[error("I/O error: {message}")]
    Io {
        /// Display form of the underlying failure.
        message: String,
    },
}
