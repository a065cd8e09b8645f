//! Application configuration loaded from CLI, environment, and files.
//!
//! A single struct merges values from command-line arguments, environment
//! variables, and configuration files using ortho-config's layered
//! approach.
//!
//! # Precedence
//!
//! Configuration values are loaded with the following precedence (lowest to
//! highest):
//!
//! 1. **Defaults** – Built-in application defaults
//! 2. **Configuration file** – `.greenroom.toml` in current directory, home
//!    directory, or XDG config directory
//! 3. **Environment variables** – `GREENROOM_OWNER`, `GREENROOM_TOKEN`, or
//!    legacy `GITHUB_TOKEN`
//! 4. **Command-line arguments** – `--owner`/`-o`, `--token`/`-t`, etc.
//!
//! # Configuration File
//!
//! Place `.greenroom.toml` in the current directory, home directory, or
//! XDG config directory with:
//!
//! ```toml
//! owner = "octocat"
//! repo = "hello-world"
//! token = "ghp_example"
//! aws_region = "eu-west-1"
//! database_url = "greenroom.sqlite"
//! ```

use std::env;

use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::auth::StaticTokenProvider;
use crate::aws::{AwsAuthMethod, DEFAULT_MAX_ITEMS, LambdaSettings};
use crate::gcp::{FunctionsSettings, GcpAuthMethod};
use crate::persistence::PersistenceError;

/// Address the catalog server binds when none is configured.
pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:7007";

/// Configuration-level failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No GitHub token from any source.
    #[error("a GitHub token is required (use --token, GREENROOM_TOKEN, or GITHUB_TOKEN)")]
    MissingToken,
    /// A provided value is unusable.
    #[error("configuration error: {message}")]
    Invalid {
        /// What was wrong with the value.
        message: String,
    },
}

/// Operation mode determined by configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationMode {
    /// Run database migrations and exit.
    MigrateDatabase,
    /// Serve the catalog REST API.
    Serve,
    /// List AWS Lambda functions.
    LambdaListing,
    /// List GCP Cloud Functions.
    FunctionsListing,
    /// Summarise a repository's pull requests.
    Statistics,
    /// List a repository's contributors.
    Contributors,
    /// List a repository's open pull requests.
    PullRequestListing,
    /// Nothing actionable was configured.
    Unspecified,
}

/// Application configuration supporting CLI, environment, and file sources.
///
/// # Environment Variables
///
/// - `GREENROOM_TOKEN`, `GITHUB_TOKEN` (legacy), or `--token`: GitHub token
/// - `GREENROOM_OWNER` or `--owner`: Repository owner
/// - `GREENROOM_REPO` or `--repo`: Repository name
/// - `GREENROOM_AWS_REGION` or `--aws-region`: AWS region to list
/// - `GREENROOM_GCP_PROJECT` or `--gcp-project`: GCP project to list
/// - `GREENROOM_DATABASE_URL` or `--database-url`: Local sqlite database path
#[derive(Debug, Clone, Default, Deserialize, Serialize, OrthoConfig)]
#[serde(default)]
#[ortho_config(
    prefix = "GREENROOM",
    discovery(
        dotfile_name = ".greenroom.toml",
        config_file_name = "greenroom.toml",
        app_name = "greenroom"
    )
)]
pub struct GreenroomConfig {
    /// Personal access token for GitHub API authentication.
    #[ortho_config(cli_short = 't')]
    pub token: Option<String>,

    /// Repository owner (e.g., "octocat").
    #[ortho_config(cli_short = 'o')]
    pub owner: Option<String>,

    /// Repository name (e.g., "hello-world").
    #[ortho_config(cli_short = 'r')]
    pub repo: Option<String>,

    /// Zero-indexed page of pull requests to show.
    pub page: Option<u32>,

    /// Pull requests per page.
    pub page_size: Option<u8>,

    /// Summarises the repository's pull requests instead of listing them.
    pub stats: bool,

    /// Lists the repository's contributors instead of its pull requests.
    pub contributors: bool,

    /// How many contributors to show.
    pub contributor_count: Option<u8>,

    /// Lists AWS Lambda functions in `aws_region`.
    pub lambdas: bool,

    /// AWS region to list Lambda functions in.
    pub aws_region: Option<String>,

    /// Cognito identity pool used to exchange a Google identity token.
    pub aws_identity_pool_id: Option<String>,

    /// Long-lived AWS access key identifier.
    pub aws_access_key_id: Option<String>,

    /// Long-lived AWS access key secret.
    pub aws_access_key_secret: Option<String>,

    /// AWS credential path: `google` (default) or `aws`.
    pub aws_auth_method: Option<String>,

    /// Cap on listed Lambda functions.
    pub lambda_max_items: Option<u8>,

    /// Lists GCP Cloud Functions in `gcp_project`.
    pub functions: bool,

    /// GCP project to list Cloud Functions in.
    pub gcp_project: Option<String>,

    /// GCP credential path: `google` (default) or `api_key`.
    pub gcp_auth_method: Option<String>,

    /// Google identity token for the Cognito exchange.
    pub google_id_token: Option<String>,

    /// Google OAuth access token for GCP API calls.
    pub google_access_token: Option<String>,

    /// Local sqlite database URL/path used by the catalog.
    pub database_url: Option<String>,

    /// Address the catalog server binds, e.g. `127.0.0.1:7007`.
    pub listen_addr: Option<String>,

    /// Serves the catalog REST API.
    pub serve: bool,

    /// Runs database migrations and exits.
    pub migrate_db: bool,
}

impl GreenroomConfig {
    /// Resolves the GitHub token from configuration or the legacy
    /// `GITHUB_TOKEN` environment variable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingToken`] when no token source provides
    /// a value.
    pub fn resolve_token(&self) -> Result<String, ConfigError> {
        self.token
            .clone()
            .or_else(|| env::var("GITHUB_TOKEN").ok())
            .ok_or(ConfigError::MissingToken)
    }

    /// Returns owner and repo if both are configured.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when owner or repo is missing.
    pub fn require_repository_info(&self) -> Result<(&str, &str), ConfigError> {
        match (&self.owner, &self.repo) {
            (Some(owner), Some(repo)) => Ok((owner.as_str(), repo.as_str())),
            (None, _) => Err(ConfigError::Invalid {
                message: "repository owner is required (use --owner or -o)".to_owned(),
            }),
            (_, None) => Err(ConfigError::Invalid {
                message: "repository name is required (use --repo or -r)".to_owned(),
            }),
        }
    }

    /// Returns the configured database URL.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError::MissingDatabaseUrl`] when none is set.
    pub fn require_database_url(&self) -> Result<&str, PersistenceError> {
        self.database_url
            .as_deref()
            .ok_or(PersistenceError::MissingDatabaseUrl)
    }

    /// Address the catalog server should bind.
    #[must_use]
    pub fn listen_addr(&self) -> &str {
        self.listen_addr.as_deref().unwrap_or(DEFAULT_LISTEN_ADDR)
    }

    /// Token provider for GitHub API calls.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingToken`] when no token source provides
    /// a value.
    pub fn github_token_provider(&self) -> Result<StaticTokenProvider, ConfigError> {
        let token = self.resolve_token()?;
        Ok(StaticTokenProvider::new(None, Some(token)))
    }

    /// Token provider for Google-authenticated cloud listings.
    #[must_use]
    pub fn google_token_provider(&self) -> StaticTokenProvider {
        StaticTokenProvider::new(
            self.google_id_token.clone(),
            self.google_access_token.clone(),
        )
    }

    /// Assembles the Lambda listing settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when `aws_auth_method` names an
    /// unknown credential path.
    pub fn lambda_settings(&self) -> Result<LambdaSettings, ConfigError> {
        let auth_method = match self.aws_auth_method.as_deref() {
            None | Some("google") => AwsAuthMethod::Google,
            Some("aws" | "access_keys") => AwsAuthMethod::AccessKeys,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    message: format!("unknown AWS auth method {other} (use google or aws)"),
                });
            }
        };
        Ok(LambdaSettings {
            region: self.aws_region.clone(),
            identity_pool_id: self.aws_identity_pool_id.clone(),
            access_key_id: self.aws_access_key_id.clone(),
            access_key_secret: self.aws_access_key_secret.clone(),
            auth_method,
            max_items: self.lambda_max_items.unwrap_or(DEFAULT_MAX_ITEMS),
        })
    }

    /// Assembles the Cloud Functions listing settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when `gcp_auth_method` names an
    /// unknown credential path.
    pub fn functions_settings(&self) -> Result<FunctionsSettings, ConfigError> {
        let auth_method = match self.gcp_auth_method.as_deref() {
            None | Some("google") => GcpAuthMethod::Google,
            Some("api_key" | "API_KEY") => GcpAuthMethod::ApiKey,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    message: format!("unknown GCP auth method {other} (use google or api_key)"),
                });
            }
        };
        Ok(FunctionsSettings {
            project: self.gcp_project.clone(),
            auth_method,
        })
    }

    /// Determines the operation mode based on provided configuration.
    ///
    /// Maintenance modes win over listings, and cloud listings over
    /// repository listings, so one configuration file can carry settings
    /// for several modes.
    #[must_use]
    pub const fn operation_mode(&self) -> OperationMode {
        if self.migrate_db {
            OperationMode::MigrateDatabase
        } else if self.serve {
            OperationMode::Serve
        } else if self.lambdas {
            OperationMode::LambdaListing
        } else if self.functions {
            OperationMode::FunctionsListing
        } else if self.stats {
            OperationMode::Statistics
        } else if self.contributors {
            OperationMode::Contributors
        } else if self.owner.is_some() && self.repo.is_some() {
            OperationMode::PullRequestListing
        } else {
            OperationMode::Unspecified
        }
    }
}

#[cfg(test)]
#[expect(clippy::expect_used, reason = "Tests panic on failure")]
mod tests {
    use ortho_config::MergeComposer;
    use rstest::rstest;
    use serde_json::json;

    use crate::aws::AwsAuthMethod;
    use crate::gcp::GcpAuthMethod;

    use super::{GreenroomConfig, OperationMode};

    #[rstest]
    fn cli_overrides_environment_and_file() {
        let mut composer = MergeComposer::new();
        composer.push_file(json!({"owner": "file-owner", "token": "file-token"}), None);
        composer.push_environment(json!({"owner": "env-owner"}));
        composer.push_cli(json!({"owner": "cli-owner"}));

        let config =
            GreenroomConfig::merge_from_layers(composer.layers()).expect("merge should succeed");

        assert_eq!(config.owner.as_deref(), Some("cli-owner"), "CLI wins");
        assert_eq!(
            config.token.as_deref(),
            Some("file-token"),
            "file wins when nothing overrides"
        );
    }

    #[rstest]
    fn resolve_token_prefers_configuration_over_legacy_environment() {
        let _guard = env_lock::lock_env([("GITHUB_TOKEN", Some("legacy-token"))]);
        let config = GreenroomConfig {
            token: Some("configured-token".to_owned()),
            ..Default::default()
        };

        let token = config.resolve_token().expect("token should resolve");
        assert_eq!(token, "configured-token");
    }

    #[rstest]
    fn resolve_token_falls_back_to_github_token() {
        let _guard = env_lock::lock_env([("GITHUB_TOKEN", Some("legacy-token"))]);
        let config = GreenroomConfig::default();

        let token = config.resolve_token().expect("token should resolve");
        assert_eq!(token, "legacy-token");
    }

    #[rstest]
    fn resolve_token_errors_when_no_source_provides_one() {
        let _guard = env_lock::lock_env([("GITHUB_TOKEN", None::<&str>)]);
        let config = GreenroomConfig::default();

        assert!(config.resolve_token().is_err());
    }

    #[rstest]
    #[case::migrate(GreenroomConfig { migrate_db: true, serve: true, ..Default::default() }, OperationMode::MigrateDatabase)]
    #[case::serve(GreenroomConfig { serve: true, lambdas: true, ..Default::default() }, OperationMode::Serve)]
    #[case::lambdas(GreenroomConfig { lambdas: true, ..Default::default() }, OperationMode::LambdaListing)]
    #[case::functions(GreenroomConfig { functions: true, ..Default::default() }, OperationMode::FunctionsListing)]
    #[case::stats(GreenroomConfig { stats: true, ..Default::default() }, OperationMode::Statistics)]
    #[case::contributors(GreenroomConfig { contributors: true, ..Default::default() }, OperationMode::Contributors)]
    #[case::listing(
        GreenroomConfig { owner: Some("octocat".to_owned()), repo: Some("hello-world".to_owned()), ..Default::default() },
        OperationMode::PullRequestListing
    )]
    #[case::unspecified(GreenroomConfig::default(), OperationMode::Unspecified)]
    fn operation_mode_reflects_configuration(
        #[case] config: GreenroomConfig,
        #[case] expected: OperationMode,
    ) {
        assert_eq!(config.operation_mode(), expected);
    }

    #[rstest]
    #[case::default(None, AwsAuthMethod::Google)]
    #[case::google(Some("google"), AwsAuthMethod::Google)]
    #[case::aws(Some("aws"), AwsAuthMethod::AccessKeys)]
    #[case::access_keys(Some("access_keys"), AwsAuthMethod::AccessKeys)]
    fn aws_auth_method_parses(#[case] raw: Option<&str>, #[case] expected: AwsAuthMethod) {
        let config = GreenroomConfig {
            aws_auth_method: raw.map(str::to_owned),
            ..Default::default()
        };

        let settings = config.lambda_settings().expect("settings should build");
        assert_eq!(settings.auth_method, expected);
    }

    #[rstest]
    fn unknown_aws_auth_method_is_rejected() {
        let config = GreenroomConfig {
            aws_auth_method: Some("saml".to_owned()),
            ..Default::default()
        };

        assert!(config.lambda_settings().is_err());
    }

    #[rstest]
    #[case::default(None, GcpAuthMethod::Google)]
    #[case::upper(Some("API_KEY"), GcpAuthMethod::ApiKey)]
    #[case::lower(Some("api_key"), GcpAuthMethod::ApiKey)]
    fn gcp_auth_method_parses(#[case] raw: Option<&str>, #[case] expected: GcpAuthMethod) {
        let config = GreenroomConfig {
            gcp_auth_method: raw.map(str::to_owned),
            ..Default::default()
        };

        let settings = config.functions_settings().expect("settings should build");
        assert_eq!(settings.auth_method, expected);
    }

    #[rstest]
    fn lambda_cap_of_zero_defers_to_the_lister_default() {
        let config = GreenroomConfig {
            lambda_max_items: Some(0),
            ..Default::default()
        };

        let settings = config.lambda_settings().expect("settings should build");
        assert_eq!(settings.max_items, 0, "the lister substitutes its default");
    }

    #[rstest]
    fn listen_addr_defaults_when_unset() {
        let config = GreenroomConfig::default();
        assert_eq!(config.listen_addr(), "127.0.0.1:7007");
    }

    #[rstest]
    fn require_repository_info_names_the_missing_field() {
        let config = GreenroomConfig {
            repo: Some("hello-world".to_owned()),
            ..Default::default()
        };

        let error = config
            .require_repository_info()
            .expect_err("owner is missing");
        assert!(error.to_string().contains("owner"));
    }
}
