//! AWS Lambda function listing operation.

use std::io::{self, Write};
use std::sync::Arc;

use greenroom::aws::LambdaGateway;
use greenroom::{
    AwsRestGateway, ErrorReporter, GreenroomConfig, LambdaLister, TracingReporter,
};

use super::CliError;
use super::output::write_lambda_listing;

/// Lists Lambda functions in the configured region.
///
/// # Errors
///
/// Returns [`CliError::Config`] if required configuration is missing and
/// [`CliError::Fetch`] if the listing resolves with a failure.
pub async fn run(config: &GreenroomConfig) -> Result<(), CliError> {
    let mut stdout = io::stdout().lock();
    run_with_gateway(config, AwsRestGateway::new(reqwest::Client::new()), &mut stdout).await
}

/// Lists Lambda functions using a custom gateway.
///
/// This function is exposed for testing with stub gateways.
pub async fn run_with_gateway<G, W>(
    config: &GreenroomConfig,
    gateway: G,
    writer: &mut W,
) -> Result<(), CliError>
where
    G: LambdaGateway,
    W: Write,
{
    let settings = config.lambda_settings()?;
    let region = settings.region.clone().unwrap_or_default();
    let tokens = config.google_token_provider();
    let reporter: Arc<dyn ErrorReporter> = Arc::new(TracingReporter);

    let lister = LambdaLister::new(gateway, tokens, reporter, settings);
    let state = lister.refresh().await;
    if let Some(failure) = state.error {
        return Err(CliError::Fetch {
            message: failure.message,
        });
    }

    let functions = state.value.unwrap_or_default();
    write_lambda_listing(writer, &functions, &region)
}

#[cfg(test)]
#[expect(clippy::expect_used, reason = "Tests panic on failure")]
mod tests {
    use async_trait::async_trait;
    use greenroom::GreenroomConfig;
    use greenroom::auth::IdentityToken;
    use greenroom::aws::{
        AwsError, LambdaFunction, LambdaGateway, TemporaryCredentials,
    };

    use super::{CliError, run_with_gateway};

    struct StubGateway;

    #[async_trait]
    impl LambdaGateway for StubGateway {
        async fn credentials_for_google(
            &self,
            region: &str,
            identity_pool_id: &str,
            _id_token: &IdentityToken,
        ) -> Result<TemporaryCredentials, AwsError> {
            assert_eq!(region, "eu-west-1");
            assert_eq!(identity_pool_id, "eu-west-1:pool");
            Ok(TemporaryCredentials::from_key_pair(
                "AKIA".to_owned(),
                "secret".to_owned(),
            ))
        }

        async fn list_functions(
            &self,
            region: &str,
            _credentials: &TemporaryCredentials,
            max_items: u8,
        ) -> Result<Vec<LambdaFunction>, AwsError> {
            assert_eq!(max_items, 2, "the default cap applies");
            Ok(vec![LambdaFunction {
                function_name: "hello".to_owned(),
                description: String::new(),
                code_size: 1024,
                last_modified: "2026-03-01T00:00:00Z".to_owned(),
                runtime: "nodejs22.x".to_owned(),
                memory: 128,
                region: region.to_owned(),
            }])
        }
    }

    #[tokio::test]
    async fn lambda_listing_writes_function_rows() {
        let config = GreenroomConfig {
            lambdas: true,
            aws_region: Some("eu-west-1".to_owned()),
            aws_identity_pool_id: Some("eu-west-1:pool".to_owned()),
            google_id_token: Some("id-token".to_owned()),
            ..Default::default()
        };

        let mut buffer = Vec::new();
        run_with_gateway(&config, StubGateway, &mut buffer)
            .await
            .expect("listing should succeed");

        let output = String::from_utf8(buffer).expect("output should be valid UTF-8");
        assert!(
            output.contains("Lambda functions in eu-west-1:"),
            "missing header: {output}"
        );
        assert!(
            output.contains("hello [nodejs22.x]"),
            "missing function line: {output}"
        );
    }

    #[tokio::test]
    async fn missing_region_surfaces_as_a_fetch_failure() {
        let config = GreenroomConfig {
            lambdas: true,
            ..Default::default()
        };

        let mut buffer = Vec::new();
        let result = run_with_gateway(&config, StubGateway, &mut buffer).await;

        assert!(
            matches!(result, Err(CliError::Fetch { .. })),
            "expected a fetch failure, got {result:?}"
        );
    }
}
