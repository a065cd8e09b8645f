//! Repository identity wrappers and API base derivation.

use url::Url;

use super::error::GithubError;

/// Repository owner wrapper to avoid stringly typed parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryOwner(String);

impl RepositoryOwner {
    pub(crate) fn new(value: &str) -> Result<Self, GithubError> {
        if value.is_empty() {
            return Err(GithubError::MissingPathSegments);
        }
        Ok(Self(value.to_owned()))
    }

    /// Borrow the owner value.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Repository name wrapper to prevent parameter mix-ups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryName(String);

impl RepositoryName {
    pub(crate) fn new(value: &str) -> Result<Self, GithubError> {
        if value.is_empty() {
            return Err(GithubError::MissingPathSegments);
        }
        Ok(Self(value.to_owned()))
    }

    /// Borrow the repository name.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Derives the GitHub API base URL from a host string.
///
/// `github.com` maps to the public API host; any other host is treated as a
/// GitHub Enterprise instance with the API under `/api/v3`.
fn derive_api_base_from_host(
    scheme: &str,
    host: &str,
    port: Option<u16>,
) -> Result<Url, GithubError> {
    if host.eq_ignore_ascii_case("github.com") {
        Url::parse("https://api.github.com")
            .map_err(|error| GithubError::InvalidUrl(error.to_string()))
    } else {
        let authority = if host.contains(':') {
            format!("[{host}]")
        } else {
            host.to_owned()
        };
        let mut api_url = Url::parse(&format!("{scheme}://{authority}"))
            .map_err(|error| GithubError::InvalidUrl(error.to_string()))?;

        api_url
            .set_port(port)
            .map_err(|()| GithubError::InvalidUrl("invalid port".to_owned()))?;
        api_url.set_path("api/v3");
        Ok(api_url)
    }
}

/// Parsed repository identity with derived API base.
///
/// # Example
///
/// ```
/// use greenroom::github::RepositoryLocator;
///
/// let locator = RepositoryLocator::from_owner_repo("theorg", "the-service")
///     .expect("owner/repo should be valid");
/// assert_eq!(locator.api_base().as_str(), "https://api.github.com/");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryLocator {
    api_base: Url,
    owner: RepositoryOwner,
    repository: RepositoryName,
}

impl RepositoryLocator {
    /// Builds a locator for a repository on github.com.
    ///
    /// # Errors
    ///
    /// Returns [`GithubError::MissingPathSegments`] when either value is
    /// empty.
    pub fn from_owner_repo(owner: &str, repository: &str) -> Result<Self, GithubError> {
        let api_base = Url::parse("https://api.github.com")
            .map_err(|error| GithubError::InvalidUrl(error.to_string()))?;
        Ok(Self {
            api_base,
            owner: RepositoryOwner::new(owner)?,
            repository: RepositoryName::new(repository)?,
        })
    }

    /// Parses a repository URL in the form `https://<host>/<owner>/<repo>`.
    ///
    /// # Errors
    ///
    /// Returns [`GithubError::InvalidUrl`] when parsing fails and
    /// [`GithubError::MissingPathSegments`] when the path does not contain
    /// owner and repository segments.
    pub fn parse(input: &str) -> Result<Self, GithubError> {
        let parsed =
            Url::parse(input).map_err(|error| GithubError::InvalidUrl(error.to_string()))?;

        let mut segments = parsed
            .path_segments()
            .ok_or(GithubError::MissingPathSegments)?;

        let owner_segment = segments.next().ok_or(GithubError::MissingPathSegments)?;
        let repository_segment = segments.next().ok_or(GithubError::MissingPathSegments)?;

        let host = parsed
            .host_str()
            .ok_or_else(|| GithubError::InvalidUrl("URL must include a host".to_owned()))?;
        let api_base = derive_api_base_from_host(parsed.scheme(), host, parsed.port())?;

        Ok(Self {
            api_base,
            owner: RepositoryOwner::new(owner_segment)?,
            repository: RepositoryName::new(repository_segment)?,
        })
    }

    /// API base URL derived from the repository host.
    #[must_use]
    pub const fn api_base(&self) -> &Url {
        &self.api_base
    }

    /// Repository owner.
    #[must_use]
    pub const fn owner(&self) -> &RepositoryOwner {
        &self.owner
    }

    /// Repository name.
    #[must_use]
    pub const fn repository(&self) -> &RepositoryName {
        &self.repository
    }

    /// Project slug in `owner/repo` form, for display.
    #[must_use]
    pub fn project_slug(&self) -> String {
        format!("{}/{}", self.owner.as_str(), self.repository.as_str())
    }

    pub(crate) fn pulls_path(&self) -> String {
        format!(
            "/repos/{}/{}/pulls",
            self.owner.as_str(),
            self.repository.as_str()
        )
    }

    pub(crate) fn contributors_path(&self) -> String {
        format!(
            "/repos/{}/{}/contributors",
            self.owner.as_str(),
            self.repository.as_str()
        )
    }
}

#[cfg(test)]
#[expect(clippy::expect_used, reason = "Tests panic on failure")]
mod tests {
    use rstest::rstest;

    use super::{GithubError, RepositoryLocator};

    #[test]
    fn from_owner_repo_targets_public_api() {
        let locator = RepositoryLocator::from_owner_repo("octo", "repo")
            .expect("locator should build from owner/repo");
        assert_eq!(locator.api_base().as_str(), "https://api.github.com/");
        assert_eq!(locator.owner().as_str(), "octo");
        assert_eq!(locator.repository().as_str(), "repo");
        assert_eq!(locator.project_slug(), "octo/repo");
    }

    #[test]
    fn parse_derives_enterprise_api_base() {
        let locator = RepositoryLocator::parse("https://ghe.example.com/octo/repo")
            .expect("enterprise URL should parse");
        assert_eq!(locator.api_base().as_str(), "https://ghe.example.com/api/v3");
    }

    #[rstest]
    #[case::empty_owner("", "repo")]
    #[case::empty_repo("octo", "")]
    fn empty_segments_are_rejected(#[case] owner: &str, #[case] repo: &str) {
        let result = RepositoryLocator::from_owner_repo(owner, repo);
        assert_eq!(result, Err(GithubError::MissingPathSegments));
    }

    #[test]
    fn paths_include_owner_and_repository() {
        let locator = RepositoryLocator::from_owner_repo("octo", "repo")
            .expect("locator should build from owner/repo");
        assert_eq!(locator.pulls_path(), "/repos/octo/repo/pulls");
        assert_eq!(
            locator.contributors_path(),
            "/repos/octo/repo/contributors"
        );
    }
}
