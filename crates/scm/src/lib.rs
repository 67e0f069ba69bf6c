//! Git provider webhook infrastructure adapter.
//!
//! Implements [`pipelines::ports::GitClientFactory`] and
//! [`pipelines::ports::GitRepositoryClient`] for GitHub (including GitHub
//! Enterprise) and GitLab (including self-managed instances) over their REST
//! APIs.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** Authentication headers, API base URLs, pagination
//! parameters, and payload shapes live here. The [`pipelines`] crate sees only
//! opaque [`pipelines::WebhookId`] values and [`pipelines::ProviderError`].
//!
//! ## Provider selection
//!
//! The driver is picked from the repository host (see
//! [`pipelines::GitProvider::from_host`]) unless one is forced with
//! [`ScmClientFactory::with_driver`], which is needed for self-hosted
//! instances whose host name does not mention the provider.

pub mod github;
pub mod gitlab;
mod http;

use pipelines::ports::{GitClientFactory, GitRepositoryClient};
use pipelines::{AccessToken, GitProvider, ProviderError, RepositoryUrl};
use tracing::debug;

pub use github::GitHubClient;
pub use gitlab::GitLabClient;

const USER_AGENT: &str = concat!("gitops-webhook/", env!("CARGO_PKG_VERSION"));

/// Builds a webhook client for whichever provider hosts a repository.
#[derive(Debug, Clone)]
pub struct ScmClientFactory {
    http: reqwest::Client,
    driver: Option<GitProvider>,
    api_url: Option<String>,
}

impl ScmClientFactory {
    /// Creates a factory with a shared HTTP client.
    pub fn new() -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ProviderError::Http {
                status: None,
                message: e.to_string(),
            })?;
        Ok(Self {
            http,
            driver: None,
            api_url: None,
        })
    }

    /// Forces a provider driver instead of detecting it from the host.
    pub fn with_driver(mut self, driver: GitProvider) -> Self {
        self.driver = Some(driver);
        self
    }

    /// Overrides the REST API base URL (e.g. `https://git.corp/api/v3`).
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = Some(api_url.into());
        self
    }

    fn api_base(&self, provider: GitProvider, repository: &RepositoryUrl) -> String {
        if let Some(url) = &self.api_url {
            return url.clone();
        }
        match provider {
            GitProvider::GitHub => github::api_base(repository.host()),
            GitProvider::GitLab => gitlab::api_base(repository.host()),
        }
    }
}

impl GitClientFactory for ScmClientFactory {
    fn client_for(
        &self,
        repository: &RepositoryUrl,
        token: &AccessToken,
    ) -> Result<Box<dyn GitRepositoryClient>, ProviderError> {
        let provider = self.driver.or_else(|| repository.provider()).ok_or_else(|| {
            ProviderError::UnsupportedProvider {
                host: repository.host().to_string(),
            }
        })?;
        let api_base = self.api_base(provider, repository);
        debug!(%provider, api_base = %api_base, repository = repository.path(), "Selected Git provider");

        let client: Box<dyn GitRepositoryClient> = match provider {
            GitProvider::GitHub => Box::new(GitHubClient::new(
                self.http.clone(),
                &api_base,
                repository.path(),
                token.clone(),
            )),
            GitProvider::GitLab => Box::new(GitLabClient::new(
                self.http.clone(),
                &api_base,
                repository.path(),
                token.clone(),
            )),
        };
        Ok(client)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token() -> AccessToken {
        AccessToken::new("token").unwrap()
    }

    #[test]
    fn unknown_host_is_unsupported() {
        let factory = ScmClientFactory::new().unwrap();
        let repo = RepositoryUrl::parse("https://git.example.com/org/repo.git").unwrap();

        let err = factory.client_for(&repo, &token()).err().unwrap();

        assert!(matches!(
            err,
            ProviderError::UnsupportedProvider { host } if host == "git.example.com"
        ));
    }

    #[test]
    fn forced_driver_serves_unknown_host() {
        let factory = ScmClientFactory::new()
            .unwrap()
            .with_driver(GitProvider::GitLab);
        let repo = RepositoryUrl::parse("https://git.example.com/org/repo.git").unwrap();

        assert!(factory.client_for(&repo, &token()).is_ok());
        assert_eq!(
            factory.api_base(GitProvider::GitLab, &repo),
            "https://git.example.com/api/v4"
        );
    }

    #[test]
    fn api_url_override_wins() {
        let factory = ScmClientFactory::new()
            .unwrap()
            .with_api_url("https://ghe.corp/api/v3");
        let repo = RepositoryUrl::parse("https://github.com/org/repo").unwrap();

        assert_eq!(
            factory.api_base(GitProvider::GitHub, &repo),
            "https://ghe.corp/api/v3"
        );
    }
}
