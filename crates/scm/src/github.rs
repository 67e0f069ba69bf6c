//! GitHub repository webhooks (`/repos/{owner}/{repo}/hooks`).

use async_trait::async_trait;
use pipelines::ports::GitRepositoryClient;
use pipelines::{AccessToken, ProviderError, WebhookId, WebhookSecret};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::http;

const API_VERSION: &str = "2022-11-28";

/// Returns the REST API base for a GitHub host.
///
/// `github.com` is served from `api.github.com`; GitHub Enterprise serves the
/// API under `/api/v3` on the same host.
pub fn api_base(host: &str) -> String {
    if host.eq_ignore_ascii_case("github.com") || host.eq_ignore_ascii_case("www.github.com") {
        "https://api.github.com".to_string()
    } else {
        format!("https://{host}/api/v3")
    }
}

#[derive(Debug, Deserialize)]
struct Hook {
    id: u64,
    #[serde(default)]
    config: HookConfig,
}

#[derive(Debug, Default, Deserialize)]
struct HookConfig {
    #[serde(default)]
    url: Option<String>,
}

#[derive(Debug, Serialize)]
struct CreateHook<'a> {
    name: &'static str,
    active: bool,
    events: [&'static str; 1],
    config: CreateHookConfig<'a>,
}

#[derive(Debug, Serialize)]
struct CreateHookConfig<'a> {
    url: &'a str,
    content_type: &'static str,
    secret: &'a str,
    insecure_ssl: &'static str,
}

impl<'a> CreateHook<'a> {
    fn push(listener_url: &'a str, secret: &'a WebhookSecret) -> Self {
        Self {
            name: "web",
            active: true,
            events: ["push"],
            config: CreateHookConfig {
                url: listener_url,
                content_type: "json",
                secret: secret.expose(),
                insecure_ssl: "0",
            },
        }
    }
}

fn matching_ids(hooks: Vec<Hook>, listener_url: &str) -> Vec<WebhookId> {
    hooks
        .into_iter()
        .filter(|h| h.config.url.as_deref() == Some(listener_url))
        .filter_map(|h| WebhookId::new(h.id.to_string()))
        .collect()
}

/// Webhook client for one GitHub repository.
pub struct GitHubClient {
    http: Client,
    hooks_url: String,
    token: AccessToken,
}

impl GitHubClient {
    /// Creates a client for `owner/repo` under `api_base`.
    pub fn new(http: Client, api_base: &str, repo_path: &str, token: AccessToken) -> Self {
        Self {
            http,
            hooks_url: format!("{}/repos/{}/hooks", api_base.trim_end_matches('/'), repo_path),
            token,
        }
    }

    fn request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        self.http
            .request(method, url)
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", API_VERSION)
            .bearer_auth(self.token.expose())
    }

    async fn delete_one(&self, id: WebhookId) -> Result<(), ProviderError> {
        let url = format!("{}/{}", self.hooks_url, id);
        http::send(self.request(reqwest::Method::DELETE, &url)).await?;
        debug!(webhook_id = %id, "Deleted GitHub webhook");
        Ok(())
    }
}

#[async_trait]
impl GitRepositoryClient for GitHubClient {
    async fn list_webhooks(&self, listener_url: &str) -> Result<Vec<WebhookId>, ProviderError> {
        let mut hooks = Vec::new();
        let mut request = self
            .request(reqwest::Method::GET, &self.hooks_url)
            .query(&[("per_page", http::PER_PAGE)]);
        loop {
            let response = http::send(request).await?;
            let next = http::next_link(response.headers());
            let page: Vec<Hook> = http::json(response).await?;
            hooks.extend(page);
            match next {
                Some(url) => request = self.request(reqwest::Method::GET, &url),
                None => break,
            }
        }
        debug!(count = hooks.len(), "Listed GitHub webhooks");
        Ok(matching_ids(hooks, listener_url))
    }

    async fn create_webhook(
        &self,
        listener_url: &str,
        secret: &WebhookSecret,
    ) -> Result<WebhookId, ProviderError> {
        let request = self
            .request(reqwest::Method::POST, &self.hooks_url)
            .json(&CreateHook::push(listener_url, secret));
        let hook: Hook = http::json(http::send(request).await?).await?;
        WebhookId::new(hook.id.to_string()).ok_or_else(|| ProviderError::Decode {
            message: "created webhook has no id".to_string(),
        })
    }

    async fn delete_webhooks(&self, ids: &[WebhookId]) -> Result<Vec<WebhookId>, ProviderError> {
        http::delete_in_order(ids, |id| self.delete_one(id)).await
    }
}
