//! GitLab project webhooks (`/projects/{id}/hooks`).

use async_trait::async_trait;
use pipelines::ports::GitRepositoryClient;
use pipelines::{AccessToken, ProviderError, WebhookId, WebhookSecret};
use reqwest::header::HeaderMap;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::http;

/// Returns the REST API base for a GitLab host.
pub fn api_base(host: &str) -> String {
    format!("https://{host}/api/v4")
}

/// Encodes a `group/project` path as a GitLab project id.
fn project_id(path: &str) -> String {
    path.replace('/', "%2F")
}

#[derive(Debug, Deserialize)]
struct Hook {
    id: u64,
    #[serde(default)]
    url: Option<String>,
}

#[derive(Debug, Serialize)]
struct CreateHook<'a> {
    url: &'a str,
    token: &'a str,
    push_events: bool,
    enable_ssl_verification: bool,
}

fn matching_ids(hooks: Vec<Hook>, listener_url: &str) -> Vec<WebhookId> {
    hooks
        .into_iter()
        .filter(|h| h.url.as_deref() == Some(listener_url))
        .filter_map(|h| WebhookId::new(h.id.to_string()))
        .collect()
}

/// Where the following page of a list response lives.
#[derive(Debug, PartialEq, Eq)]
enum NextPage {
    Url(String),
    Number(String),
}

/// Follows the `Link` header, falling back to `x-next-page` (which is all
/// some self-managed instances send).
fn next_page(headers: &HeaderMap) -> Option<NextPage> {
    http::next_link(headers).map(NextPage::Url).or_else(|| {
        http::header_value(headers, "x-next-page").map(|p| NextPage::Number(p.to_string()))
    })
}

/// Webhook client for one GitLab project.
pub struct GitLabClient {
    http: Client,
    hooks_url: String,
    token: AccessToken,
}

impl GitLabClient {
    /// Creates a client for the project at `repo_path` under `api_base`.
    pub fn new(http: Client, api_base: &str, repo_path: &str, token: AccessToken) -> Self {
        Self {
            http,
            hooks_url: format!(
                "{}/projects/{}/hooks",
                api_base.trim_end_matches('/'),
                project_id(repo_path)
            ),
            token,
        }
    }

    fn request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        self.http
            .request(method, url)
            .header("PRIVATE-TOKEN", self.token.expose())
    }

    fn page_request(&self, page: Option<&str>) -> reqwest::RequestBuilder {
        let request = self
            .request(reqwest::Method::GET, &self.hooks_url)
            .query(&[("per_page", http::PER_PAGE)]);
        match page {
            Some(page) => request.query(&[("page", page)]),
            None => request,
        }
    }

    async fn delete_one(&self, id: WebhookId) -> Result<(), ProviderError> {
        let url = format!("{}/{}", self.hooks_url, id);
        http::send(self.request(reqwest::Method::DELETE, &url)).await?;
        debug!(webhook_id = %id, "Deleted GitLab webhook");
        Ok(())
    }
}

#[async_trait]
impl GitRepositoryClient for GitLabClient {
    async fn list_webhooks(&self, listener_url: &str) -> Result<Vec<WebhookId>, ProviderError> {
        let mut hooks = Vec::new();
        let mut request = self.page_request(None);
        loop {
            let response = http::send(request).await?;
            let next = next_page(response.headers());
            let page: Vec<Hook> = http::json(response).await?;
            hooks.extend(page);
            request = match next {
                Some(NextPage::Url(url)) => self.request(reqwest::Method::GET, &url),
                Some(NextPage::Number(page)) => self.page_request(Some(&page)),
                None => break,
            };
        }
        debug!(count = hooks.len(), "Listed GitLab webhooks");
        Ok(matching_ids(hooks, listener_url))
    }

    async fn create_webhook(
        &self,
        listener_url: &str,
        secret: &WebhookSecret,
    ) -> Result<WebhookId, ProviderError> {
        let body = CreateHook {
            url: listener_url,
            token: secret.expose(),
            push_events: true,
            enable_ssl_verification: true,
        };
        let request = self
            .request(reqwest::Method::POST, &self.hooks_url)
            .json(&body);
        let hook: Hook = http::json(http::send(request).await?).await?;
        WebhookId::new(hook.id.to_string()).ok_or_else(|| ProviderError::Decode {
            message: "created webhook has no id".to_string(),
        })
    }

    async fn delete_webhooks(&self, ids: &[WebhookId]) -> Result<Vec<WebhookId>, ProviderError> {
        http::delete_in_order(ids, |id| self.delete_one(id)).await
    }
}

#[cfg(test)]
mod tests {
    use reqwest::header::{HeaderValue, LINK};
    use serde_json::json;

    use super::*;

    #[test]
    fn next_page_prefers_link_header() {
        let mut headers = HeaderMap::new();
        headers.insert("x-next-page", HeaderValue::from_static("2"));
        assert_eq!(next_page(&headers), Some(NextPage::Number("2".to_string())));

        headers.insert(
            LINK,
            HeaderValue::from_static("<https://gitlab.com/api/v4/projects/1/hooks?page=2>; rel=\"next\""),
        );
        assert_eq!(
            next_page(&headers),
            Some(NextPage::Url("https://gitlab.com/api/v4/projects/1/hooks?page=2".to_string()))
        );
    }

    #[test]
    fn last_page_has_no_next_page() {
        let mut headers = HeaderMap::new();
        headers.insert("x-next-page", HeaderValue::from_static(""));
        assert_eq!(next_page(&headers), None);
    }

    #[test]
    fn nested_group_path_is_url_encoded() {
        let client = GitLabClient::new(
            Client::new(),
            &api_base("gitlab.com"),
            "group/sub/project",
            AccessToken::new("t").unwrap(),
        );
        assert_eq!(
            client.hooks_url,
            "https://gitlab.com/api/v4/projects/group%2Fsub%2Fproject/hooks"
        );
    }

    #[test]
    fn list_keeps_only_hooks_for_listener() {
        let hooks: Vec<Hook> = serde_json::from_value(json!([
            { "id": 10, "url": "https://other.example.com" },
            { "id": 11, "url": "http://listener.example.com" },
            { "id": 12 }
        ]))
        .unwrap();

        let ids = matching_ids(hooks, "http://listener.example.com");

        assert_eq!(ids, vec![WebhookId::new("11").unwrap()]);
    }
}
