//! Request helpers shared by the provider drivers.

use std::future::Future;

use pipelines::{ProviderError, WebhookId};
use reqwest::header::{HeaderMap, LINK};
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;

/// Sends `request` and turns transport failures and non-2xx statuses into
/// [`ProviderError::Http`].
pub(crate) async fn send(request: RequestBuilder) -> Result<Response, ProviderError> {
    let response = request.send().await.map_err(|e| ProviderError::Http {
        status: e.status().map(|s| s.as_u16()),
        message: e.to_string(),
    })?;

    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response
        .text()
        .await
        .unwrap_or_else(|_| "unable to read response body".to_string());
    Err(ProviderError::Http {
        status: Some(status.as_u16()),
        message,
    })
}

/// Decodes a JSON response body.
pub(crate) async fn json<T: DeserializeOwned>(response: Response) -> Result<T, ProviderError> {
    response.json().await.map_err(|e| ProviderError::Decode {
        message: e.to_string(),
    })
}

/// Page size requested from list endpoints (the maximum both providers allow).
pub(crate) const PER_PAGE: &str = "100";

/// Returns the `rel="next"` target of an RFC 8288 `Link` header, if any.
///
/// Both GitHub and GitLab advertise the following page this way.
pub(crate) fn next_link(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(LINK)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .find_map(|entry| {
            let mut parts = entry.split(';');
            let target = parts.next()?.trim().strip_prefix('<')?.strip_suffix('>')?;
            parts
                .any(|p| matches!(p.trim(), "rel=\"next\"" | "rel=next"))
                .then(|| target.to_string())
        })
}

/// Returns a non-empty header value as a string.
pub(crate) fn header_value<'h>(headers: &'h HeaderMap, name: &str) -> Option<&'h str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// Deletes `ids` one at a time, stopping at the first failure.
///
/// On failure the ids already deleted are carried in
/// [`ProviderError::PartialDelete`].
pub(crate) async fn delete_in_order<F, Fut>(
    ids: &[WebhookId],
    mut delete_one: F,
) -> Result<Vec<WebhookId>, ProviderError>
where
    F: FnMut(WebhookId) -> Fut,
    Fut: Future<Output = Result<(), ProviderError>>,
{
    let mut deleted = Vec::with_capacity(ids.len());
    for id in ids {
        if let Err(e) = delete_one(id.clone()).await {
            return Err(ProviderError::PartialDelete {
                deleted,
                failed: id.clone(),
                message: e.to_string(),
            });
        }
        deleted.push(id.clone());
    }
    Ok(deleted)
}

#[cfg(test)]
mod tests {
    use reqwest::header::HeaderValue;

    use super::*;

    fn link(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(LINK, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn next_link_is_taken_from_link_header() {
        let headers = link(
            "<https://api.github.com/repositories/1/hooks?per_page=100&page=2>; rel=\"next\", \
             <https://api.github.com/repositories/1/hooks?per_page=100&page=3>; rel=\"last\"",
        );
        assert_eq!(
            next_link(&headers).as_deref(),
            Some("https://api.github.com/repositories/1/hooks?per_page=100&page=2")
        );
    }

    #[test]
    fn last_page_has_no_next_link() {
        let headers = link(
            "<https://gitlab.com/api/v4/projects/1/hooks?page=1>; rel=\"first\", \
             <https://gitlab.com/api/v4/projects/1/hooks?page=1>; rel=\"prev\"",
        );
        assert_eq!(next_link(&headers), None);
        assert_eq!(next_link(&HeaderMap::new()), None);
    }

    #[test]
    fn empty_header_values_are_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert("x-next-page", HeaderValue::from_static(""));
        assert_eq!(header_value(&headers, "x-next-page"), None);

        headers.insert("x-next-page", HeaderValue::from_static("2"));
        assert_eq!(header_value(&headers, "x-next-page"), Some("2"));
    }

    fn ids(raw: &[&str]) -> Vec<WebhookId> {
        raw.iter().map(|s| WebhookId::new(*s).unwrap()).collect()
    }

    #[tokio::test]
    async fn deletes_every_id_in_order() {
        let mut seen = Vec::new();
        let deleted = delete_in_order(&ids(&["1", "2", "3"]), |id| {
            seen.push(id);
            async { Ok::<(), ProviderError>(()) }
        })
        .await
        .unwrap();

        assert_eq!(deleted, ids(&["1", "2", "3"]));
        assert_eq!(seen, ids(&["1", "2", "3"]));
    }

    #[tokio::test]
    async fn stops_at_first_failure_and_reports_progress() {
        let err = delete_in_order(&ids(&["1", "2", "3"]), |id| async move {
            if id.as_str() == "2" {
                Err(ProviderError::Http {
                    status: Some(404),
                    message: "Not Found".to_string(),
                })
            } else {
                Ok(())
            }
        })
        .await
        .unwrap_err();

        match err {
            ProviderError::PartialDelete {
                deleted, failed, ..
            } => {
                assert_eq!(deleted, ids(&["1"]));
                assert_eq!(failed.as_str(), "2");
            }
            other => panic!("expected PartialDelete, got {other:?}"),
        }
    }
}
