//! Shared value types for the webhook domain.
//!
//! Unlike the newtype identifiers in [`crate::identifiers`], these types carry
//! invariants of their own: a [`WebhookTarget`] selects exactly one repository
//! and one secret, a [`ListenerEndpoint`] always renders a bare `scheme://host`
//! URL, and the credential types never print their contents.

use serde::{Deserialize, Serialize};

use crate::{EnvironmentName, ServiceName};

// ---------------------------------------------------------------------------
// Targets
// ---------------------------------------------------------------------------

/// The (environment, service) pair that identifies a service's source
/// repository and its webhook secret.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QualifiedServiceName {
    /// Environment the service is deployed to.
    pub environment: EnvironmentName,
    /// Service name within the environment.
    pub service: ServiceName,
}

impl QualifiedServiceName {
    /// Creates a new qualified name.
    pub fn new(environment: EnvironmentName, service: ServiceName) -> Self {
        Self {
            environment,
            service,
        }
    }
}

impl std::fmt::Display for QualifiedServiceName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.environment, self.service)
    }
}

// ---------------------------------------------------------------------------

/// Which repository a webhook operation acts on.
///
/// The variant decides both the repository URL (GitOps repository vs. the
/// service's `source_url`) and the webhook secret (the CICD secret vs. the
/// per-service secret). The two are never mixed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WebhookTarget {
    /// The GitOps repository that holds the CICD pipeline configuration.
    Cicd,
    /// The source repository of one service.
    Service(QualifiedServiceName),
}

impl WebhookTarget {
    /// Builds a target from the CLI-level `(is_cicd, service)` pair.
    ///
    /// `is_cicd` wins when both are supplied. Returns `None` when neither is.
    pub fn from_flags(is_cicd: bool, service: Option<QualifiedServiceName>) -> Option<Self> {
        if is_cicd {
            Some(Self::Cicd)
        } else {
            service.map(Self::Service)
        }
    }

    /// Returns `true` for [`WebhookTarget::Cicd`].
    pub fn is_cicd(&self) -> bool {
        matches!(self, Self::Cicd)
    }
}

impl std::fmt::Display for WebhookTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cicd => write!(f, "CICD"),
            Self::Service(name) => write!(f, "service {name}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Listener endpoint
// ---------------------------------------------------------------------------

/// Raw route facts reported by the cluster for the event listener.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenerAddress {
    /// Whether the route terminates TLS.
    pub has_tls: bool,
    /// External host name of the route.
    pub host: String,
}

/// URL scheme of the event listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scheme {
    /// Plain HTTP.
    Http,
    /// TLS-terminated HTTPS.
    Https,
}

impl Scheme {
    /// Returns the scheme as it appears in a URL.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Https => "https",
        }
    }
}

/// `(scheme, host)` pair the Git provider posts push events to.
///
/// Recomputed from cluster state on every operation; never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenerEndpoint {
    /// `https` iff the route terminates TLS.
    pub scheme: Scheme,
    /// External host name.
    pub host: String,
}

impl ListenerEndpoint {
    /// Returns the listener URL: `scheme://host` with no path, query, or
    /// trailing slash.
    pub fn url(&self) -> String {
        format!("{}://{}", self.scheme.as_str(), self.host)
    }
}

impl From<ListenerAddress> for ListenerEndpoint {
    fn from(address: ListenerAddress) -> Self {
        let scheme = if address.has_tls {
            Scheme::Https
        } else {
            Scheme::Http
        };
        Self {
            scheme,
            host: address.host,
        }
    }
}

impl std::fmt::Display for ListenerEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}://{}", self.scheme.as_str(), self.host)
    }
}

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

/// Git provider access token supplied by the caller.
///
/// `Debug` is redacted so the token never reaches a log line.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    /// Wraps a token, returning `None` if it is empty.
    pub fn new(token: impl Into<String>) -> Option<Self> {
        let t = token.into();
        if t.is_empty() {
            None
        } else {
            Some(Self(t))
        }
    }

    /// Returns the raw token for use in an `Authorization` header.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

/// Shared secret the Git provider signs webhook payloads with.
#[derive(Clone, PartialEq, Eq)]
pub struct WebhookSecret(String);

impl WebhookSecret {
    /// Wraps a secret value read from the cluster.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the raw secret value.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for WebhookSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("WebhookSecret(<redacted>)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> QualifiedServiceName {
        QualifiedServiceName::new(
            EnvironmentName::new("dev").unwrap(),
            ServiceName::new("taxi").unwrap(),
        )
    }

    #[test]
    fn tls_route_yields_https_url_without_trailing_slash() {
        let endpoint = ListenerEndpoint::from(ListenerAddress {
            has_tls: true,
            host: "example.com".to_string(),
        });
        assert_eq!(endpoint.url(), "https://example.com");
    }

    #[test]
    fn plain_route_yields_http_url() {
        let endpoint = ListenerEndpoint::from(ListenerAddress {
            has_tls: false,
            host: "example.com".to_string(),
        });
        assert_eq!(endpoint.scheme, Scheme::Http);
        assert_eq!(endpoint.url(), "http://example.com");
        assert_eq!(endpoint.to_string(), endpoint.url());
    }

    #[test]
    fn cicd_flag_takes_precedence_over_service() {
        assert_eq!(
            WebhookTarget::from_flags(true, Some(service())),
            Some(WebhookTarget::Cicd)
        );
        assert_eq!(
            WebhookTarget::from_flags(false, Some(service())),
            Some(WebhookTarget::Service(service()))
        );
        assert_eq!(WebhookTarget::from_flags(false, None), None);
    }

    #[test]
    fn credentials_are_redacted_in_debug_output() {
        let token = AccessToken::new("ghp_secret").unwrap();
        let secret = WebhookSecret::new("s3cr3t");
        assert!(!format!("{token:?}").contains("ghp_secret"));
        assert!(!format!("{secret:?}").contains("s3cr3t"));
        assert_eq!(token.expose(), "ghp_secret");
    }
}
