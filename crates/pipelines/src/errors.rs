//! Error types for the webhook domain.
//!
//! [`WebhookError`] is the taxonomy the orchestrator returns to its caller.
//! Every variant is terminal for the current operation; nothing is retried.
//! [`ClusterError`] and [`ProviderError`] are produced by the adapters behind
//! the [`crate::ports`] traits and are carried as the `source` of the
//! orchestrator error that wraps them.

use std::path::PathBuf;

use thiserror::Error;

use crate::{ManifestError, Namespace, RouteName, SecretName, WebhookId, WebhookTarget};

// ---------------------------------------------------------------------------
// Orchestrator errors
// ---------------------------------------------------------------------------

/// Errors returned by [`crate::WebhookOrchestrator`] operations.
///
/// Each variant names the repository or namespace it concerns so the message
/// is actionable on its own.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// The pipelines manifest could not be read or parsed.
    #[error("Failed to load pipelines manifest '{}'", path.display())]
    ManifestLoad {
        /// Path that was loaded.
        path: PathBuf,
        /// Underlying read or parse failure.
        source: ManifestError,
    },

    /// No repository URL could be resolved for the target.
    ///
    /// Produced when the service is absent from the manifest, or when the
    /// matching URL (service `source_url` or top-level `gitops_url`) is empty.
    #[error("Failed to find Git repository URL for {target} in manifest")]
    RepositoryNotFound {
        /// The target that was looked up.
        target: WebhookTarget,
    },

    /// The manifest has no CICD pipelines configuration record, so the CICD
    /// namespace is unknown.
    #[error("Pipelines manifest '{}' has no CICD pipelines configuration", path.display())]
    ConfigMissing {
        /// Path of the manifest that lacks the record.
        path: PathBuf,
    },

    /// No cluster connection could be established.
    #[error("Failed to connect to the cluster")]
    ClusterUnavailable {
        /// Underlying connection failure.
        source: ClusterError,
    },

    /// The repository URL is malformed or names an unsupported provider.
    #[error("Invalid Git repository '{repository}'")]
    InvalidRepository {
        /// The repository URL as written in the manifest.
        repository: String,
        /// Underlying parse or provider-selection failure.
        source: ProviderError,
    },

    /// The event listener route could not be read.
    #[error("Failed to get event listener URL from route '{route}' in namespace '{namespace}'")]
    ListenerResolution {
        /// CICD namespace holding the route.
        namespace: Namespace,
        /// Route that was read.
        route: RouteName,
        /// Underlying cluster failure.
        source: ClusterError,
    },

    /// The webhook secret (or its value key) is absent from the cluster.
    #[error("Failed to get webhook secret '{secret}' in namespace '{namespace}'")]
    SecretNotFound {
        /// CICD namespace holding the secret.
        namespace: Namespace,
        /// Secret that was read.
        secret: SecretName,
        /// Underlying cluster failure.
        source: ClusterError,
    },

    /// At least one webhook is already registered for the listener URL.
    #[error("Webhook for '{listener_url}' already exists on '{repository}'")]
    AlreadyExists {
        /// Repository the webhook is registered on.
        repository: String,
        /// Listener URL the webhook posts to.
        listener_url: String,
        /// Identifiers of the existing webhooks.
        existing: Vec<WebhookId>,
    },

    /// The Git provider rejected or failed a request.
    #[error("Git provider request for '{repository}' failed")]
    Provider {
        /// Repository the request targeted.
        repository: String,
        /// Error surfaced by the Git repository client.
        source: ProviderError,
    },
}

impl WebhookError {
    /// Identifiers the provider confirmed deleted before a delete failed
    /// part-way, if this error is such a failure.
    pub fn partially_deleted(&self) -> Option<&[WebhookId]> {
        match self {
            Self::Provider {
                source: ProviderError::PartialDelete { deleted, .. },
                ..
            } => Some(deleted),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Adapter errors
// ---------------------------------------------------------------------------

/// Errors surfaced by a [`crate::ports::ClusterResources`] implementation.
#[derive(Debug, Error)]
pub enum ClusterError {
    /// No client could be constructed (no kubeconfig, unreachable API server).
    #[error("Cluster unavailable: {message}")]
    Unavailable {
        /// Description of the connection failure.
        message: String,
    },

    /// The requested object does not exist.
    #[error("{kind} '{name}' not found in namespace '{namespace}'")]
    NotFound {
        /// Object kind (e.g. `"Route"`, `"Secret"`).
        kind: &'static str,
        /// Namespace that was searched.
        namespace: String,
        /// Object name.
        name: String,
    },

    /// The secret exists but has no entry under the requested key.
    #[error("Secret '{secret}' has no key '{key}'")]
    MissingKey {
        /// Secret name.
        secret: String,
        /// Key that was requested.
        key: String,
    },

    /// The object exists but is missing a field the caller needs.
    #[error("{kind} '{name}' is missing field '{field}'")]
    MissingField {
        /// Object kind.
        kind: &'static str,
        /// Object name.
        name: String,
        /// Dotted path of the missing field.
        field: &'static str,
    },

    /// A secret value is not valid UTF-8.
    #[error("Secret '{secret}' key '{key}' is not valid UTF-8")]
    InvalidEncoding {
        /// Secret name.
        secret: String,
        /// Key whose value failed to decode.
        key: String,
    },

    /// Any other API server failure.
    #[error("Kubernetes API request failed: {message}")]
    Api {
        /// Description of the failure.
        message: String,
    },
}

/// Errors surfaced by a [`crate::ports::GitRepositoryClient`] or
/// [`crate::ports::GitClientFactory`] implementation.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The repository URL could not be parsed.
    #[error(transparent)]
    InvalidUrl(#[from] crate::RepoUrlError),

    /// The repository host is not served by any known provider driver.
    #[error("Unsupported Git provider for host '{host}'")]
    UnsupportedProvider {
        /// Host taken from the repository URL.
        host: String,
    },

    /// The HTTP request failed or returned a non-success status.
    #[error("HTTP request failed (status {}): {message}", status.map_or_else(|| "none".to_string(), |s| s.to_string()))]
    Http {
        /// Response status, if a response was received.
        status: Option<u16>,
        /// Response body or transport error text.
        message: String,
    },

    /// The response body could not be decoded.
    #[error("Unexpected response from Git provider: {message}")]
    Decode {
        /// Decoder error text.
        message: String,
    },

    /// Deletion stopped at `failed`; everything in `deleted` was removed.
    #[error("Failed to delete webhook '{failed}' after deleting {} webhook(s): {message}", deleted.len())]
    PartialDelete {
        /// Identifiers the provider confirmed deleted.
        deleted: Vec<WebhookId>,
        /// Identifier whose deletion failed.
        failed: WebhookId,
        /// Underlying failure text.
        message: String,
    },
}
