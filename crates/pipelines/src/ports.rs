//! Port traits implemented by infrastructure crates.
//!
//! The orchestrator never constructs a cluster client or a Git provider client
//! itself. It receives factories for them, so tests substitute in-memory fakes
//! and the CLI injects the `cluster` and `scm` adapters.
//!
//! | Trait | Implemented by |
//! |-------|----------------|
//! | [`ManifestLoader`] | [`crate::FileManifestLoader`] |
//! | [`ClusterConnector`] / [`ClusterResources`] | `cluster::KubeConnector` |
//! | [`GitClientFactory`] / [`GitRepositoryClient`] | `scm::ScmClientFactory` |

use std::path::Path;

use async_trait::async_trait;

use crate::{
    AccessToken, ClusterError, ListenerAddress, Manifest, ManifestError, Namespace,
    ProviderError, RepositoryUrl, RouteName, SecretName, WebhookId, WebhookSecret,
};

/// Loads a pipelines manifest.
pub trait ManifestLoader: Send + Sync {
    /// Loads and parses the manifest at `path`.
    fn load(&self, path: &Path) -> Result<Manifest, ManifestError>;
}

// ---------------------------------------------------------------------------
// Cluster
// ---------------------------------------------------------------------------

/// Read access to the cluster objects the webhook orchestrator depends on.
#[async_trait]
pub trait ClusterResources: Send + Sync {
    /// Reads the route `route` in `namespace` and reports whether it
    /// terminates TLS and which host it exposes.
    async fn listener_address(
        &self,
        namespace: &Namespace,
        route: &RouteName,
    ) -> Result<ListenerAddress, ClusterError>;

    /// Reads the value stored under `key` in the secret `secret`.
    async fn read_secret_value(
        &self,
        namespace: &Namespace,
        secret: &SecretName,
        key: &str,
    ) -> Result<WebhookSecret, ClusterError>;
}

/// Produces a [`ClusterResources`] bound to the current cluster context.
#[async_trait]
pub trait ClusterConnector: Send + Sync {
    /// Connects to the cluster.
    async fn connect(&self) -> Result<Box<dyn ClusterResources>, ClusterError>;
}

// ---------------------------------------------------------------------------
// Git provider
// ---------------------------------------------------------------------------

/// Webhook operations against one repository on a Git hosting provider.
///
/// Implementations are bound to a single repository and access token at
/// construction time.
#[async_trait]
pub trait GitRepositoryClient: Send + Sync {
    /// Returns the identifiers of webhooks that post to `listener_url`, in
    /// the order the provider returns them.
    async fn list_webhooks(&self, listener_url: &str) -> Result<Vec<WebhookId>, ProviderError>;

    /// Registers a push webhook posting to `listener_url`, signed with
    /// `secret`, and returns its identifier.
    async fn create_webhook(
        &self,
        listener_url: &str,
        secret: &WebhookSecret,
    ) -> Result<WebhookId, ProviderError>;

    /// Deletes the given webhooks in order and returns those the provider
    /// confirmed removed.
    ///
    /// Stops at the first failure with [`ProviderError::PartialDelete`].
    async fn delete_webhooks(&self, ids: &[WebhookId]) -> Result<Vec<WebhookId>, ProviderError>;
}

/// Produces a [`GitRepositoryClient`] for a repository.
pub trait GitClientFactory: Send + Sync {
    /// Binds a client to `repository`, authenticated with `token`.
    ///
    /// Fails with [`ProviderError::UnsupportedProvider`] when no driver
    /// serves the repository host.
    fn client_for(
        &self,
        repository: &RepositoryUrl,
        token: &AccessToken,
    ) -> Result<Box<dyn GitRepositoryClient>, ProviderError>;
}
