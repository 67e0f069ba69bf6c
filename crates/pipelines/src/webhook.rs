//! Webhook lifecycle orchestrator.
//!
//! [`WebhookOrchestrator`] resolves which repository and which event listener
//! URL a [`WebhookTarget`] is bound to, then creates, lists, or deletes the
//! webhooks that connect the two.
//!
//! ## Resolution
//!
//! Every operation first builds a `WebhookContext`:
//!
//! 1. load the manifest ([`WebhookError::ManifestLoad`]);
//! 2. pick the repository URL for the target ([`WebhookError::RepositoryNotFound`]);
//! 3. read the CICD namespace from the pipelines config ([`WebhookError::ConfigMissing`]);
//! 4. connect to the cluster ([`WebhookError::ClusterUnavailable`]);
//! 5. bind a Git client to the repository ([`WebhookError::InvalidRepository`]);
//! 6. read the event listener route ([`WebhookError::ListenerResolution`]).
//!
//! Nothing is sent to the Git provider until all six steps succeed.
//!
//! ## Invariant
//!
//! At most one webhook per listener URL: [`WebhookOrchestrator::create`]
//! refuses with [`WebhookError::AlreadyExists`] when the provider already
//! reports one. The check-then-create sequence is not atomic across
//! processes.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::ports::{
    ClusterConnector, ClusterResources, GitClientFactory, GitRepositoryClient, ManifestLoader,
};
use crate::secrets::{webhook_secret_name, WEBHOOK_SECRET_KEY};
use crate::{
    AccessToken, ListenerEndpoint, Manifest, Namespace, ProviderError, RepositoryUrl, RouteName,
    WebhookError, WebhookId, WebhookSecret, WebhookTarget,
};

/// Route in the CICD namespace that exposes the event listener.
pub const EVENT_LISTENER_ROUTE: &str = "gitops-webhook-event-listener-route";

/// Inputs shared by every webhook operation.
#[derive(Debug, Clone)]
pub struct WebhookRequest {
    /// Token used to authenticate against the Git provider.
    pub access_token: AccessToken,
    /// Path of the pipelines manifest.
    pub pipelines_file: PathBuf,
    /// Repository the operation acts on.
    pub target: WebhookTarget,
}

/// Returns the repository URL for `target`, or `None` if the manifest has no
/// non-empty URL for it.
///
/// [`WebhookTarget::Cicd`] selects `gitops_url`; a service target selects the
/// `source_url` of the first matching service.
pub fn repository_url<'m>(manifest: &'m Manifest, target: &WebhookTarget) -> Option<&'m str> {
    let url = match target {
        WebhookTarget::Cicd => Some(manifest.gitops_url.as_str()),
        WebhookTarget::Service(name) => manifest.source_url(name),
    };
    url.filter(|u| !u.is_empty())
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

/// Creates, lists, and deletes webhooks for the CICD repository or a
/// service's source repository.
///
/// Holds no state between calls; each operation resolves everything afresh.
pub struct WebhookOrchestrator {
    manifests: Arc<dyn ManifestLoader>,
    cluster: Arc<dyn ClusterConnector>,
    git: Arc<dyn GitClientFactory>,
}

impl WebhookOrchestrator {
    /// Creates an orchestrator from its collaborators.
    pub fn new(
        manifests: Arc<dyn ManifestLoader>,
        cluster: Arc<dyn ClusterConnector>,
        git: Arc<dyn GitClientFactory>,
    ) -> Self {
        Self {
            manifests,
            cluster,
            git,
        }
    }

    /// Registers a webhook posting to the event listener and returns its id.
    ///
    /// Fails with [`WebhookError::AlreadyExists`] if any webhook already posts
    /// to the listener URL. The webhook secret is resolved only after that
    /// check passes, and nothing is registered unless both succeed.
    #[instrument(skip_all, fields(target = %request.target))]
    pub async fn create(&self, request: &WebhookRequest) -> Result<WebhookId, WebhookError> {
        let context = self.resolve(request).await?;

        let existing = context.list().await?;
        if !existing.is_empty() {
            warn!(
                repository = %context.repository,
                listener_url = %context.listener_url,
                count = existing.len(),
                "Webhook already registered"
            );
            return Err(WebhookError::AlreadyExists {
                repository: context.repository.to_string(),
                listener_url: context.listener_url,
                existing,
            });
        }

        let secret = context.webhook_secret().await?;
        let id = context
            .client
            .create_webhook(&context.listener_url, &secret)
            .await
            .map_err(|source| context.provider_error(source))?;

        info!(
            webhook_id = %id,
            repository = %context.repository,
            listener_url = %context.listener_url,
            "Created webhook"
        );
        Ok(id)
    }

    /// Returns the ids of webhooks posting to the event listener, in provider
    /// order.
    #[instrument(skip_all, fields(target = %request.target))]
    pub async fn list(&self, request: &WebhookRequest) -> Result<Vec<WebhookId>, WebhookError> {
        let context = self.resolve(request).await?;
        context.list().await
    }

    /// Deletes every webhook posting to the event listener and returns the
    /// ids the provider confirmed removed.
    #[instrument(skip_all, fields(target = %request.target))]
    pub async fn delete(&self, request: &WebhookRequest) -> Result<Vec<WebhookId>, WebhookError> {
        let context = self.resolve(request).await?;

        let ids = context.list().await?;
        if ids.is_empty() {
            debug!(listener_url = %context.listener_url, "No webhooks to delete");
            return Ok(Vec::new());
        }

        let deleted = context
            .client
            .delete_webhooks(&ids)
            .await
            .map_err(|source| context.provider_error(source))?;

        if deleted.len() < ids.len() {
            warn!(
                requested = ids.len(),
                deleted = deleted.len(),
                repository = %context.repository,
                "Provider deleted fewer webhooks than requested"
            );
        }
        info!(
            count = deleted.len(),
            repository = %context.repository,
            listener_url = %context.listener_url,
            "Deleted webhooks"
        );
        Ok(deleted)
    }

    async fn resolve(&self, request: &WebhookRequest) -> Result<WebhookContext, WebhookError> {
        let path = &request.pipelines_file;
        let manifest = self
            .manifests
            .load(path)
            .map_err(|source| WebhookError::ManifestLoad {
                path: path.clone(),
                source,
            })?;

        let raw_url = repository_url(&manifest, &request.target).ok_or_else(|| {
            WebhookError::RepositoryNotFound {
                target: request.target.clone(),
            }
        })?;

        let cicd_namespace = manifest
            .pipelines_config()
            .and_then(|cfg| Namespace::new(cfg.name.clone()))
            .ok_or_else(|| WebhookError::ConfigMissing { path: path.clone() })?;
        debug!(repository = raw_url, namespace = %cicd_namespace, "Resolved manifest");

        let cluster = self
            .cluster
            .connect()
            .await
            .map_err(|source| WebhookError::ClusterUnavailable { source })?;

        let invalid = |source: ProviderError| WebhookError::InvalidRepository {
            repository: raw_url.to_string(),
            source,
        };
        let repository = RepositoryUrl::parse(raw_url).map_err(|e| invalid(e.into()))?;
        let client = self
            .git
            .client_for(&repository, &request.access_token)
            .map_err(invalid)?;

        let route = RouteName::derived(EVENT_LISTENER_ROUTE);
        let address = cluster
            .listener_address(&cicd_namespace, &route)
            .await
            .map_err(|source| WebhookError::ListenerResolution {
                namespace: cicd_namespace.clone(),
                route,
                source,
            })?;
        let listener_url = ListenerEndpoint::from(address).url();
        debug!(listener_url = %listener_url, "Resolved event listener");

        Ok(WebhookContext {
            repository,
            cicd_namespace,
            listener_url,
            target: request.target.clone(),
            cluster,
            client,
        })
    }
}

// ---------------------------------------------------------------------------
// Context
// ---------------------------------------------------------------------------

/// Everything one operation needs, resolved up front.
struct WebhookContext {
    repository: RepositoryUrl,
    cicd_namespace: Namespace,
    listener_url: String,
    target: WebhookTarget,
    cluster: Box<dyn ClusterResources>,
    client: Box<dyn GitRepositoryClient>,
}

impl WebhookContext {
    async fn list(&self) -> Result<Vec<WebhookId>, WebhookError> {
        self.client
            .list_webhooks(&self.listener_url)
            .await
            .map_err(|source| self.provider_error(source))
    }

    /// Reads the target's webhook secret from the CICD namespace.
    async fn webhook_secret(&self) -> Result<WebhookSecret, WebhookError> {
        let secret = webhook_secret_name(&self.target);
        self.cluster
            .read_secret_value(&self.cicd_namespace, &secret, WEBHOOK_SECRET_KEY)
            .await
            .map_err(|source| WebhookError::SecretNotFound {
                namespace: self.cicd_namespace.clone(),
                secret,
                source,
            })
    }

    fn provider_error(&self, source: ProviderError) -> WebhookError {
        WebhookError::Provider {
            repository: self.repository.to_string(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EnvironmentName, QualifiedServiceName, ServiceName};

    fn manifest() -> Manifest {
        Manifest::from_yaml(
            r#"
gitops_url: https://github.com/org/gitops.git
config:
  pipelines:
    name: cicd
environments:
  - name: dev
    apps:
      - name: taxi
        services:
          - name: gateway
            source_url: https://github.com/org/gateway.git
          - name: billing
"#,
        )
        .unwrap()
    }

    fn service(env: &str, svc: &str) -> WebhookTarget {
        WebhookTarget::Service(QualifiedServiceName::new(
            EnvironmentName::new(env).unwrap(),
            ServiceName::new(svc).unwrap(),
        ))
    }

    #[test]
    fn cicd_target_resolves_gitops_url() {
        assert_eq!(
            repository_url(&manifest(), &WebhookTarget::Cicd),
            Some("https://github.com/org/gitops.git")
        );
    }

    #[test]
    fn service_target_resolves_literal_source_url() {
        assert_eq!(
            repository_url(&manifest(), &service("dev", "gateway")),
            Some("https://github.com/org/gateway.git")
        );
    }

    #[test]
    fn missing_or_empty_urls_do_not_resolve() {
        assert_eq!(repository_url(&manifest(), &service("dev", "absent")), None);
        assert_eq!(repository_url(&manifest(), &service("dev", "billing")), None);
        assert_eq!(repository_url(&Manifest::default(), &WebhookTarget::Cicd), None);
    }
}
