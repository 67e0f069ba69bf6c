//! Cluster resource infrastructure adapter.
//!
//! Implements the [`pipelines::ports::ClusterConnector`] and
//! [`pipelines::ports::ClusterResources`] traits over the Kubernetes API using
//! `kube`. The connection follows the usual client resolution order: the
//! `KUBECONFIG` file and current context, then in-cluster service account
//! credentials.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** API discovery, object decoding, and error mapping all
//! live here. The [`pipelines`] crate sees only
//! [`pipelines::ListenerAddress`], [`pipelines::WebhookSecret`], and
//! [`pipelines::ClusterError`].

pub mod route;
pub mod secret;

use async_trait::async_trait;
use k8s_openapi::api::core::v1::Secret;
use kube::core::DynamicObject;
use kube::{Api, Client};
use pipelines::ports::{ClusterConnector, ClusterResources};
use pipelines::{ClusterError, ListenerAddress, Namespace, RouteName, SecretName, WebhookSecret};
use tracing::debug;

/// Connects to the cluster named by the current kubeconfig context.
#[derive(Debug, Clone, Copy, Default)]
pub struct KubeConnector;

#[async_trait]
impl ClusterConnector for KubeConnector {
    async fn connect(&self) -> Result<Box<dyn ClusterResources>, ClusterError> {
        let client = Client::try_default()
            .await
            .map_err(|e| ClusterError::Unavailable {
                message: e.to_string(),
            })?;
        debug!(default_namespace = client.default_namespace(), "Connected to cluster");
        Ok(Box::new(KubeClusterResources::new(client)))
    }
}

/// [`ClusterResources`] backed by a live Kubernetes client.
#[derive(Clone)]
pub struct KubeClusterResources {
    client: Client,
}

impl KubeClusterResources {
    /// Wraps an existing client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ClusterResources for KubeClusterResources {
    async fn listener_address(
        &self,
        namespace: &Namespace,
        route: &RouteName,
    ) -> Result<ListenerAddress, ClusterError> {
        let api: Api<DynamicObject> = Api::namespaced_with(
            self.client.clone(),
            namespace.as_str(),
            &route::route_resource(),
        );
        let obj = api
            .get(route.as_str())
            .await
            .map_err(|e| map_api_error(e, "Route", namespace, route.as_str()))?;
        route::listener_address(&obj)
    }

    async fn read_secret_value(
        &self,
        namespace: &Namespace,
        secret: &SecretName,
        key: &str,
    ) -> Result<WebhookSecret, ClusterError> {
        let api: Api<Secret> = Api::namespaced(self.client.clone(), namespace.as_str());
        let obj = api
            .get(secret.as_str())
            .await
            .map_err(|e| map_api_error(e, "Secret", namespace, secret.as_str()))?;
        secret::secret_value(&obj, key).map(WebhookSecret::new)
    }
}

fn map_api_error(err: kube::Error, kind: &'static str, namespace: &Namespace, name: &str) -> ClusterError {
    match err {
        kube::Error::Api(response) if response.code == 404 => ClusterError::NotFound {
            kind,
            namespace: namespace.to_string(),
            name: name.to_string(),
        },
        other => ClusterError::Api {
            message: other.to_string(),
        },
    }
}
