//! Deployment builder.
//!
//! Produces a single-replica `apps/v1` Deployment whose object, selector, and
//! pod template all carry the same `app.kubernetes.io/name` /
//! `app.kubernetes.io/part-of` label pair.

use std::collections::BTreeMap;

use k8s_openapi::api::apps::v1::{Deployment, DeploymentSpec};
use k8s_openapi::api::core::v1::{Container, ContainerPort, EnvVar, PodSpec, PodTemplateSpec};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{LabelSelector, ObjectMeta};

use crate::BuildError;

/// Label naming the component.
pub const KUBERNETES_APP_NAME_LABEL: &str = "app.kubernetes.io/name";
/// Label naming the higher-level application the component belongs to.
pub const KUBERNETES_PART_OF_LABEL: &str = "app.kubernetes.io/part-of";

const DEFAULT_SERVICE_ACCOUNT: &str = "default";
const PULL_ALWAYS: &str = "Always";

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Optional container settings applied by [`create`] and [`pod_template`].
///
/// Each field is unset by default. Combine option sets with
/// [`DeploymentOptions::merge`]; fields set on the later set win.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeploymentOptions {
    /// Adds a single container port.
    pub container_port: Option<i32>,
    /// Replaces the container's environment.
    pub env: Option<Vec<EnvVar>>,
    /// Replaces the container's entrypoint.
    pub command: Option<Vec<String>>,
}

impl DeploymentOptions {
    /// Returns an option set with nothing set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the single container port.
    pub fn container_port(mut self, port: i32) -> Self {
        self.container_port = Some(port);
        self
    }

    /// Sets the container environment.
    pub fn env(mut self, env: Vec<EnvVar>) -> Self {
        self.env = Some(env);
        self
    }

    /// Sets the container entrypoint.
    pub fn command(mut self, command: Vec<String>) -> Self {
        self.command = Some(command);
        self
    }

    /// Overlays `later` on `self`; every field set in `later` wins.
    pub fn merge(self, later: Self) -> Self {
        Self {
            container_port: later.container_port.or(self.container_port),
            env: later.env.or(self.env),
            command: later.command.or(self.command),
        }
    }

    /// Checks that every set field is usable in a container spec.
    pub fn validate(&self) -> Result<(), BuildError> {
        if let Some(port) = self.container_port {
            if !(1..=65535).contains(&port) {
                return Err(BuildError::InvalidContainerPort(port));
            }
        }
        if matches!(&self.command, Some(c) if c.is_empty()) {
            return Err(BuildError::EmptyCommand);
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

/// Builds a single-replica Deployment named `component`.
///
/// An empty `namespace` leaves the namespace unset.
pub fn create(
    part_of: &str,
    namespace: &str,
    component: &str,
    image: &str,
    options: &DeploymentOptions,
) -> Result<Deployment, BuildError> {
    let template = pod_template(part_of, component, image, options)?;
    Ok(Deployment {
        metadata: ObjectMeta {
            name: Some(component.to_string()),
            namespace: (!namespace.is_empty()).then(|| namespace.to_string()),
            labels: Some(labels(component, part_of)),
            ..ObjectMeta::default()
        },
        spec: Some(DeploymentSpec {
            replicas: Some(1),
            selector: label_selector(component, part_of),
            template,
            ..DeploymentSpec::default()
        }),
        ..Deployment::default()
    })
}

/// Returns a selector matching the component's label pair.
pub fn label_selector(component: &str, part_of: &str) -> LabelSelector {
    LabelSelector {
        match_labels: Some(labels(component, part_of)),
        ..LabelSelector::default()
    }
}

/// Returns the pod template for a single container named `component`.
///
/// Fails if `options` does not validate.
pub fn pod_template(
    part_of: &str,
    component: &str,
    image: &str,
    options: &DeploymentOptions,
) -> Result<PodTemplateSpec, BuildError> {
    options.validate()?;
    let container = Container {
        name: component.to_string(),
        image: Some(image.to_string()),
        image_pull_policy: Some(PULL_ALWAYS.to_string()),
        ports: options.container_port.map(|port| {
            vec![ContainerPort {
                container_port: port,
                ..ContainerPort::default()
            }]
        }),
        env: options.env.clone(),
        command: options.command.clone(),
        ..Container::default()
    };

    Ok(PodTemplateSpec {
        metadata: Some(ObjectMeta {
            labels: Some(labels(component, part_of)),
            ..ObjectMeta::default()
        }),
        spec: Some(PodSpec {
            service_account_name: Some(DEFAULT_SERVICE_ACCOUNT.to_string()),
            containers: vec![container],
            ..PodSpec::default()
        }),
    })
}

fn labels(component: &str, part_of: &str) -> BTreeMap<String, String> {
    BTreeMap::from([
        (KUBERNETES_APP_NAME_LABEL.to_string(), component.to_string()),
        (KUBERNETES_PART_OF_LABEL.to_string(), part_of.to_string()),
    ])
}
