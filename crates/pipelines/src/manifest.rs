//! Pipelines manifest model.
//!
//! The manifest is a YAML document listing environments, their applications,
//! and each application's services, plus the GitOps repository URL and the
//! CICD pipelines configuration. Only the fields the webhook orchestrator
//! consults are modelled; unknown fields are ignored.
//!
//! ```yaml
//! gitops_url: https://github.com/org/gitops.git
//! config:
//!   pipelines:
//!     name: cicd
//! environments:
//!   - name: dev
//!     apps:
//!       - name: taxi
//!         services:
//!           - name: gateway
//!             source_url: https://github.com/org/gateway.git
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ports::ManifestLoader;
use crate::QualifiedServiceName;

/// Errors produced while reading or parsing a manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// The file could not be read.
    #[error("Failed to read manifest: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not a valid manifest document.
    #[error("Failed to parse manifest: {0}")]
    Parse(#[from] serde_yaml::Error),
}

/// Root of the pipelines manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// URL of the GitOps repository holding the CICD configuration.
    #[serde(default)]
    pub gitops_url: String,

    /// Cluster-wide configuration records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<Config>,

    /// Environments in declaration order.
    #[serde(default)]
    pub environments: Vec<Environment>,
}

/// Cluster-wide configuration records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// CICD pipelines configuration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pipelines: Option<PipelinesConfig>,
}

/// CICD pipelines configuration record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelinesConfig {
    /// Name of the CICD namespace.
    pub name: String,
}

/// A deployment environment and the applications promoted into it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Environment {
    /// Environment name (e.g. `dev`).
    pub name: String,
    /// Applications in declaration order.
    #[serde(default)]
    pub apps: Vec<Application>,
}

/// An application grouping one or more services.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    /// Application name.
    pub name: String,
    /// Services in declaration order.
    #[serde(default)]
    pub services: Vec<Service>,
}

/// A service built from its own source repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    /// Service name, unique within its environment.
    pub name: String,
    /// Source repository whose pushes trigger this service's pipeline.
    #[serde(default)]
    pub source_url: String,
}

impl Manifest {
    /// Parses a manifest from YAML text.
    pub fn from_yaml(text: &str) -> Result<Self, ManifestError> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Returns the CICD pipelines configuration, if present.
    pub fn pipelines_config(&self) -> Option<&PipelinesConfig> {
        self.config.as_ref().and_then(|c| c.pipelines.as_ref())
    }

    /// Returns the `source_url` of the first service matching `name`.
    ///
    /// Environments, applications, and services are scanned in declaration
    /// order. The URL is returned as written; it may be empty.
    pub fn source_url(&self, name: &QualifiedServiceName) -> Option<&str> {
        self.environments
            .iter()
            .filter(|env| env.name == name.environment.as_str())
            .flat_map(|env| env.apps.iter())
            .flat_map(|app| app.services.iter())
            .find(|svc| svc.name == name.service.as_str())
            .map(|svc| svc.source_url.as_str())
    }
}

/// Loads manifests from the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileManifestLoader;

impl ManifestLoader for FileManifestLoader {
    fn load(&self, path: &Path) -> Result<Manifest, ManifestError> {
        let text = std::fs::read_to_string(path)?;
        Manifest::from_yaml(&text)
    }
}
