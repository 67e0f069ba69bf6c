//! Declarative object builders for the GitOps pipeline.
//!
//! Pure functions that build the Kubernetes and Tekton objects the bootstrap
//! writes into the GitOps repository. Nothing here talks to a cluster.
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`deployment`] | Single-replica `apps/v1` Deployments with an options struct |
//! | [`eventlisteners`] | The `cicd-event-listener` EventListener |
//! | [`repository`] | Provider-specific push triggers |
//! | [`triggers`] | Tekton Triggers object model |

#![warn(missing_docs)]

pub mod deployment;
pub mod eventlisteners;
pub mod repository;
pub mod triggers;

use thiserror::Error;

pub use deployment::DeploymentOptions;
pub use repository::{repository_for, GitHubRepository, GitLabRepository, Repository};
pub use triggers::{EventListener, EventListenerTrigger};

/// Errors produced by the builders.
#[derive(Debug, Error)]
pub enum BuildError {
    /// A container port outside `1..=65535`.
    #[error("Invalid container port {0}")]
    InvalidContainerPort(i32),

    /// A command override with no arguments.
    #[error("Container command must not be empty")]
    EmptyCommand,

    /// No push trigger is known for the repository host.
    #[error("Unsupported Git provider for host '{0}'")]
    UnsupportedProvider(String),
}
