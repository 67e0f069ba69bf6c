//! Core domain for the GitOps webhook tooling.
//!
//! This crate contains the manifest model, newtype identifiers, shared value
//! types, the error taxonomy, and the webhook lifecycle orchestrator.
//! Infrastructure crates implement the traits in [`ports`]; they never add
//! domain rules.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** This crate performs no network I/O.
//! It defines *what* is needed from the cluster and the Git provider;
//! the `cluster` and `scm` crates define *how* to supply it.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype identifiers (`Namespace`, `SecretName`, `WebhookId`, etc.) |
//! | [`types`] | Value types (`WebhookTarget`, `ListenerEndpoint`, credentials) |
//! | [`errors`] | `WebhookError` and the adapter error types |
//! | [`manifest`] | Pipelines manifest model and file loader |
//! | [`repository`] | Repository URL parsing and provider detection |
//! | [`secrets`] | Well-known secret names and service secret naming |
//! | [`ports`] | Traits implemented by infrastructure crates |
//! | [`webhook`] | The webhook orchestrator |

pub mod errors;
pub mod identifiers;
pub mod manifest;
pub mod ports;
pub mod repository;
pub mod secrets;
pub mod types;
pub mod webhook;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use errors::{ClusterError, ProviderError, WebhookError};
pub use identifiers::{
    EnvironmentName, Namespace, OperationId, RouteName, SecretName, ServiceName, WebhookId,
};
pub use manifest::{FileManifestLoader, Manifest, ManifestError, PipelinesConfig};
pub use repository::{GitProvider, RepoUrlError, RepositoryUrl};
pub use types::{
    AccessToken, ListenerAddress, ListenerEndpoint, QualifiedServiceName, Scheme, WebhookSecret,
    WebhookTarget,
};
pub use webhook::{repository_url, WebhookOrchestrator, WebhookRequest, EVENT_LISTENER_ROUTE};
