//! Newtype domain identifiers.
//!
//! Every name that flows between the manifest, the cluster, and the Git
//! provider is represented as a distinct newtype wrapping a `String`. This
//! prevents accidentally passing, for example, a [`SecretName`] where a
//! [`Namespace`] is expected even though both are plain strings on the wire.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Macro for String-wrapped newtypes.
// Generates: struct, new() returning Option<Self>, as_str(), Display.
// ---------------------------------------------------------------------------
macro_rules! string_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier, returning `None` if the value is empty.
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let v = value.into();
                if v.is_empty() { None } else { Some(Self(v)) }
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Identifiers: manifest names
// ---------------------------------------------------------------------------

string_id! {
    /// Name of an environment declared in the pipelines manifest (e.g. `"dev"`).
    EnvironmentName
}

string_id! {
    /// Name of a service declared under an application in the pipelines manifest.
    ServiceName
}

// ---------------------------------------------------------------------------
// Identifiers: cluster object names
// ---------------------------------------------------------------------------

string_id! {
    /// A Kubernetes namespace.
    ///
    /// The CICD namespace is taken from the manifest's pipelines configuration
    /// record; webhook secrets and the event listener route live there.
    Namespace
}

string_id! {
    /// Name of a Kubernetes `Secret` holding a webhook secret value.
    SecretName
}

impl SecretName {
    /// Wraps a name built from a non-empty prefix.
    pub(crate) fn derived(value: String) -> Self {
        Self(value)
    }
}

string_id! {
    /// Name of an OpenShift `Route` exposing the event listener.
    RouteName
}

impl RouteName {
    /// Wraps a well-known, non-empty route name.
    pub(crate) fn derived(value: &str) -> Self {
        Self(value.to_string())
    }
}

// ---------------------------------------------------------------------------
// Identifiers: Git provider
// ---------------------------------------------------------------------------

string_id! {
    /// Opaque identifier assigned by the Git hosting provider to a registered
    /// webhook.
    ///
    /// Only ever listed and passed back for deletion; never interpreted.
    WebhookId
}

// ---------------------------------------------------------------------------
// Identifiers: UUID-backed (internally generated)
// ---------------------------------------------------------------------------

/// Identifies one CLI invocation of a webhook operation.
///
/// Generated fresh for every invocation and recorded on the root span so all
/// cluster and provider activity from a single run can be correlated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OperationId(Uuid);

impl OperationId {
    /// Generates a new random operation identifier.
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying [`Uuid`].
    pub fn as_uuid(self) -> Uuid {
        self.0
    }
}

impl std::fmt::Display for OperationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_values_are_rejected() {
        assert!(Namespace::new("").is_none());
        assert!(WebhookId::new(String::new()).is_none());
    }

    #[test]
    fn display_matches_wrapped_value() {
        let id = WebhookId::new("12345").unwrap();
        assert_eq!(id.to_string(), "12345");
        assert_eq!(id.as_str(), "12345");
    }

    #[test]
    fn operation_ids_are_unique() {
        assert_ne!(OperationId::new_random(), OperationId::new_random());
    }
}
