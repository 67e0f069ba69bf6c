//! Well-known secret names and webhook secret naming.
//!
//! The EventListener interceptors and the webhook orchestrator must agree on
//! where a webhook secret lives, so the names are defined once here.

use crate::{QualifiedServiceName, SecretName, WebhookTarget};

/// Secret holding the webhook secret for the GitOps (CICD) repository.
pub const GITOPS_WEBHOOK_SECRET: &str = "gitops-webhook-secret";

/// Key under which every webhook secret stores its value.
pub const WEBHOOK_SECRET_KEY: &str = "webhook-secret-key";

const SERVICE_WEBHOOK_SECRET_PREFIX: &str = "webhook-secret";

/// Returns the name of the secret holding a service's webhook secret.
///
/// Service webhook secrets live in the CICD namespace and are named
/// `webhook-secret.<environment>.<service>`. Environment and service names are
/// DNS-1123 labels, which never contain `.`, so distinct services always map
/// to distinct secrets.
pub fn service_webhook_secret_name(name: &QualifiedServiceName) -> SecretName {
    SecretName::derived(format!(
        "{SERVICE_WEBHOOK_SECRET_PREFIX}.{}.{}",
        name.environment, name.service
    ))
}

/// Returns the secret name for a webhook target.
pub fn webhook_secret_name(target: &WebhookTarget) -> SecretName {
    match target {
        WebhookTarget::Cicd => SecretName::derived(GITOPS_WEBHOOK_SECRET.to_string()),
        WebhookTarget::Service(name) => service_webhook_secret_name(name),
    }
}
