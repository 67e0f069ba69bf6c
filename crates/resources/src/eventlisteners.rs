//! EventListener builder.
//!
//! Every CICD pipeline has exactly one EventListener, `cicd-event-listener`,
//! in the CICD namespace. Its triggers either come from a single repository's
//! push trigger ([`generate`]) or are assembled by the caller
//! ([`from_triggers`]).

use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use pipelines::{Namespace, SecretName};

use crate::repository::Repository;
use crate::triggers::{
    EventListener, EventListenerSpec, EventListenerTrigger, EVENT_LISTENER_KIND,
    TRIGGERS_API_VERSION,
};

/// Name of the single EventListener in the CICD namespace.
pub const EVENT_LISTENER_NAME: &str = "cicd-event-listener";

/// Builds the EventListener for pushes to `repo`.
pub fn generate(
    repo: &dyn Repository,
    namespace: &Namespace,
    service_account: &str,
    secret_name: &SecretName,
) -> EventListener {
    from_triggers(
        namespace,
        service_account,
        vec![repo.push_trigger(secret_name, namespace)],
    )
}

/// Builds the EventListener from a pre-assembled trigger list.
pub fn from_triggers(
    namespace: &Namespace,
    service_account: &str,
    triggers: Vec<EventListenerTrigger>,
) -> EventListener {
    EventListener {
        api_version: TRIGGERS_API_VERSION.to_string(),
        kind: EVENT_LISTENER_KIND.to_string(),
        metadata: ObjectMeta {
            name: Some(EVENT_LISTENER_NAME.to_string()),
            namespace: Some(namespace.to_string()),
            ..ObjectMeta::default()
        },
        spec: EventListenerSpec {
            service_account_name: service_account.to_string(),
            triggers,
        },
    }
}

#[cfg(test)]
mod tests {
    use pipelines::secrets::GITOPS_WEBHOOK_SECRET;

    use super::*;
    use crate::repository::{GitHubRepository, GitLabRepository};

    fn ns(name: &str) -> Namespace {
        Namespace::new(name).unwrap()
    }

    #[test]
    fn generate_binds_one_push_trigger() {
        let repo = GitHubRepository::new("org/gitops");
        let secret = SecretName::new(GITOPS_WEBHOOK_SECRET).unwrap();

        let el = generate(&repo, &ns("cicd"), "pipeline", &secret);

        assert_eq!(el.api_version, "triggers.tekton.dev/v1alpha1");
        assert_eq!(el.kind, "EventListener");
        assert_eq!(el.metadata.name.as_deref(), Some(EVENT_LISTENER_NAME));
        assert_eq!(el.metadata.namespace.as_deref(), Some("cicd"));
        assert_eq!(el.spec.service_account_name, "pipeline");
        assert_eq!(el.spec.triggers, vec![repo.push_trigger(&secret, &ns("cicd"))]);
    }

    #[test]
    fn listener_name_is_fixed_regardless_of_inputs() {
        let secret = SecretName::new("webhook-secret.dev.gateway").unwrap();
        let github = GitHubRepository::new("org/a");
        let gitlab = GitLabRepository::new("group/b");
        let triggers = vec![
            github.push_trigger(&secret, &ns("tools")),
            gitlab.push_trigger(&secret, &ns("tools")),
        ];

        let listeners = [
            from_triggers(&ns("tools"), "pipeline", Vec::new()),
            from_triggers(&ns("other"), "pipeline", triggers),
            generate(&gitlab, &ns("cicd"), "pipeline", &secret),
        ];

        for el in &listeners {
            assert_eq!(el.metadata.name.as_deref(), Some("cicd-event-listener"));
        }
        assert_eq!(listeners[1].spec.triggers.len(), 2);
    }

    #[test]
    fn serializes_with_camel_case_fields() {
        let el = from_triggers(&ns("cicd"), "pipeline", Vec::new());
        let value = serde_json::to_value(&el).unwrap();

        assert_eq!(value["apiVersion"], "triggers.tekton.dev/v1alpha1");
        assert_eq!(value["spec"]["serviceAccountName"], "pipeline");
        assert_eq!(value["spec"]["triggers"], serde_json::json!([]));
    }
}
