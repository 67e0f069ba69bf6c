//! Provider-specific push triggers.
//!
//! Each Git provider sends push events with its own headers and payload
//! layout, and signs them differently. A [`Repository`] knows how to build
//! the EventListener trigger that accepts pushes to itself; the binding and
//! template names it uses are its own concern.

use pipelines::secrets::WEBHOOK_SECRET_KEY;
use pipelines::{GitProvider, Namespace, RepositoryUrl, SecretName};

use crate::triggers::{
    CelInterceptor, EventInterceptor, EventListenerTrigger, SecretRef, TriggerRef,
    WebhookInterceptor,
};
use crate::BuildError;

const PUSH_TRIGGER_NAME: &str = "ci-dryrun-from-push";
const PUSH_TEMPLATE_NAME: &str = "ci-dryrun-from-push-template";

/// A Git repository that can describe the trigger for its own push events.
pub trait Repository {
    /// Repository path as the provider names it (e.g. `org/repo`).
    fn path(&self) -> &str;

    /// Builds a trigger accepting pushes to this repository, validated
    /// against the webhook secret `secret_name` in `namespace`.
    fn push_trigger(&self, secret_name: &SecretName, namespace: &Namespace) -> EventListenerTrigger;
}

/// Returns the repository abstraction for `url`'s provider.
pub fn repository_for(url: &RepositoryUrl) -> Result<Box<dyn Repository>, BuildError> {
    match url.provider() {
        Some(GitProvider::GitHub) => Ok(Box::new(GitHubRepository::new(url.path()))),
        Some(GitProvider::GitLab) => Ok(Box::new(GitLabRepository::new(url.path()))),
        None => Err(BuildError::UnsupportedProvider(url.host().to_string())),
    }
}

fn secret_ref(secret_name: &SecretName, namespace: &Namespace) -> SecretRef {
    SecretRef {
        secret_name: secret_name.to_string(),
        secret_key: WEBHOOK_SECRET_KEY.to_string(),
        namespace: namespace.to_string(),
    }
}

fn push_trigger(filter: String, validator: EventInterceptor, binding: &str) -> EventListenerTrigger {
    EventListenerTrigger {
        name: PUSH_TRIGGER_NAME.to_string(),
        interceptors: vec![EventInterceptor::Cel(CelInterceptor { filter }), validator],
        bindings: vec![TriggerRef::new(binding)],
        template: TriggerRef::new(PUSH_TEMPLATE_NAME),
    }
}

// ---------------------------------------------------------------------------

/// A repository hosted on GitHub.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitHubRepository {
    path: String,
}

impl GitHubRepository {
    /// Creates a repository for `owner/repo`.
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

impl Repository for GitHubRepository {
    fn path(&self) -> &str {
        &self.path
    }

    fn push_trigger(&self, secret_name: &SecretName, namespace: &Namespace) -> EventListenerTrigger {
        push_trigger(
            format!(
                "(header.match('X-GitHub-Event', 'push') && body.repository.full_name == '{}')",
                self.path
            ),
            EventInterceptor::GitHub(WebhookInterceptor {
                secret_ref: secret_ref(secret_name, namespace),
            }),
            "github-push-binding",
        )
    }
}

/// A project hosted on GitLab.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitLabRepository {
    path: String,
}

impl GitLabRepository {
    /// Creates a repository for the project at `group/project`.
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

impl Repository for GitLabRepository {
    fn path(&self) -> &str {
        &self.path
    }

    fn push_trigger(&self, secret_name: &SecretName, namespace: &Namespace) -> EventListenerTrigger {
        push_trigger(
            format!(
                "(header.match('X-Gitlab-Event', 'Push Hook') && body.project.path_with_namespace == '{}')",
                self.path
            ),
            EventInterceptor::GitLab(WebhookInterceptor {
                secret_ref: secret_ref(secret_name, namespace),
            }),
            "gitlab-push-binding",
        )
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn names() -> (SecretName, Namespace) {
        (
            SecretName::new("gitops-webhook-secret").unwrap(),
            Namespace::new("cicd").unwrap(),
        )
    }

    #[test]
    fn github_push_trigger_filters_on_repository() {
        let (secret, ns) = names();
        let trigger = GitHubRepository::new("org/gitops").push_trigger(&secret, &ns);

        assert_eq!(
            serde_json::to_value(&trigger).unwrap(),
            json!({
                "name": "ci-dryrun-from-push",
                "interceptors": [
                    { "cel": { "filter": "(header.match('X-GitHub-Event', 'push') && body.repository.full_name == 'org/gitops')" } },
                    { "github": { "secretRef": {
                        "secretName": "gitops-webhook-secret",
                        "secretKey": "webhook-secret-key",
                        "namespace": "cicd"
                    } } }
                ],
                "bindings": [ { "ref": "github-push-binding" } ],
                "template": { "ref": "ci-dryrun-from-push-template" }
            })
        );
    }

    #[test]
    fn gitlab_push_trigger_uses_gitlab_interceptor() {
        let (secret, ns) = names();
        let trigger = GitLabRepository::new("group/project").push_trigger(&secret, &ns);

        assert!(matches!(trigger.interceptors[1], EventInterceptor::GitLab(_)));
        assert_eq!(trigger.bindings, vec![TriggerRef::new("gitlab-push-binding")]);
    }

    #[test]
    fn repository_for_selects_by_host() {
        let github = RepositoryUrl::parse("https://github.com/org/repo.git").unwrap();
        assert_eq!(repository_for(&github).unwrap().path(), "org/repo");

        let other = RepositoryUrl::parse("https://git.example.com/org/repo").unwrap();
        assert!(matches!(
            repository_for(&other),
            Err(BuildError::UnsupportedProvider(host)) if host == "git.example.com"
        ));
    }
}
