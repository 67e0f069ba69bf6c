//! Tekton Triggers object model (`triggers.tekton.dev/v1alpha1`).
//!
//! Only the parts of the EventListener schema the builders emit are
//! modelled. Field names follow the CRD's camelCase JSON.

use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use serde::{Deserialize, Serialize};

/// `apiVersion` of every Tekton Triggers object built here.
pub const TRIGGERS_API_VERSION: &str = "triggers.tekton.dev/v1alpha1";
/// `kind` of an EventListener.
pub const EVENT_LISTENER_KIND: &str = "EventListener";

/// A Tekton EventListener: an HTTP sink that runs triggers on each event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventListener {
    /// Always [`TRIGGERS_API_VERSION`].
    pub api_version: String,
    /// Always [`EVENT_LISTENER_KIND`].
    pub kind: String,
    /// Object name and namespace.
    pub metadata: ObjectMeta,
    /// Service account and triggers.
    pub spec: EventListenerSpec,
}

/// Body of an [`EventListener`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventListenerSpec {
    /// Service account the listener runs triggered resources as.
    pub service_account_name: String,
    /// Triggers evaluated for every incoming event.
    pub triggers: Vec<EventListenerTrigger>,
}

/// One trigger: interceptors filter the event, bindings extract parameters,
/// and the template instantiates resources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventListenerTrigger {
    /// Trigger name, unique within the listener.
    pub name: String,
    /// Filters and validators run in order before the bindings.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub interceptors: Vec<EventInterceptor>,
    /// TriggerBindings extracting parameters from the event.
    #[serde(default)]
    pub bindings: Vec<TriggerRef>,
    /// TriggerTemplate instantiated when the event passes.
    pub template: TriggerRef,
}

/// Reference to a named TriggerBinding or TriggerTemplate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerRef {
    /// Name of the referenced object.
    #[serde(rename = "ref")]
    pub name: String,
}

impl TriggerRef {
    /// References the object called `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// An interceptor, keyed by its type in the serialized form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventInterceptor {
    /// Common Expression Language filter over headers and body.
    Cel(CelInterceptor),
    /// Validates the `X-Hub-Signature` HMAC against a secret.
    GitHub(WebhookInterceptor),
    /// Validates the `X-Gitlab-Token` header against a secret.
    GitLab(WebhookInterceptor),
}

/// CEL filter interceptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CelInterceptor {
    /// Expression that must evaluate to true for the event to pass.
    pub filter: String,
}

/// Provider signature-validating interceptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookInterceptor {
    /// Secret holding the shared webhook secret.
    pub secret_ref: SecretRef,
}

/// Location of a webhook secret value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecretRef {
    /// Secret name.
    pub secret_name: String,
    /// Key within the secret's data.
    pub secret_key: String,
    /// Namespace holding the secret.
    pub namespace: String,
}
