//! Event listener route lookup.
//!
//! The event listener is exposed through an OpenShift `Route`
//! (`route.openshift.io/v1`). The type is not part of `k8s-openapi`, so it is
//! read through the dynamic API and only `spec.host` and `spec.tls` are
//! inspected.

use kube::core::{ApiResource, DynamicObject, GroupVersionKind};
use pipelines::{ClusterError, ListenerAddress};
use serde_json::Value;

/// API resource descriptor for OpenShift routes.
pub fn route_resource() -> ApiResource {
    let gvk = GroupVersionKind::gvk("route.openshift.io", "v1", "Route");
    ApiResource::from_gvk(&gvk)
}

/// Extracts the listener host and TLS flag from a route object.
///
/// A route has TLS when `spec.tls` is present and not null.
pub fn listener_address(route: &DynamicObject) -> Result<ListenerAddress, ClusterError> {
    let spec = route.data.get("spec");

    let host = spec
        .and_then(|s| s.get("host"))
        .and_then(Value::as_str)
        .filter(|h| !h.is_empty())
        .ok_or_else(|| ClusterError::MissingField {
            kind: "Route",
            name: route.metadata.name.clone().unwrap_or_default(),
            field: "spec.host",
        })?;
    let has_tls = spec
        .and_then(|s| s.get("tls"))
        .is_some_and(|tls| !tls.is_null());

    Ok(ListenerAddress {
        has_tls,
        host: host.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn route(data: Value) -> DynamicObject {
        DynamicObject::new("gitops-webhook-event-listener-route", &route_resource()).data(data)
    }

    #[test]
    fn reads_tls_route() {
        let obj = route(json!({
            "spec": {
                "host": "listener.apps.example.com",
                "tls": { "termination": "edge" },
                "to": { "kind": "Service", "name": "el-cicd-event-listener" }
            }
        }));
        assert_eq!(
            listener_address(&obj).unwrap(),
            ListenerAddress {
                has_tls: true,
                host: "listener.apps.example.com".to_string(),
            }
        );
    }

    #[test]
    fn route_without_tls_is_plain() {
        let obj = route(json!({ "spec": { "host": "listener.example.com", "tls": null } }));
        assert!(!listener_address(&obj).unwrap().has_tls);
    }

    #[test]
    fn route_without_host_is_an_error() {
        let obj = route(json!({ "spec": { "tls": {} } }));
        assert!(matches!(
            listener_address(&obj),
            Err(ClusterError::MissingField { field: "spec.host", .. })
        ));
    }

    #[test]
    fn resource_targets_openshift_routes() {
        let ar = route_resource();
        assert_eq!(ar.group, "route.openshift.io");
        assert_eq!(ar.plural, "routes");
    }
}
