//! Webhook secret value extraction.

use k8s_openapi::api::core::v1::Secret;
use pipelines::ClusterError;

/// Returns the UTF-8 value stored under `key`.
///
/// `data` is consulted first; `stringData` is accepted for secrets that were
/// read back before the API server merged it.
pub fn secret_value(secret: &Secret, key: &str) -> Result<String, ClusterError> {
    let name = || secret.metadata.name.clone().unwrap_or_default();

    if let Some(bytes) = secret.data.as_ref().and_then(|d| d.get(key)) {
        return String::from_utf8(bytes.0.clone()).map_err(|_| ClusterError::InvalidEncoding {
            secret: name(),
            key: key.to_string(),
        });
    }

    secret
        .string_data
        .as_ref()
        .and_then(|d| d.get(key))
        .cloned()
        .ok_or_else(|| ClusterError::MissingKey {
            secret: name(),
            key: key.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
    use k8s_openapi::ByteString;
    use pipelines::secrets::WEBHOOK_SECRET_KEY;

    use super::*;

    fn secret(data: &[(&str, &[u8])]) -> Secret {
        Secret {
            metadata: ObjectMeta {
                name: Some("gitops-webhook-secret".to_string()),
                ..ObjectMeta::default()
            },
            data: Some(
                data.iter()
                    .map(|(k, v)| (k.to_string(), ByteString(v.to_vec())))
                    .collect(),
            ),
            ..Secret::default()
        }
    }

    #[test]
    fn reads_value_from_data() {
        let s = secret(&[(WEBHOOK_SECRET_KEY, b"s3cr3t".as_slice())]);
        assert_eq!(secret_value(&s, WEBHOOK_SECRET_KEY).unwrap(), "s3cr3t");
    }

    #[test]
    fn falls_back_to_string_data() {
        let mut s = secret(&[]);
        s.string_data = Some(BTreeMap::from([(
            WEBHOOK_SECRET_KEY.to_string(),
            "plain".to_string(),
        )]));
        assert_eq!(secret_value(&s, WEBHOOK_SECRET_KEY).unwrap(), "plain");
    }

    #[test]
    fn missing_key_names_the_secret() {
        let s = secret(&[("other", b"x".as_slice())]);
        match secret_value(&s, WEBHOOK_SECRET_KEY) {
            Err(ClusterError::MissingKey { secret, key }) => {
                assert_eq!(secret, "gitops-webhook-secret");
                assert_eq!(key, WEBHOOK_SECRET_KEY);
            }
            other => panic!("expected MissingKey, got {other:?}"),
        }
    }

    #[test]
    fn non_utf8_value_is_rejected() {
        let s = secret(&[(WEBHOOK_SECRET_KEY, [0xffu8, 0xfe].as_slice())]);
        assert!(matches!(
            secret_value(&s, WEBHOOK_SECRET_KEY),
            Err(ClusterError::InvalidEncoding { .. })
        ));
    }
}
