//! Identity-store API payloads.

use std::collections::HashMap;

use opsdesk_core::{AttributeCatalog, IdentityUserId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Standard `{ "data": [...] }` envelope used by every list endpoint.
#[derive(Debug, Deserialize)]
pub(crate) struct DataEnvelope<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}

/// A user record as returned by `GET /users`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct IdentityUser {
    /// Store-assigned user id.
    pub id: IdentityUserId,
    /// Custom attribute values keyed by canonical attribute name.
    #[serde(default)]
    pub custom_attributes: Option<HashMap<String, Value>>,
}

impl IdentityUser {
    /// The value of a custom attribute as a string.
    ///
    /// Returns `None` when the attribute is absent or `null`. Non-string
    /// values are rendered as JSON text.
    #[must_use]
    pub fn custom_attribute(&self, name: &str) -> Option<String> {
        match self.custom_attributes.as_ref()?.get(name)? {
            Value::Null => None,
            Value::String(value) => Some(value.clone()),
            other => Some(other.to_string()),
        }
    }
}

/// Body of `PUT /users/<id>`.
#[derive(Debug, Serialize)]
pub(crate) struct UpdateUserRequest<'a> {
    pub custom_attributes: HashMap<&'a str, &'a str>,
}

/// Extract the catalog from the first element of a catalog response.
///
/// The store has returned the names both as the keys of an object and as an
/// array of strings; both layouts are accepted.
pub(crate) fn catalog_from_entry(entry: &Value) -> Result<AttributeCatalog, String> {
    match entry {
        Value::Object(map) => Ok(AttributeCatalog::new(map.keys().cloned().collect())),
        Value::Array(items) => items
            .iter()
            .map(|item| {
                item.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| format!("attribute name is not a string: {item}"))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(AttributeCatalog::new),
        other => Err(format!("unexpected catalog entry: {other}")),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_catalog_from_array_entry() {
        let catalog = catalog_from_entry(&json!(["custom_attribute", "badge"])).unwrap();
        assert_eq!(catalog.names(), ["custom_attribute", "badge"]);
    }

    #[test]
    fn test_catalog_from_object_entry() {
        let catalog = catalog_from_entry(&json!({"custom_attribute": null})).unwrap();
        assert_eq!(catalog.resolve("Custom Attribute"), Some("custom_attribute"));
    }

    #[test]
    fn test_catalog_rejects_non_string_names() {
        assert!(catalog_from_entry(&json!(["ok", 3])).is_err());
        assert!(catalog_from_entry(&json!("custom_attribute")).is_err());
    }

    #[test]
    fn test_user_deserialize_and_attribute_lookup() {
        let envelope: DataEnvelope<IdentityUser> = serde_json::from_value(json!({
            "status": {"error": false, "code": 200},
            "data": [{
                "id": 31_416_592,
                "email": "alice@example.com",
                "custom_attributes": {
                    "custom_attribute": "a;b;c;",
                    "badge": null,
                    "floor": 3
                }
            }]
        }))
        .unwrap();

        let user = envelope.data.first().unwrap();
        assert_eq!(user.id, IdentityUserId::new("31416592"));
        assert_eq!(user.custom_attribute("custom_attribute").as_deref(), Some("a;b;c;"));
        assert_eq!(user.custom_attribute("badge"), None);
        assert_eq!(user.custom_attribute("missing"), None);
        assert_eq!(user.custom_attribute("floor").as_deref(), Some("3"));
    }

    #[test]
    fn test_user_with_string_id() {
        let envelope: DataEnvelope<IdentityUser> = serde_json::from_value(json!({
            "data": [{"id": "00u1abcd", "custom_attributes": {"custom_attribute": "a;b;c;"}}]
        }))
        .unwrap();

        let user = envelope.data.first().unwrap();
        assert_eq!(user.id, IdentityUserId::new("00u1abcd"));
        assert_eq!(user.custom_attribute("custom_attribute").as_deref(), Some("a;b;c;"));
    }

    #[test]
    fn test_user_with_null_custom_attributes() {
        let user: IdentityUser =
            serde_json::from_value(json!({"id": 7, "custom_attributes": null})).unwrap();
        assert_eq!(user.custom_attribute("custom_attribute"), None);
    }

    #[test]
    fn test_envelope_without_data() {
        let envelope: DataEnvelope<IdentityUser> =
            serde_json::from_value(json!({"status": {"code": 200}})).unwrap();
        assert!(envelope.data.is_empty());
    }

    #[test]
    fn test_update_request_shape() {
        let body = UpdateUserRequest {
            custom_attributes: HashMap::from([("custom_attribute", "a;c;")]),
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({"custom_attributes": {"custom_attribute": "a;c;"}})
        );
    }
}
