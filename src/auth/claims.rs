//! Decoded token payload.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Claim set of a verified token.
///
/// The full payload is kept; `permissions` and `sub` are read on demand.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Claims(Map<String, Value>);

impl Claims {
    pub fn new(payload: Map<String, Value>) -> Self {
        Self(payload)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn sub(&self) -> Option<&str> {
        self.0.get("sub").and_then(Value::as_str)
    }

    /// Whether the payload has a `permissions` field at all.
    pub fn has_permissions(&self) -> bool {
        self.0.contains_key("permissions")
    }

    /// Permission strings granted by the token. Non-string entries are skipped.
    pub fn permissions(&self) -> Vec<&str> {
        match self.0.get("permissions") {
            Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).collect(),
            _ => Vec::new(),
        }
    }

    pub fn grants(&self, permission: &str) -> bool {
        self.permissions().contains(&permission)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn claims(value: Value) -> Claims {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_permissions_from_payload() {
        let c = claims(json!({
            "sub": "auth0|barista",
            "permissions": ["get:drinks-detail", "post:drinks", 7]
        }));
        assert_eq!(c.sub(), Some("auth0|barista"));
        assert_eq!(c.permissions(), vec!["get:drinks-detail", "post:drinks"]);
        assert!(c.grants("post:drinks"));
        assert!(!c.grants("delete:drinks"));
    }

    #[test]
    fn test_missing_permissions() {
        let c = claims(json!({"sub": "someone"}));
        assert!(!c.is_empty());
        assert!(!c.has_permissions());
        assert!(c.permissions().is_empty());
    }

    #[test]
    fn test_permissions_not_a_list() {
        let c = claims(json!({"permissions": "post:drinks"}));
        assert!(c.has_permissions());
        assert!(!c.grants("post:drinks"));
    }
}
