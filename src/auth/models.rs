//! Authentication models

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Identity record returned by the provider for an authenticated user.
///
/// Only `id`, `username` and `email` are typed; every other attribute the
/// provider sends (`collectionId`, `verified`, custom fields...) is kept in
/// `extra` so the record round-trips unchanged through cookies and storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthRecord {
    pub id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub username: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub email: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AuthRecord {
    pub fn new(id: impl Into<String>, username: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
            email: email.into(),
            extra: Map::new(),
        }
    }

    /// Look up an attribute that is not one of the typed fields
    pub fn attr(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }

    /// Reduced copy carrying only the fields needed to identify the user.
    /// Used when the full record does not fit in a cookie.
    pub fn minimal(&self) -> Self {
        let mut extra = Map::new();
        for key in ["collectionId", "collectionName", "verified"] {
            if let Some(value) = self.extra.get(key) {
                extra.insert(key.to_string(), value.clone());
            }
        }
        Self {
            id: self.id.clone(),
            username: String::new(),
            email: self.email.clone(),
            extra,
        }
    }
}

/// Current token store contents. An empty token means anonymous.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthSnapshot {
    #[serde(default)]
    pub token: String,
    #[serde(default, alias = "model")]
    pub record: Option<AuthRecord>,
}

impl AuthSnapshot {
    pub fn new(token: impl Into<String>, record: Option<AuthRecord>) -> Self {
        Self {
            token: token.into(),
            record,
        }
    }

    pub fn has_token(&self) -> bool {
        !self.token.is_empty()
    }
}

/// Successful auth response from the provider (`auth-with-password`, `auth-refresh`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub record: AuthRecord,
}

/// Login credentials
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub identity: String,
    pub password: String,
}

/// Account creation payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub password_confirm: String,
}

/// Error body returned by the provider on a rejected request
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProviderErrorBody {
    #[serde(default)]
    pub status: u16,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub data: Value,
}

/// User information in API responses
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    pub user: Option<AuthRecord>,
    pub is_authenticated: bool,
}

impl From<Option<AuthRecord>> for SessionInfo {
    fn from(user: Option<AuthRecord>) -> Self {
        Self {
            is_authenticated: user.is_some(),
            user,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_keeps_extra_fields() {
        let record: AuthRecord = serde_json::from_str(
            r#"{"id":"u1","username":"ada","email":"ada@example.com","verified":true,"collectionName":"smlt_users"}"#,
        )
        .unwrap();

        assert_eq!(record.username, "ada");
        assert_eq!(record.attr("verified"), Some(&Value::Bool(true)));

        let back = serde_json::to_value(&record).unwrap();
        assert_eq!(back["collectionName"], "smlt_users");
    }

    #[test]
    fn test_snapshot_accepts_legacy_model_key() {
        let snapshot: AuthSnapshot =
            serde_json::from_str(r#"{"token":"abc","model":{"id":"u1","username":"ada","email":""}}"#)
                .unwrap();
        assert!(snapshot.has_token());
        assert_eq!(snapshot.record.unwrap().id, "u1");
    }

    #[test]
    fn test_minimal_record_drops_profile_fields() {
        let mut record = AuthRecord::new("u1", "ada", "ada@example.com");
        record.extra.insert("avatar".to_string(), Value::String("x".repeat(100)));
        record.extra.insert("verified".to_string(), Value::Bool(false));

        let minimal = record.minimal();
        assert_eq!(minimal.id, "u1");
        assert_eq!(minimal.email, "ada@example.com");
        assert!(minimal.attr("avatar").is_none());
        assert_eq!(minimal.attr("verified"), Some(&Value::Bool(false)));
    }

    #[test]
    fn test_register_request_uses_camel_case() {
        let req = RegisterRequest {
            username: "ada".to_string(),
            email: "ada@example.com".to_string(),
            password: "secret123".to_string(),
            password_confirm: "secret123".to_string(),
        };
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["passwordConfirm"], "secret123");
    }
}
