//! Account profile types.

use std::fmt;
use std::hash::{Hash, Hasher};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Server-assigned user identifier.
///
/// The API emits numeric ids; string ids are accepted as well. Either way the
/// id is written back exactly as it arrived. Equality ignores the wire form.
#[derive(Clone, Debug)]
pub struct UserId {
    raw: String,
    numeric: bool,
}

impl UserId {
    /// A string id.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            raw: id.into(),
            numeric: false,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl From<u64> for UserId {
    fn from(id: u64) -> Self {
        Self {
            raw: id.to_string(),
            numeric: true,
        }
    }
}

impl PartialEq for UserId {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl Eq for UserId {}

impl Hash for UserId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.raw.hash(state);
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl Serialize for UserId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.raw.parse::<u64>() {
            Ok(n) if self.numeric => serializer.serialize_u64(n),
            _ => serializer.serialize_str(&self.raw),
        }
    }
}

impl<'de> Deserialize<'de> for UserId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u64),
            Text(String),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Number(n) => UserId::from(n),
            Raw::Text(s) => UserId::new(s),
        })
    }
}

/// Account role.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[serde(alias = "CUSTOMER")]
    Customer,
    #[serde(alias = "ADMIN")]
    Admin,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Customer => f.write_str("customer"),
            Role::Admin => f.write_str("admin"),
        }
    }
}

/// The authenticated user's profile as returned by the API.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub name: String,
    pub role: Role,
    #[serde(rename = "avatar", default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_profile_with_string_id_and_uppercase_role() {
        let user: User = serde_json::from_value(json!({
            "id": "1",
            "email": "a@b.com",
            "name": "A",
            "role": "CUSTOMER"
        }))
        .unwrap();
        assert_eq!(user.id.as_str(), "1");
        assert_eq!(user.role, Role::Customer);
        assert!(user.avatar_url.is_none());
    }

    #[test]
    fn parses_full_api_profile() {
        let user: User = serde_json::from_value(json!({
            "id": 7,
            "email": "test@example.com",
            "password": "ignored",
            "name": "Test User",
            "role": "admin",
            "avatar": "https://example.com/avatar.jpg",
            "creationAt": "2025-01-02T03:04:05.000Z",
            "updatedAt": "2025-01-02T03:04:05.000Z"
        }))
        .unwrap();
        assert_eq!(user.id, UserId::new("7"));
        assert_eq!(user.role, Role::Admin);
        assert_eq!(
            user.avatar_url.as_deref(),
            Some("https://example.com/avatar.jpg")
        );
        assert!(user.creation_at.is_some());
    }

    #[test]
    fn id_keeps_its_wire_form() {
        for raw in [json!(42), json!("42"), json!("007"), json!("u-42")] {
            let id: UserId = serde_json::from_value(raw.clone()).unwrap();
            assert_eq!(serde_json::to_value(&id).unwrap(), raw);
        }
        assert_eq!(UserId::from(42), UserId::new("42"));
    }

    #[test]
    fn rejects_unknown_role() {
        let result = serde_json::from_value::<User>(json!({
            "id": 1, "email": "a@b.com", "name": "A", "role": "root"
        }));
        assert!(result.is_err());
    }
}
