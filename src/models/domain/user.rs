use std::fmt;

use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    #[serde(alias = "teacher")]
    Profesor,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Profesor => "profesor",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stored account. `password` always holds a bcrypt hash.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub role: Role,
    #[serde(rename = "createdAt", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn new(email: &str, password_hash: &str, role: Role) -> Self {
        User {
            id: None,
            email: email.to_string(),
            password: password_hash.to_string(),
            role,
            created_at: Some(Utc::now()),
        }
    }

    pub fn id_hex(&self) -> String {
        self.id.map(|oid| oid.to_hex()).unwrap_or_default()
    }
}

#[cfg(test)]
impl User {
    pub fn test_user(email: &str, role: Role) -> Self {
        let mut user = User::new(email, "$2b$04$not-a-real-hash", role);
        user.id = Some(ObjectId::new());
        user
    }
}
