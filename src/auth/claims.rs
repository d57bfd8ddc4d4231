use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::{auth::Identity, models::domain::Role};

/// Token payload. Field names match what existing clients decode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub id: String,
    pub email: String,
    pub role: Role,
    pub exp: usize, // Expiration time (as UTC timestamp)
    pub iat: usize, // Issued at (as UTC timestamp)
}

impl Claims {
    pub fn new(identity: &Identity, expiration_hours: i64) -> Self {
        let now = Utc::now();
        let exp = now + Duration::hours(expiration_hours);

        Self {
            id: identity.id.clone(),
            email: identity.email.clone(),
            role: identity.role,
            iat: now.timestamp() as usize,
            exp: exp.timestamp() as usize,
        }
    }
}

impl From<Claims> for Identity {
    fn from(claims: Claims) -> Self {
        Identity {
            id: claims.id,
            email: claims.email,
            role: claims.role,
        }
    }
}
