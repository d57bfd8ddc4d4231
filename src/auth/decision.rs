use std::fmt;

use serde::Serialize;

use crate::{auth::license::fingerprint, models::domain::Role};

/// Principal taken from a verified token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub id: String,
    pub email: String,
    pub role: Role,
}

/// Access granted by a license key. Carries no identity and no role.
#[derive(Clone, PartialEq, Eq)]
pub struct LicenseGrant {
    key: String,
}

impl LicenseGrant {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn fingerprint(&self) -> String {
        fingerprint(&self.key)
    }
}

impl fmt::Debug for LicenseGrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LicenseGrant")
            .field("fingerprint", &self.fingerprint())
            .finish()
    }
}

/// Outcome of a granted request, stored in the request extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthDecision {
    Public,
    Token(Identity),
    License(LicenseGrant),
}

impl AuthDecision {
    pub fn method(&self) -> &'static str {
        match self {
            AuthDecision::Public => "none",
            AuthDecision::Token(_) => "token",
            AuthDecision::License(_) => "license",
        }
    }

    pub fn identity(&self) -> Option<&Identity> {
        match self {
            AuthDecision::Token(identity) => Some(identity),
            _ => None,
        }
    }

    /// Who to name in logs: an email, a license fingerprint, or "anonymous".
    pub fn principal(&self) -> String {
        match self {
            AuthDecision::Public => "anonymous".to_string(),
            AuthDecision::Token(identity) => identity.email.clone(),
            AuthDecision::License(grant) => format!("license:{}", grant.fingerprint()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_methods() {
        let identity = Identity {
            id: "1".to_string(),
            email: "admin@example.com".to_string(),
            role: Role::Admin,
        };

        assert_eq!(AuthDecision::Public.method(), "none");
        assert_eq!(AuthDecision::Token(identity.clone()).method(), "token");
        assert_eq!(
            AuthDecision::License(LicenseGrant::new("KEY")).method(),
            "license"
        );
        assert_eq!(
            AuthDecision::Token(identity.clone()).identity(),
            Some(&identity)
        );
        assert_eq!(AuthDecision::License(LicenseGrant::new("KEY")).identity(), None);
    }

    #[test]
    fn test_license_grant_debug_hides_key() {
        let grant = LicenseGrant::new("LICENCIA_1_ACTIVA_2024_XYZ123");
        assert_eq!(grant.key(), "LICENCIA_1_ACTIVA_2024_XYZ123");

        let rendered = format!("{:?}", AuthDecision::License(grant.clone()));
        assert!(!rendered.contains("LICENCIA_1"));
        assert!(AuthDecision::License(grant).principal().starts_with("license:"));
    }
}
