use std::collections::HashSet;

use actix_web::{dev::ResourceDef, http::Method};

use crate::models::domain::Role;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoutePolicy {
    /// No credential is extracted at all.
    Public,
    /// A token or a license is enough.
    Authenticated,
    /// Only token identities whose role is in the set.
    Roles(Vec<Role>),
}

impl RoutePolicy {
    pub fn roles(roles: &[Role]) -> Self {
        RoutePolicy::Roles(roles.to_vec())
    }
}

static PUBLIC: RoutePolicy = RoutePolicy::Public;

struct PolicyRule {
    method: Method,
    pattern: ResourceDef,
    policy: RoutePolicy,
}

/// Route policies declared at startup.
///
/// Public paths match by exact equality only. Other rules match method and
/// path template in registration order; unmatched paths are `Authenticated`.
pub struct PolicyRegistry {
    public: HashSet<String>,
    rules: Vec<PolicyRule>,
    fallback: RoutePolicy,
}

impl PolicyRegistry {
    pub fn new() -> Self {
        Self {
            public: HashSet::new(),
            rules: Vec::new(),
            fallback: RoutePolicy::Authenticated,
        }
    }

    pub fn allow_public(&mut self, path: &str) -> &mut Self {
        self.public.insert(path.to_string());
        self
    }

    pub fn register(&mut self, method: Method, pattern: &str, policy: RoutePolicy) -> &mut Self {
        self.rules.push(PolicyRule {
            method,
            pattern: ResourceDef::new(pattern),
            policy,
        });
        self
    }

    pub fn resolve(&self, method: &Method, path: &str) -> &RoutePolicy {
        if self.public.contains(path) {
            return &PUBLIC;
        }

        self.rules
            .iter()
            .find(|rule| rule.method == *method && rule.pattern.is_match(path))
            .map(|rule| &rule.policy)
            .unwrap_or(&self.fallback)
    }
}

impl Default for PolicyRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> PolicyRegistry {
        let mut registry = PolicyRegistry::new();
        registry
            .allow_public("/health")
            .register(
                Method::GET,
                "/api/categorias",
                RoutePolicy::roles(&[Role::Admin, Role::Profesor]),
            )
            .register(
                Method::GET,
                "/api/categorias/{id}",
                RoutePolicy::roles(&[Role::Admin, Role::Profesor]),
            )
            .register(
                Method::DELETE,
                "/api/categorias/{id}",
                RoutePolicy::roles(&[Role::Admin]),
            );
        registry
    }

    #[test]
    fn test_public_matching_is_exact() {
        let registry = registry();
        assert_eq!(registry.resolve(&Method::GET, "/health"), &RoutePolicy::Public);
        assert_eq!(
            registry.resolve(&Method::GET, "/health/extra"),
            &RoutePolicy::Authenticated
        );
        assert_eq!(
            registry.resolve(&Method::GET, "/health/"),
            &RoutePolicy::Authenticated
        );
    }

    #[test]
    fn test_rules_match_method_and_template() {
        let registry = registry();
        assert_eq!(
            registry.resolve(&Method::GET, "/api/categorias/65a1b2c3d4e5f60718293a4b"),
            &RoutePolicy::Roles(vec![Role::Admin, Role::Profesor])
        );
        assert_eq!(
            registry.resolve(&Method::DELETE, "/api/categorias/65a1b2c3d4e5f60718293a4b"),
            &RoutePolicy::Roles(vec![Role::Admin])
        );
    }

    #[test]
    fn test_unmatched_routes_require_authentication() {
        let registry = registry();
        assert_eq!(
            registry.resolve(&Method::POST, "/api/categorias/x/y"),
            &RoutePolicy::Authenticated
        );
        assert_eq!(
            registry.resolve(&Method::GET, "/no/such/route"),
            &RoutePolicy::Authenticated
        );
    }
}
