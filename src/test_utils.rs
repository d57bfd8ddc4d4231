#[cfg(test)]
pub mod fixtures {
    use std::sync::Arc;

    use crate::{
        app_state::AppState,
        auth::{Identity, JwtService},
        config::Config,
        models::domain::Role,
        modules::ModuleRegistry,
    };

    /// State with no database; every module is a stand-in.
    pub fn offline_state(config: Config) -> AppState {
        let jwt = Arc::new(test_jwt(&config));
        AppState::assemble(
            config,
            None,
            jwt,
            ModuleRegistry::unavailable("base de datos no disponible"),
        )
    }

    pub fn test_jwt(config: &Config) -> JwtService {
        JwtService::new(&config.jwt_secret, config.jwt_expiration_hours)
    }

    pub fn identity(email: &str, role: Role) -> Identity {
        Identity {
            id: mongodb::bson::oid::ObjectId::new().to_hex(),
            email: email.to_string(),
            role,
        }
    }

    /// Signed token for `role`, valid under `Config::test_config()`.
    pub fn token_for(role: Role) -> String {
        let config = Config::test_config();
        test_jwt(&config)
            .create_token(&identity(&format!("{}@example.com", role), role))
            .unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use crate::{auth::TokenVerifier, config::Config, models::domain::Role};

    #[tokio::test]
    async fn test_token_fixture_verifies() {
        let claims = test_jwt(&Config::test_config())
            .verify(&token_for(Role::Admin))
            .await
            .unwrap();

        assert_eq!(claims.email, "admin@example.com");
        assert_eq!(claims.role, Role::Admin);
    }
}
