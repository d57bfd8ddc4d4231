use std::sync::Arc;

use crate::{
    auth::{Gate, GateOptions, JwtService, PolicyRegistry, StaticLicenseRegistry},
    config::Config,
    db::Database,
    modules::ModuleRegistry,
    routes,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// `None` when the database was unreachable at startup.
    pub db: Option<Database>,
    pub modules: ModuleRegistry,
    pub gate: Arc<Gate>,
    pub policies: Arc<PolicyRegistry>,
}

impl AppState {
    /// Connects to the database and mounts every module. An unreachable
    /// database leaves the server up with stand-ins in place of the modules.
    pub async fn new(config: Config) -> Self {
        let jwt = Arc::new(JwtService::new(
            &config.jwt_secret,
            config.jwt_expiration_hours,
        ));

        let (db, modules) = match Database::connect(&config).await {
            Ok(db) => {
                let modules = ModuleRegistry::connect(&db, &config, Arc::clone(&jwt)).await;
                (Some(db), modules)
            }
            Err(e) => {
                log::error!("Could not connect to MongoDB: {}", e);
                (None, ModuleRegistry::unavailable("base de datos no disponible"))
            }
        };

        Self::assemble(config, db, jwt, modules)
    }

    /// Builds the gate and the policy table around already-mounted modules.
    pub fn assemble(
        config: Config,
        db: Option<Database>,
        jwt: Arc<JwtService>,
        modules: ModuleRegistry,
    ) -> Self {
        let licenses = StaticLicenseRegistry::from_secrets(&config.licenses);
        log::info!("Loaded {} license key(s)", licenses.len());

        let gate = Gate::new(jwt, Arc::new(licenses), GateOptions::from_config(&config));

        Self {
            config: Arc::new(config),
            db,
            modules,
            gate: Arc::new(gate),
            policies: Arc::new(routes::policies()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::fixtures::offline_state;
    use actix_web::http::Method;

    #[test]
    fn test_app_state_is_cloneable() {
        fn assert_clone<T: Clone>() {}
        assert_clone::<AppState>();
    }

    #[test]
    fn test_assembled_state_carries_route_policies() {
        let state = offline_state(Config::test_config());

        assert!(state.db.is_none());
        assert_eq!(
            state.policies.resolve(&Method::GET, "/health"),
            &crate::auth::RoutePolicy::Public
        );
    }
}
