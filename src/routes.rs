use actix_web::{http::Method, web};

use crate::{
    app_state::AppState,
    auth::{PolicyRegistry, RoutePolicy},
    errors::AppError,
    handlers::{self, answer_handler, catalog_handler},
    models::domain::{
        catalog::{CatalogAccess, ResourceSpec, CATALOG_RESOURCES},
        Role,
    },
    modules::{self, Mounted, ANSWERS_MODULE, AUTH_MODULE},
};

pub const PUBLIC_PATHS: [&str; 5] = ["/", "/health", "/api/debug", "/auth/register", "/auth/login"];

const STAFF: [Role; 2] = [Role::Admin, Role::Profesor];
const ADMIN: [Role; 1] = [Role::Admin];

/// Route policies for every mounted path. Availability of a module never
/// changes its entries here.
pub fn policies() -> PolicyRegistry {
    let mut registry = PolicyRegistry::new();
    for path in PUBLIC_PATHS {
        registry.allow_public(path);
    }

    registry
        .register(Method::GET, answer_handler::HISTORY_PATH, RoutePolicy::Authenticated)
        .register(Method::GET, answer_handler::ANSWERS_PATH, RoutePolicy::Authenticated)
        .register(Method::POST, answer_handler::ANSWERS_PATH, RoutePolicy::Authenticated);

    for spec in CATALOG_RESOURCES {
        register_catalog(&mut registry, spec);
    }
    registry
}

fn register_catalog(registry: &mut PolicyRegistry, spec: &ResourceSpec) {
    let (read, write) = match spec.access {
        CatalogAccess::StaffOnly => (RoutePolicy::roles(&STAFF), RoutePolicy::roles(&ADMIN)),
        CatalogAccess::AnyCredential => (RoutePolicy::Authenticated, RoutePolicy::Authenticated),
    };
    let item = format!("{}/{{id}}", spec.path);

    registry.register(Method::GET, spec.path, read.clone());
    if spec.active_listing {
        registry.register(Method::GET, &format!("{}/activas", spec.path), read.clone());
    }
    registry
        .register(Method::GET, &item, read)
        .register(Method::POST, spec.path, write.clone())
        .register(Method::PUT, &item, write.clone())
        .register(Method::DELETE, &item, write.clone())
        .register(Method::PATCH, &format!("{}/toggle", item), write);
}

/// Mounts handlers, or 503 stand-ins for modules that are not available.
pub fn configure(cfg: &mut web::ServiceConfig, state: &AppState) {
    cfg.app_data(json_config())
        .service(handlers::index)
        .service(handlers::health_check)
        .service(handlers::debug);

    match &state.modules.auth {
        Mounted::Ready(service) => {
            cfg.app_data(web::Data::from(service.clone()))
                .service(handlers::register)
                .service(handlers::login);
        }
        Mounted::Unavailable { .. } => {
            cfg.service(modules::stand_in_scope("/auth", AUTH_MODULE));
        }
    }

    // Answer paths live under /api/preguntas and must come before that scope.
    match &state.modules.answers {
        Mounted::Ready(service) => answer_handler::configure(cfg, service.clone()),
        Mounted::Unavailable { .. } => {
            cfg.service(
                web::resource(answer_handler::HISTORY_PATH)
                    .route(modules::stand_in(ANSWERS_MODULE)),
            )
            .service(
                web::resource(answer_handler::ANSWERS_PATH)
                    .route(modules::stand_in(ANSWERS_MODULE)),
            );
        }
    }

    for (spec, mounted) in &state.modules.catalogs {
        match mounted {
            Mounted::Ready(service) => {
                cfg.service(catalog_handler::scope(service.clone()));
            }
            Mounted::Unavailable { .. } => {
                cfg.service(modules::stand_in_scope(spec.path, spec.name));
            }
        }
    }
}

fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        AppError::ValidationError(format!("JSON inválido: {}", err)).into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        auth::AuthMiddleware,
        config::Config,
        test_utils::fixtures::{offline_state, token_for},
    };
    use actix_web::{http::StatusCode, test, App};
    use serde_json::Value;

    #[actix_web::test]
    async fn test_stand_ins_sit_behind_the_gate() {
        let state = offline_state(Config::test_config());
        let app = test::init_service(
            App::new()
                .wrap(AuthMiddleware::new(state.gate.clone(), state.policies.clone()))
                .app_data(web::Data::new(state.clone()))
                .configure(|cfg| configure(cfg, &state)),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/categorias").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let req = test::TestRequest::get()
            .uri("/api/categorias")
            .insert_header(("x-licencia", "LICENCIA_1_ACTIVA_2024_XYZ123"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        let req = test::TestRequest::get()
            .uri("/api/categorias")
            .insert_header(("Authorization", format!("Bearer {}", token_for(Role::Admin))))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "categorias no disponible");

        let req = test::TestRequest::post()
            .uri("/api/preguntas/abc/respuestas")
            .insert_header(("x-licencia", "LICENCIA_2_ACTIVA_2024_ABC456"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[actix_web::test]
    async fn test_percent_encoded_paths_resolve_to_the_same_policy() {
        let state = offline_state(Config::test_config());
        let app = test::init_service(
            App::new()
                .wrap(AuthMiddleware::new(state.gate.clone(), state.policies.clone()))
                .app_data(web::Data::new(state.clone()))
                .configure(|cfg| configure(cfg, &state)),
        )
        .await;

        for uri in ["/api/%63ategorias", "/api/categori%61s/activas"] {
            let req = test::TestRequest::get()
                .uri(uri)
                .insert_header(("x-licencia", "LICENCIA_1_ACTIVA_2024_XYZ123"))
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::FORBIDDEN, "{}", uri);
            let body: Value = test::read_body_json(resp).await;
            assert_eq!(body["reason"], "role_required_but_license_used");
        }

        let req = test::TestRequest::get().uri("/healt%68").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn test_public_routes_without_database() {
        let state = offline_state(Config::test_config());
        let app = test::init_service(
            App::new()
                .wrap(AuthMiddleware::new(state.gate.clone(), state.policies.clone()))
                .app_data(web::Data::new(state.clone()))
                .configure(|cfg| configure(cfg, &state)),
        )
        .await;

        let req = test::TestRequest::get().uri("/health").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        let req = test::TestRequest::post()
            .uri("/auth/login")
            .set_json(serde_json::json!({ "email": "a@b.com", "password": "x" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "auth no disponible");
    }

    #[actix_web::test]
    async fn test_public_paths_are_exact() {
        let registry = policies();
        assert_eq!(registry.resolve(&Method::GET, "/"), &RoutePolicy::Public);
        assert_eq!(
            registry.resolve(&Method::POST, "/auth/login"),
            &RoutePolicy::Public
        );
        assert_eq!(
            registry.resolve(&Method::GET, "/health/extra"),
            &RoutePolicy::Authenticated
        );
    }

    #[actix_web::test]
    async fn test_catalog_reads_and_writes() {
        let registry = policies();
        let staff = RoutePolicy::roles(&[Role::Admin, Role::Profesor]);
        let admin = RoutePolicy::roles(&[Role::Admin]);

        assert_eq!(registry.resolve(&Method::GET, "/api/categorias"), &staff);
        assert_eq!(registry.resolve(&Method::GET, "/api/categorias/activas"), &staff);
        assert_eq!(registry.resolve(&Method::GET, "/api/rangos-edad/abc"), &staff);
        assert_eq!(registry.resolve(&Method::POST, "/api/nivel-dificultad"), &admin);
        assert_eq!(registry.resolve(&Method::DELETE, "/api/subcategoria/abc"), &admin);
        assert_eq!(
            registry.resolve(&Method::PATCH, "/api/categorias/abc/toggle"),
            &admin
        );
    }

    #[actix_web::test]
    async fn test_questions_and_answers_need_any_credential() {
        let registry = policies();

        assert_eq!(
            registry.resolve(&Method::POST, "/api/preguntas"),
            &RoutePolicy::Authenticated
        );
        assert_eq!(
            registry.resolve(&Method::POST, "/api/preguntas/abc/respuestas"),
            &RoutePolicy::Authenticated
        );
        assert_eq!(
            registry.resolve(&Method::GET, "/api/preguntas/respuestas/historial"),
            &RoutePolicy::Authenticated
        );
    }
}
