use actix_web::{get, web, HttpResponse};
use serde_json::json;

use crate::{app_state::AppState, db::Database, models::domain::catalog::CATALOG_RESOURCES};

const SERVICE_NAME: &str = "API Cuestionario";

#[get("/")]
pub async fn index(state: web::Data<AppState>) -> HttpResponse {
    let catalogs: serde_json::Map<String, serde_json::Value> = CATALOG_RESOURCES
        .iter()
        .map(|spec| (spec.name.to_string(), json!(spec.path)))
        .collect();
    let database = Database::status(state.db.as_ref()).await;

    HttpResponse::Ok().json(json!({
        "success": true,
        "message": SERVICE_NAME,
        "version": env!("CARGO_PKG_VERSION"),
        "database": database,
        "endpoints": {
            "auth": ["/auth/register", "/auth/login"],
            "catalogos": catalogs,
            "respuestas": [
                "/api/preguntas/{pregunta_id}/respuestas",
                "/api/preguntas/respuestas/historial",
            ],
            "health": "/health",
            "debug": "/api/debug",
        },
    }))
}

#[get("/health")]
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[get("/api/debug")]
pub async fn debug(state: web::Data<AppState>) -> HttpResponse {
    let modules: serde_json::Map<String, serde_json::Value> = state
        .modules
        .unavailable_reasons()
        .into_iter()
        .map(|(name, reason)| {
            let status = match reason {
                None => json!({ "disponible": true }),
                Some(reason) => json!({ "disponible": false, "motivo": reason }),
            };
            (name.to_string(), status)
        })
        .collect();
    let database = Database::status(state.db.as_ref()).await;

    HttpResponse::Ok().json(json!({
        "success": true,
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "environment": state.config.app_env,
        "database": database,
        "modules": modules,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::Config, test_utils::fixtures::offline_state};
    use actix_web::{http::StatusCode, test, App};

    #[actix_web::test]
    async fn test_health_check() {
        let app = test::init_service(App::new().service(health_check)).await;

        let req = test::TestRequest::get().uri("/health").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }

    #[actix_web::test]
    async fn test_debug_reports_modules_without_database() {
        let state = offline_state(Config::test_config());
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .service(debug)
                .service(index),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/debug").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["database"], "desconectada");
        assert_eq!(body["modules"]["categorias"]["disponible"], false);

        let req = test::TestRequest::get().uri("/").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["endpoints"]["catalogos"]["rangos-edad"], "/api/rangos-edad");
    }
}
