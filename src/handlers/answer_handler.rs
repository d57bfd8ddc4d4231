use std::sync::Arc;

use actix_web::{web, HttpResponse};
use serde_json::Value;

use crate::{
    auth::RequestAuth,
    errors::AppError,
    models::{
        domain::catalog::record_to_json,
        dto::{request::AnswerHistoryParams, response::ApiResponse},
    },
    services::AnswerService,
};

pub const ANSWERS_PATH: &str = "/api/preguntas/{pregunta_id}/respuestas";
pub const HISTORY_PATH: &str = "/api/preguntas/respuestas/historial";

/// Registers the answer routes. Must be mounted before the questions scope,
/// which would otherwise swallow these paths.
pub fn configure(cfg: &mut web::ServiceConfig, service: Arc<AnswerService>) {
    cfg.app_data(web::Data::from(service))
        .service(web::resource(HISTORY_PATH).route(web::get().to(history)))
        .service(
            web::resource(ANSWERS_PATH)
                .route(web::post().to(register))
                .route(web::get().to(list_for_question)),
        );
}

async fn register(
    service: web::Data<AnswerService>,
    auth: RequestAuth,
    pregunta_id: web::Path<String>,
    body: web::Json<Value>,
) -> Result<HttpResponse, AppError> {
    let answer = service
        .register(&pregunta_id, body.into_inner(), &auth.0.principal())
        .await?;

    Ok(HttpResponse::Created().json(ApiResponse::with_message(
        "Respuesta registrada exitosamente",
        record_to_json(answer),
    )))
}

async fn list_for_question(
    service: web::Data<AnswerService>,
    pregunta_id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let answers = service.list_for_question(&pregunta_id).await?;
    let data = answers.into_iter().map(record_to_json).collect();
    Ok(HttpResponse::Ok().json(ApiResponse::list(data)))
}

async fn history(
    service: web::Data<AnswerService>,
    query: web::Query<AnswerHistoryParams>,
) -> Result<HttpResponse, AppError> {
    let answers = service.history(query.pregunta.as_deref()).await?;
    let data = answers.into_iter().map(record_to_json).collect();
    Ok(HttpResponse::Ok().json(ApiResponse::list(data)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        auth::{AuthDecision, LicenseGrant},
        repositories::catalog_repository::MockCatalogRepository,
    };
    use actix_web::{dev::Service, http::StatusCode, test, App, HttpMessage};
    use mongodb::bson::{doc, oid::ObjectId};
    use serde_json::json;

    #[actix_web::test]
    async fn test_register_scores_and_records_principal() {
        let question = ObjectId::new();
        let mut questions = MockCatalogRepository::new();
        questions
            .expect_find_by_id()
            .returning(|id| Ok(Some(doc! { "_id": *id, "respuestaCorrecta": 2 })));
        let mut answers = MockCatalogRepository::new();
        answers.expect_create().returning(|mut record| {
            record.insert("_id", ObjectId::new());
            Ok(record)
        });
        let service = Arc::new(AnswerService::new(Arc::new(questions), Arc::new(answers)));

        let app = test::init_service(
            App::new()
                .wrap_fn(|req, srv| {
                    req.extensions_mut().insert(AuthDecision::License(LicenseGrant::new(
                        "LICENCIA_1_ACTIVA_2024_XYZ123",
                    )));
                    srv.call(req)
                })
                .configure(|cfg| configure(cfg, service)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri(&format!("/api/preguntas/{}/respuestas", question.to_hex()))
            .set_json(json!({ "respuestaSeleccionada": 2 }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["data"]["esCorrecta"], true);
        assert_eq!(body["data"]["calificacion"], 1);
        assert_eq!(body["data"]["pregunta"], question.to_hex());
        assert!(body["data"]["respondidoPor"]
            .as_str()
            .unwrap()
            .starts_with("license:"));
    }

    #[actix_web::test]
    async fn test_history_path_is_not_a_question_id() {
        let mut answers = MockCatalogRepository::new();
        answers
            .expect_list()
            .withf(|filter| filter.is_empty())
            .returning(|_| Ok(vec![]));
        let service = Arc::new(AnswerService::new(
            Arc::new(MockCatalogRepository::new()),
            Arc::new(answers),
        ));

        let app =
            test::init_service(App::new().configure(|cfg| configure(cfg, service))).await;
        let req = test::TestRequest::get().uri(HISTORY_PATH).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["count"], 0);
    }
}
