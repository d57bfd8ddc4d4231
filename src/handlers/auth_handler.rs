use actix_web::{post, web, HttpResponse};

use crate::{
    errors::AppError,
    models::dto::{
        request::{LoginRequest, RegisterRequest},
        response::{LoginResponse, RegisterResponse},
    },
    services::UserService,
};

#[post("/auth/register")]
pub async fn register(
    service: web::Data<UserService>,
    request: web::Json<RegisterRequest>,
) -> Result<HttpResponse, AppError> {
    let user = service.register(request.into_inner()).await?;
    Ok(HttpResponse::Created().json(RegisterResponse {
        success: true,
        message: "Usuario registrado".to_string(),
        user,
    }))
}

#[post("/auth/login")]
pub async fn login(
    service: web::Data<UserService>,
    request: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    let (user, token) = service.login(request.into_inner()).await?;
    log::info!("User {} logged in", user.email);
    Ok(HttpResponse::Ok().json(LoginResponse {
        success: true,
        message: "Login correcto".to_string(),
        user,
        token,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        auth::JwtService,
        config::Config,
        models::domain::{Role, User},
        repositories::user_repository::MockUserRepository,
        services::PasswordHasher,
    };
    use actix_web::{http::StatusCode, test, App};
    use serde_json::{json, Value};
    use std::sync::Arc;

    fn user_service(repository: MockUserRepository) -> web::Data<UserService> {
        let config = Config::test_config();
        let jwt = Arc::new(JwtService::new(&config.jwt_secret, config.jwt_expiration_hours));
        web::Data::new(UserService::with_hasher(
            Arc::new(repository),
            jwt,
            PasswordHasher::with_cost(4),
        ))
    }

    #[actix_web::test]
    async fn test_register_returns_created_user() {
        let mut repository = MockUserRepository::new();
        repository.expect_find_by_email().returning(|_| Ok(None));
        repository.expect_create().returning(|mut user| {
            user.id = Some(mongodb::bson::oid::ObjectId::new());
            Ok(user)
        });

        let app = test::init_service(
            App::new()
                .app_data(user_service(repository))
                .service(register),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/auth/register")
            .set_json(json!({ "email": "profe@example.com", "password": "secreto" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["message"], "Usuario registrado");
        assert_eq!(body["user"]["role"], "profesor");
        assert!(body["user"].get("password").is_none());
    }

    #[actix_web::test]
    async fn test_register_conflict() {
        let mut repository = MockUserRepository::new();
        repository
            .expect_find_by_email()
            .returning(|email| Ok(Some(User::test_user(email, Role::Admin))));

        let app = test::init_service(
            App::new()
                .app_data(user_service(repository))
                .service(register),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/auth/register")
            .set_json(json!({ "email": "admin@example.com", "password": "secreto" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);
    }

    #[actix_web::test]
    async fn test_login_unknown_user_is_404() {
        let mut repository = MockUserRepository::new();
        repository.expect_find_by_email().returning(|_| Ok(None));

        let app = test::init_service(
            App::new()
                .app_data(user_service(repository))
                .service(login),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/auth/login")
            .set_json(json!({ "email": "nadie@example.com", "password": "x" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "Usuario no encontrado");
    }
}
