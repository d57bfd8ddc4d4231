use std::sync::Arc;

use actix_web::{web, HttpResponse, Scope};
use serde_json::Value;

use crate::{
    auth::RequestAuth,
    errors::AppError,
    models::{
        domain::catalog::record_to_json,
        dto::{request::ActiveFilterParams, response::ApiResponse},
    },
    services::CatalogService,
};

/// Mounts the CRUD routes of one catalog resource under its path.
pub fn scope(service: Arc<CatalogService>) -> Scope {
    let spec = service.spec();
    let mut scope = web::scope(spec.path)
        .app_data(web::Data::from(service))
        .route("", web::get().to(list))
        .route("", web::post().to(create));

    if spec.active_listing {
        scope = scope.route("/activas", web::get().to(list_active));
    }

    scope
        .route("/{id}", web::get().to(get_one))
        .route("/{id}", web::put().to(update))
        .route("/{id}", web::delete().to(delete))
        .route("/{id}/toggle", web::patch().to(toggle))
}

async fn list(
    service: web::Data<CatalogService>,
    query: web::Query<ActiveFilterParams>,
) -> Result<HttpResponse, AppError> {
    let records = service.list(query.value()).await?;
    let data = records.into_iter().map(record_to_json).collect();
    Ok(HttpResponse::Ok().json(ApiResponse::list(data)))
}

async fn list_active(service: web::Data<CatalogService>) -> Result<HttpResponse, AppError> {
    let records = service.list_active().await?;
    let data = records.into_iter().map(record_to_json).collect();
    Ok(HttpResponse::Ok().json(ApiResponse::list(data)))
}

async fn get_one(
    service: web::Data<CatalogService>,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let record = service.get(&id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::data(record_to_json(record))))
}

async fn create(
    service: web::Data<CatalogService>,
    auth: RequestAuth,
    body: web::Json<Value>,
) -> Result<HttpResponse, AppError> {
    let record = service.create(body.into_inner()).await?;
    let spec = service.spec();
    log::info!("{} created a record in {}", auth.0.principal(), spec.name);

    Ok(HttpResponse::Created().json(ApiResponse::with_message(
        spec.message("cread"),
        record_to_json(record),
    )))
}

async fn update(
    service: web::Data<CatalogService>,
    auth: RequestAuth,
    id: web::Path<String>,
    body: web::Json<Value>,
) -> Result<HttpResponse, AppError> {
    let record = service.update(&id, body.into_inner()).await?;
    let spec = service.spec();
    log::info!("{} updated {}/{}", auth.0.principal(), spec.name, id);

    Ok(HttpResponse::Ok().json(ApiResponse::with_message(
        spec.message("actualizad"),
        record_to_json(record),
    )))
}

async fn delete(
    service: web::Data<CatalogService>,
    auth: RequestAuth,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let record = service.delete(&id).await?;
    let spec = service.spec();
    log::info!("{} deleted {}/{}", auth.0.principal(), spec.name, id);

    Ok(HttpResponse::Ok().json(ApiResponse::with_message(
        spec.message("eliminad"),
        record_to_json(record),
    )))
}

async fn toggle(
    service: web::Data<CatalogService>,
    auth: RequestAuth,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let record = service.toggle(&id).await?;
    let spec = service.spec();
    let participle = if service.is_active(&record) {
        "activad"
    } else {
        "desactivad"
    };
    log::info!(
        "{} set {}/{} {}{}",
        auth.0.principal(),
        spec.name,
        id,
        participle,
        spec.ending
    );

    Ok(HttpResponse::Ok().json(ApiResponse::with_message(
        spec.message(participle),
        record_to_json(record),
    )))
}
