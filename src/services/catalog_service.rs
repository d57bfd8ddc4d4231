use std::sync::Arc;

use mongodb::bson::{doc, DateTime, Document};
use serde_json::Value;

use crate::{
    errors::{AppError, AppResult},
    models::domain::catalog::{parse_object_id, record_from_json, ResourceSpec},
    repositories::CatalogRepository,
};

/// CRUD over one catalog resource. Records are schemaless; only the active
/// flag and timestamps are managed here.
pub struct CatalogService {
    spec: &'static ResourceSpec,
    repository: Arc<dyn CatalogRepository>,
}

impl CatalogService {
    pub fn new(spec: &'static ResourceSpec, repository: Arc<dyn CatalogRepository>) -> Self {
        Self { spec, repository }
    }

    pub fn spec(&self) -> &'static ResourceSpec {
        self.spec
    }

    pub async fn list(&self, active: Option<bool>) -> AppResult<Vec<Document>> {
        let mut filter = Document::new();
        if let Some(active) = active {
            filter.insert(self.spec.active_field, active);
        }
        self.repository.list(filter).await
    }

    pub async fn list_active(&self) -> AppResult<Vec<Document>> {
        self.list(Some(true)).await
    }

    pub async fn get(&self, id: &str) -> AppResult<Document> {
        let oid = parse_object_id(id)?;
        self.repository
            .find_by_id(&oid)
            .await?
            .ok_or_else(|| self.not_found())
    }

    pub async fn create(&self, body: Value) -> AppResult<Document> {
        let mut record = record_from_json(body)?;
        if record.is_empty() {
            return Err(AppError::ValidationError(
                "El cuerpo de la petición está vacío".to_string(),
            ));
        }
        if !record.contains_key(self.spec.active_field) {
            record.insert(self.spec.active_field, true);
        }
        record.insert("createdAt", DateTime::now());

        self.repository.create(record).await
    }

    pub async fn update(&self, id: &str, body: Value) -> AppResult<Document> {
        let oid = parse_object_id(id)?;
        let mut changes = record_from_json(body)?;
        if changes.is_empty() {
            return Err(AppError::ValidationError(
                "No hay campos para actualizar".to_string(),
            ));
        }
        changes.insert("updatedAt", DateTime::now());

        self.repository
            .update(&oid, changes)
            .await?
            .ok_or_else(|| self.not_found())
    }

    pub async fn delete(&self, id: &str) -> AppResult<Document> {
        let oid = parse_object_id(id)?;
        self.repository
            .delete(&oid)
            .await?
            .ok_or_else(|| self.not_found())
    }

    pub async fn toggle(&self, id: &str) -> AppResult<Document> {
        let oid = parse_object_id(id)?;
        self.repository
            .toggle(&oid, self.spec.active_field)
            .await?
            .ok_or_else(|| self.not_found())
    }

    /// Current value of the active flag on `record`.
    pub fn is_active(&self, record: &Document) -> bool {
        record.get_bool(self.spec.active_field).unwrap_or(false)
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        self.repository.ensure_indexes().await
    }

    fn not_found(&self) -> AppError {
        AppError::NotFound(self.spec.not_found())
    }
}

/// Filter helper for lookups on a reference field.
pub fn reference_filter(field: &str, id: &str) -> AppResult<Document> {
    let oid = parse_object_id(id)?;
    let mut filter = doc! {};
    filter.insert(field, oid);
    Ok(filter)
}
