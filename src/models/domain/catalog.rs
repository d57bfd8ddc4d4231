use mongodb::bson::{oid::ObjectId, Bson, Document};
use serde_json::{Map, Value};

use crate::errors::{AppError, AppResult};

/// Server-managed fields that clients may not set directly.
const RESERVED_FIELDS: [&str; 4] = ["_id", "id", "createdAt", "updatedAt"];

pub fn parse_object_id(raw: &str) -> AppResult<ObjectId> {
    ObjectId::parse_str(raw).map_err(|_| AppError::ValidationError("ID inválido".to_string()))
}

/// Converts a client JSON body into a record, dropping reserved fields.
pub fn record_from_json(body: Value) -> AppResult<Document> {
    if !body.is_object() {
        return Err(AppError::ValidationError(
            "El cuerpo de la petición debe ser un objeto JSON".to_string(),
        ));
    }

    let mut record = mongodb::bson::to_document(&body)?;
    for field in RESERVED_FIELDS {
        record.remove(field);
    }
    Ok(record)
}

/// Renders a stored record as JSON: `_id` becomes a hex `id`, ObjectIds
/// become hex strings and dates become RFC 3339 strings. Embedded documents
/// are rendered the same way.
pub fn record_to_json(record: Document) -> Value {
    let mut map = Map::new();
    for (key, value) in record {
        let key = if key == "_id" { "id".to_string() } else { key };
        map.insert(key, field_to_json(value));
    }
    Value::Object(map)
}

fn field_to_json(value: Bson) -> Value {
    match value {
        Bson::ObjectId(oid) => Value::String(oid.to_hex()),
        Bson::DateTime(dt) => dt
            .try_to_rfc3339_string()
            .map(Value::String)
            .unwrap_or(Value::Null),
        Bson::Document(embedded) => record_to_json(embedded),
        other => other.into_relaxed_extjson(),
    }
}

/// Describes one catalog resource mounted under `/api`.
#[derive(Debug)]
pub struct ResourceSpec {
    /// Module name, also used by `DISABLED_MODULES`.
    pub name: &'static str,
    pub path: &'static str,
    pub collection: &'static str,
    pub active_field: &'static str,
    pub label: &'static str,
    /// Grammatical gender ending for messages ("a" or "o").
    pub ending: &'static str,
    pub access: CatalogAccess,
    /// Adds `GET {path}/activas`.
    pub active_listing: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogAccess {
    /// Reads for admin/profesor, writes for admin only.
    StaffOnly,
    /// Any granted credential, token or license.
    AnyCredential,
}

impl ResourceSpec {
    pub fn message(&self, participle: &str) -> String {
        format!("{} {}{} exitosamente", self.label, participle, self.ending)
    }

    pub fn not_found(&self) -> String {
        format!("{} no encontrad{}", self.label, self.ending)
    }
}

pub static RANGOS_EDAD: ResourceSpec = ResourceSpec {
    name: "rangos-edad",
    path: "/api/rangos-edad",
    collection: "rangos_edad",
    active_field: "active",
    label: "Rango de edad",
    ending: "o",
    access: CatalogAccess::StaffOnly,
    active_listing: false,
};

pub static CATEGORIAS: ResourceSpec = ResourceSpec {
    name: "categorias",
    path: "/api/categorias",
    collection: "categorias",
    active_field: "activo",
    label: "Categoría",
    ending: "a",
    access: CatalogAccess::StaffOnly,
    active_listing: true,
};

pub static NIVEL_DIFICULTAD: ResourceSpec = ResourceSpec {
    name: "nivel-dificultad",
    path: "/api/nivel-dificultad",
    collection: "niveles_dificultad",
    active_field: "activo",
    label: "Nivel de dificultad",
    ending: "o",
    access: CatalogAccess::StaffOnly,
    active_listing: false,
};

pub static SUBCATEGORIA: ResourceSpec = ResourceSpec {
    name: "subcategoria",
    path: "/api/subcategoria",
    collection: "subcategorias",
    active_field: "activo",
    label: "Subcategoría",
    ending: "a",
    access: CatalogAccess::StaffOnly,
    active_listing: false,
};

pub static PREGUNTAS: ResourceSpec = ResourceSpec {
    name: "preguntas",
    path: "/api/preguntas",
    collection: "preguntas",
    active_field: "activo",
    label: "Pregunta",
    ending: "a",
    access: CatalogAccess::AnyCredential,
    active_listing: false,
};

pub const ANSWERS_COLLECTION: &str = "respuestas";

pub static CATALOG_RESOURCES: [&ResourceSpec; 5] = [
    &RANGOS_EDAD,
    &CATEGORIAS,
    &NIVEL_DIFICULTAD,
    &SUBCATEGORIA,
    &PREGUNTAS,
];
