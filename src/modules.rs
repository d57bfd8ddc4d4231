//! Optional subsystems registered at startup.
//!
//! Each module either mounts its real handlers or is replaced by a stand-in
//! that answers 503 under the same mount path. Availability is decided once,
//! before the server starts, and never changes the route policy.

use std::{collections::BTreeMap, sync::Arc};

use actix_web::{web, HttpResponse};

use crate::{
    auth::JwtService,
    config::Config,
    db::Database,
    errors::AppError,
    models::domain::catalog::{ResourceSpec, ANSWERS_COLLECTION, CATALOG_RESOURCES, PREGUNTAS},
    repositories::{
        CatalogRepository, MongoCatalogRepository, MongoUserRepository, UserRepository,
    },
    services::{answer_service::QUESTION_FIELD, AnswerService, CatalogService, UserService},
};

pub const AUTH_MODULE: &str = "auth";
pub const ANSWERS_MODULE: &str = "respuestas";

pub enum Mounted<T> {
    Ready(Arc<T>),
    Unavailable { reason: String },
}

impl<T> Mounted<T> {
    pub fn reason(&self) -> Option<&str> {
        match self {
            Mounted::Ready(_) => None,
            Mounted::Unavailable { reason } => Some(reason),
        }
    }
}

impl<T> Clone for Mounted<T> {
    fn clone(&self) -> Self {
        match self {
            Mounted::Ready(service) => Mounted::Ready(Arc::clone(service)),
            Mounted::Unavailable { reason } => Mounted::Unavailable {
                reason: reason.clone(),
            },
        }
    }
}

#[derive(Clone)]
pub struct ModuleRegistry {
    pub auth: Mounted<UserService>,
    pub catalogs: Vec<(&'static ResourceSpec, Mounted<CatalogService>)>,
    pub answers: Mounted<AnswerService>,
}

impl ModuleRegistry {
    /// Builds every module against the database, demoting those that are
    /// disabled or whose index creation fails.
    pub async fn connect(db: &Database, config: &Config, jwt: Arc<JwtService>) -> Self {
        let auth = if config.is_module_disabled(AUTH_MODULE) {
            disabled(AUTH_MODULE)
        } else {
            let repository = MongoUserRepository::new(db, &config.users_collection);
            match repository.ensure_indexes().await {
                Ok(()) => Mounted::Ready(Arc::new(UserService::new(Arc::new(repository), jwt))),
                Err(e) => failed(AUTH_MODULE, &e),
            }
        };

        let mut catalogs = Vec::with_capacity(CATALOG_RESOURCES.len());
        for spec in CATALOG_RESOURCES {
            let mounted = if config.is_module_disabled(spec.name) {
                disabled(spec.name)
            } else {
                let repository = MongoCatalogRepository::new(db, spec.collection, spec.active_field);
                let service = CatalogService::new(spec, Arc::new(repository));
                match service.ensure_indexes().await {
                    Ok(()) => Mounted::Ready(Arc::new(service)),
                    Err(e) => failed(spec.name, &e),
                }
            };
            catalogs.push((spec, mounted));
        }

        let answers = if config.is_module_disabled(ANSWERS_MODULE) {
            disabled(ANSWERS_MODULE)
        } else {
            let questions =
                MongoCatalogRepository::new(db, PREGUNTAS.collection, PREGUNTAS.active_field);
            let answers = MongoCatalogRepository::new(db, ANSWERS_COLLECTION, QUESTION_FIELD);
            let service = AnswerService::new(Arc::new(questions), Arc::new(answers));
            match service.ensure_indexes().await {
                Ok(()) => Mounted::Ready(Arc::new(service)),
                Err(e) => failed(ANSWERS_MODULE, &e),
            }
        };

        let registry = Self {
            auth,
            catalogs,
            answers,
        };
        registry.log_summary();
        registry
    }

    /// Wires already-built services, for callers that bring their own
    /// repositories. Modules disabled in `config` still get stand-ins.
    pub fn from_parts(
        config: &Config,
        users: Arc<dyn UserRepository>,
        catalog: impl Fn(&'static ResourceSpec) -> Arc<dyn CatalogRepository>,
        answers: Arc<dyn CatalogRepository>,
        jwt: Arc<JwtService>,
    ) -> Self {
        let auth = if config.is_module_disabled(AUTH_MODULE) {
            disabled(AUTH_MODULE)
        } else {
            Mounted::Ready(Arc::new(UserService::new(users, jwt)))
        };

        let catalogs = CATALOG_RESOURCES
            .iter()
            .copied()
            .map(|spec| {
                let mounted = if config.is_module_disabled(spec.name) {
                    disabled(spec.name)
                } else {
                    Mounted::Ready(Arc::new(CatalogService::new(spec, catalog(spec))))
                };
                (spec, mounted)
            })
            .collect();

        let answers = if config.is_module_disabled(ANSWERS_MODULE) {
            disabled(ANSWERS_MODULE)
        } else {
            Mounted::Ready(Arc::new(AnswerService::new(catalog(&PREGUNTAS), answers)))
        };

        Self {
            auth,
            catalogs,
            answers,
        }
    }

    /// Every module replaced by a stand-in, used when the database is down.
    pub fn unavailable(reason: &str) -> Self {
        Self {
            auth: down(reason),
            catalogs: CATALOG_RESOURCES
                .iter()
                .map(|spec| (*spec, down(reason)))
                .collect(),
            answers: down(reason),
        }
    }

    /// Module name to availability, in name order.
    pub fn availability(&self) -> BTreeMap<&'static str, bool> {
        self.unavailable_reasons()
            .into_iter()
            .map(|(name, reason)| (name, reason.is_none()))
            .collect()
    }

    /// Module name to the reason it is not mounted (`None` when mounted).
    pub fn unavailable_reasons(&self) -> BTreeMap<&'static str, Option<&str>> {
        let mut status = BTreeMap::new();
        status.insert(AUTH_MODULE, self.auth.reason());
        for (spec, mounted) in &self.catalogs {
            status.insert(spec.name, mounted.reason());
        }
        status.insert(ANSWERS_MODULE, self.answers.reason());
        status
    }

    fn log_summary(&self) {
        for (name, ready) in self.availability() {
            if ready {
                log::info!("Module {} mounted", name);
            } else {
                log::warn!("Module {} replaced by stand-in", name);
            }
        }
    }
}

fn down<T>(reason: &str) -> Mounted<T> {
    Mounted::Unavailable {
        reason: reason.to_string(),
    }
}

fn disabled<T>(name: &str) -> Mounted<T> {
    log::info!("Module {} disabled by configuration", name);
    down("deshabilitado por configuración")
}

fn failed<T>(name: &str, error: &dyn std::fmt::Display) -> Mounted<T> {
    log::error!("Module {} failed to start: {}", name, error);
    down("error al inicializar")
}

/// 503 handler for a module that is not mounted.
pub fn stand_in(module: &'static str) -> actix_web::Route {
    web::to(move || async move {
        Err::<HttpResponse, _>(AppError::ServiceUnavailable(format!(
            "{} no disponible",
            module
        )))
    })
}

/// Scope answering every request under `path` with 503.
pub fn stand_in_scope(path: &str, module: &'static str) -> actix_web::Scope {
    web::scope(path).default_service(stand_in(module))
}
