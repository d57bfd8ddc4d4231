pub mod catalog_repository;
pub mod user_repository;

pub use catalog_repository::{CatalogRepository, MongoCatalogRepository};
pub use user_repository::{MongoUserRepository, UserRepository};
