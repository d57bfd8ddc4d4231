pub mod answer_service;
pub mod catalog_service;
pub mod password;
pub mod user_service;

pub use answer_service::AnswerService;
pub use catalog_service::CatalogService;
pub use password::PasswordHasher;
pub use user_service::UserService;
