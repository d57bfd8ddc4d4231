pub mod answer_handler;
pub mod auth_handler;
pub mod catalog_handler;
pub mod health_handler;

pub use auth_handler::{login, register};
pub use health_handler::{debug, health_check, index};
