pub mod catalog;
pub mod user;

pub use user::{Role, User};
