//! Authentication

mod errors;
mod jwt;
pub mod models;
mod repository;
mod service;
mod token;

pub use errors::*;
pub use jwt::AccessClaims;
pub use models::*;
pub use service::*;
pub use token::*;
