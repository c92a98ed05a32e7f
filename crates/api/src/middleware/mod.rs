//! HTTP middleware.

pub mod auth;
pub mod security_headers;

pub use auth::{AuthUser, auth_middleware};
