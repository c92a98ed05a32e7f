//! Shared configuration, errors, and token handling for Atelier.
//!
//! This crate provides common types used across all other crates:
//! - Layered application configuration
//! - Application-wide error types
//! - JWT issuing and verification
//! - Auth request/response payloads

pub mod auth;
pub mod config;
pub mod error;
pub mod jwt;

#[cfg(test)]
mod jwt_tests;

pub use auth::Claims;
pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use jwt::{JwtConfig, JwtError, JwtService};
