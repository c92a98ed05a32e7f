//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.

pub mod upload;
pub mod user;

pub use upload::UploadRepository;
pub use user::{UserRepository, is_unique_violation};
