//! Object storage client built on Apache OpenDAL.
//!
//! Stores artwork and generated base images under flat keys and hands back
//! the URL they can be fetched from:
//! - S3 (AWS or any S3-compatible endpoint)
//! - Local filesystem (development only)
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │ ObjectStore::store(source, key, visibility) -> URL           │
//! ├──────────────────────────────────────────────────────────────┤
//! │ StorageService            │ op.write_with(key, bytes)        │
//! │  PublicRead -> public URL │ op.presign_read(key, ttl)        │
//! │  Private    -> presigned  │ op.stat(key)                     │
//! └──────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod error;
pub mod keys;
mod service;

pub use config::{StorageConfig, StorageProvider};
pub use error::StorageError;
pub use service::{ContentSource, ObjectStore, StorageService, Visibility};
