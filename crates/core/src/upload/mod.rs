//! Artwork upload flow.
//!
//! The HTTP layer writes the incoming file to a temporary location and hands
//! it to [`UploadService::handle_upload`], which stores the artwork, resolves
//! a base image through [`BaseImageResolver`] and persists one
//! [`UploadRecord`].

pub mod error;
pub mod repository;
pub mod resolver;
pub mod service;
pub mod temp;
pub mod types;

#[cfg(test)]
mod fakes;

pub use error::UploadError;
pub use repository::UploadRecordStore;
pub use resolver::BaseImageResolver;
pub use service::UploadService;
pub use temp::TempFileGuard;
pub use types::{
    ALLOWED_ARTWORK_EXTENSIONS, BaseImageSource, NewUploadRecord, ResolvedBaseImage,
    UploadRecord, UploadResult, UploadedFile, has_artwork_extension,
};
