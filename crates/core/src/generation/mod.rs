//! Remote base image generation.
//!
//! The generation capability is an opaque HTTP endpoint that answers a `POST`
//! with a JSON body holding a single inline image:
//!
//! ```json
//! { "base64Image": "data:image/webp;base64,UklGR..." }
//! ```
//!
//! Anything else is a [`GenerationError`]. Callers treat generation as an
//! optional enhancement and recover from every failure.

mod client;
mod error;
mod image;

pub use client::{HttpImageGenerator, ImageGenerator};
pub use error::GenerationError;
pub use image::GeneratedImage;
