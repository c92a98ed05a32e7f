//! Core business logic for Atelier.
//!
//! This crate contains the upload flow with ZERO web or database dependencies.
//! Persistence is reached through traits implemented by the db crate.
//!
//! # Modules
//!
//! - `auth` - Password hashing
//! - `storage` - Object storage client (OpenDAL)
//! - `generation` - Remote base image generation
//! - `upload` - Base image resolution and the artwork upload orchestrator

pub mod auth;
pub mod generation;
pub mod storage;
pub mod upload;
