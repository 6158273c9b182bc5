//! # filehub-core
//!
//! Core crate for the FileHub storage engine. Contains the capability
//! traits (storage backend, content annotator), configuration schemas,
//! and the unified error system.
//!
//! This crate has **no** internal dependencies on other FileHub crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;

pub use error::{AppError, DenialReason, ErrorKind};
pub use result::AppResult;
