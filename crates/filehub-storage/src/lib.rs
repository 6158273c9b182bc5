//! # filehub-storage
//!
//! Storage backend implementations for FileHub: the local filesystem and
//! S3-compatible object stores, plus a decorator that bounds every call
//! with a timeout and retries the idempotent ones.

pub mod factory;
pub mod mime;
pub mod providers;
pub mod resilient;

pub use factory::build_backend;
pub use resilient::{ResilientBackend, RetryPolicy};
