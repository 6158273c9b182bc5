//! Storage backend implementations.

pub mod local;
#[cfg(feature = "s3")]
pub mod s3;

pub use local::LocalStorageBackend;
#[cfg(feature = "s3")]
pub use s3::S3StorageBackend;
