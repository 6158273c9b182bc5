//! Core traits defined in `filehub-core` and implemented by other crates.

pub mod annotator;
pub mod storage;

pub use annotator::{AnnotationRequest, Annotator};
pub use storage::{ByteStream, StorageBackend, StorageObjectMeta};
