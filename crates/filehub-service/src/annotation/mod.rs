//! Best-effort content annotation after upload.

pub mod dispatcher;
pub mod sidecar;

pub use dispatcher::AnnotationDispatcher;
pub use sidecar::MlSidecarAnnotator;
