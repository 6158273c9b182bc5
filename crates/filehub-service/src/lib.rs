//! # filehub-service
//!
//! Business logic for the FileHub storage engine. Services orchestrate
//! repositories, the storage backend, and the quota ledger so that every
//! invariant-bearing change commits as one transaction.
//!
//! Services follow constructor injection: all dependencies are provided
//! at construction time via `Arc` references. [`Services::build`] wires
//! the full graph.

pub mod annotation;
pub mod context;
pub mod file;
pub mod folder;
pub mod maintenance;
pub mod quota;
pub mod registry;
pub mod share;

pub use annotation::{AnnotationDispatcher, MlSidecarAnnotator};
pub use context::RequestContext;
pub use file::{DownloadService, DuplicateIndex, FileService, UploadService};
pub use folder::{FolderService, TreeService};
pub use maintenance::{Maintenance, MaintenanceJob, MaintenanceReport};
pub use quota::QuotaLedger;
pub use registry::Services;
pub use share::{AccessService, LinkService, ShareService};
