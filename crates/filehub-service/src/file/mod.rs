//! File lifecycle services: upload, versioning, download, trash, purge, duplicates.

pub mod download;
pub mod duplicate;
pub mod hash;
pub mod service;
pub mod upload;

pub use download::{DownloadBody, DownloadService, FileDownload};
pub use duplicate::DuplicateIndex;
pub use service::FileService;
pub use upload::{UploadParams, UploadService, VersionParams};
