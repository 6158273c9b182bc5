//! Folder hierarchy services.

pub mod service;
pub mod tree;

pub use service::{FolderDeleteReport, FolderService};
pub use tree::TreeService;
