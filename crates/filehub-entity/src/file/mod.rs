//! File domain entities.

pub mod duplicate;
pub mod model;
pub mod version;

pub use duplicate::{BulkDeleteFailure, BulkDeleteReport, DuplicateGroup};
pub use model::{CreateFile, File};
pub use version::{CreateFileVersion, FileVersion};
