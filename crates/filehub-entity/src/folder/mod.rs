//! Folder domain entities.

pub mod contents;
pub mod model;
pub mod path;

pub use contents::{BreadcrumbEntry, FolderContents};
pub use model::{CreateFolder, Folder};
pub use path::ROOT_PATH;
