//! Custom Axum extractors.

pub mod auth;
pub mod upload;

pub use auth::AuthUser;
pub use upload::UploadForm;
