//! Request and response DTOs.

pub mod request;
pub mod response;

pub use request::validate;
pub use response::ApiResponse;
