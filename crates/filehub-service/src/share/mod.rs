//! Link sharing: token issuance, validation, and capped downloads.

pub mod access;
pub mod link;
pub mod service;

pub use access::{AccessService, ValidatedShare};
pub use link::{LinkService, RandomTokenGenerator, TokenGenerator};
pub use service::{CreateShareRequest, ShareService};
