//! Share domain entities.

pub mod link;
pub mod model;

pub use link::{PublicShareView, ShareLink};
pub use model::{CreateShare, Share, ShareState};
