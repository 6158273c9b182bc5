//! Route handlers organized by domain.

pub mod admin;
pub mod download;
pub mod file;
pub mod folder;
pub mod health;
pub mod share;
pub mod user;
