//! # filehub-entity
//!
//! Domain entity models for the FileHub storage engine. Every struct in
//! this crate represents a database table row or a domain value object.
//! Database entities derive `sqlx::FromRow`.

pub mod file;
pub mod folder;
pub mod name;
pub mod share;
pub mod storage;
pub mod user;
