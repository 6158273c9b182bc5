//! # filehub-database
//!
//! SQLite connection management and concrete repository implementations
//! for the FileHub storage engine.
//!
//! Reads that stand alone run against the pool. Methods that take a
//! `&mut SqliteConnection` participate in a caller-owned transaction.

pub mod connection;
pub mod error;
pub mod migration;
pub mod repositories;

pub use connection::{DatabasePool, DbConnection, DbTransaction, commit};
