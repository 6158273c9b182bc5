//! # filehub-api
//!
//! HTTP API layer for FileHub built on Axum.
//!
//! Binds the storage engine's operations to REST endpoints under `/api`,
//! with bearer-token extraction, request DTOs, and error mapping.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_app, run_server};
pub use state::AppState;
