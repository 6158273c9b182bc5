//! Scheduled maintenance for FileHub.
//!
//! This crate provides:
//! - A job runner that keeps any one maintenance job from overlapping itself
//! - A cron scheduler that fires the orphan sweep, trash purge, and quota
//!   audit on their configured schedules

pub mod runner;
pub mod scheduler;

pub use runner::JobRunner;
pub use scheduler::MaintenanceScheduler;
