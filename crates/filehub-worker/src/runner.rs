//! Job runner: executes maintenance jobs, one run per job at a time.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::Mutex;
use tracing;

use filehub_core::error::AppError;
use filehub_service::maintenance::{Maintenance, MaintenanceJob, MaintenanceReport};

/// Runs maintenance jobs for the scheduler and for on-demand triggers.
///
/// A job that is still running when it is triggered again is skipped, so
/// a slow sweep never stacks up behind itself.
#[derive(Debug)]
pub struct JobRunner {
    /// The jobs themselves
    maintenance: Arc<Maintenance>,
    /// One guard per job
    guards: HashMap<MaintenanceJob, Mutex<()>>,
}

impl JobRunner {
    /// Create a new job runner
    pub fn new(maintenance: Arc<Maintenance>) -> Self {
        let guards = MaintenanceJob::ALL
            .into_iter()
            .map(|job| (job, Mutex::new(())))
            .collect();
        Self {
            maintenance,
            guards,
        }
    }

    /// Run `job` unless a previous run of it is still in progress.
    ///
    /// Returns `Ok(None)` when the run was skipped.
    pub async fn run(&self, job: MaintenanceJob) -> Result<Option<MaintenanceReport>, AppError> {
        let Some(guard) = self.guards.get(&job) else {
            return Err(AppError::internal(format!("No guard registered for job {job}")));
        };
        let Ok(_running) = guard.try_lock() else {
            tracing::warn!(job = %job, "Maintenance job still running; skipping this trigger");
            return Ok(None);
        };

        tracing::info!(job = %job, "Maintenance job started");
        let started = Instant::now();
        let result = self.maintenance.run(job).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match &result {
            Ok(_) => tracing::info!(job = %job, elapsed_ms, "Maintenance job completed"),
            Err(e) => tracing::error!(job = %job, elapsed_ms, error = %e, "Maintenance job failed"),
        }
        result.map(Some)
    }
}
