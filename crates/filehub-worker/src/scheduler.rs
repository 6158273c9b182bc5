//! Cron scheduler for the maintenance jobs.

use std::sync::Arc;

use tokio_cron_scheduler::{Job as CronJob, JobScheduler};
use tracing;

use filehub_core::config::WorkerConfig;
use filehub_core::error::AppError;
use filehub_service::maintenance::MaintenanceJob;

use crate::runner::JobRunner;

/// Cron-based scheduler for periodic maintenance
pub struct MaintenanceScheduler {
    /// The underlying job scheduler
    scheduler: JobScheduler,
    /// Runner the scheduled triggers go through
    runner: Arc<JobRunner>,
}

impl std::fmt::Debug for MaintenanceScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MaintenanceScheduler").finish()
    }
}

impl MaintenanceScheduler {
    /// Create a new maintenance scheduler
    pub async fn new(runner: Arc<JobRunner>) -> Result<Self, AppError> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| AppError::internal(format!("Failed to create scheduler: {e}")))?;

        Ok(Self { scheduler, runner })
    }

    /// Register every maintenance job on its configured schedule
    pub async fn register_jobs(&self, config: &WorkerConfig) -> Result<(), AppError> {
        self.register(MaintenanceJob::OrphanSweep, &config.orphan_sweep_cron)
            .await?;
        self.register(MaintenanceJob::TrashPurge, &config.trash_purge_cron)
            .await?;
        self.register(MaintenanceJob::QuotaAudit, &config.quota_audit_cron)
            .await?;

        tracing::info!("All maintenance jobs registered");
        Ok(())
    }

    /// Start the scheduler
    pub async fn start(&self) -> Result<(), AppError> {
        self.scheduler
            .start()
            .await
            .map_err(|e| AppError::internal(format!("Failed to start scheduler: {e}")))?;

        tracing::info!("Maintenance scheduler started");
        Ok(())
    }

    /// Shutdown the scheduler
    pub async fn shutdown(&mut self) -> Result<(), AppError> {
        self.scheduler
            .shutdown()
            .await
            .map_err(|e| AppError::internal(format!("Failed to shutdown scheduler: {e}")))?;

        tracing::info!("Maintenance scheduler shut down");
        Ok(())
    }

    async fn register(&self, job: MaintenanceJob, schedule: &str) -> Result<(), AppError> {
        let runner = Arc::clone(&self.runner);
        let cron_job = CronJob::new_async(schedule, move |_uuid, _lock| {
            let runner = Arc::clone(&runner);
            Box::pin(async move {
                // The runner logs the outcome.
                let _ = runner.run(job).await;
            })
        })
        .map_err(|e| {
            AppError::configuration(format!("Invalid schedule '{schedule}' for {job}: {e}"))
        })?;

        self.scheduler
            .add(cron_job)
            .await
            .map_err(|e| AppError::internal(format!("Failed to add {job} schedule: {e}")))?;

        tracing::info!(job = %job, schedule, "Registered maintenance job");
        Ok(())
    }
}
