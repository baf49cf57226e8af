//! Background job scheduler.
//!
//! Initialises a [`JobScheduler`] at server startup and, when a reload
//! schedule is configured, registers the recurring dataset reload.

use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

use crate::api::AppState;

/// Builds and starts the background job scheduler.
///
/// Returns the running [`JobScheduler`] handle, which must be kept alive
/// for the lifetime of the process. Dropping it shuts down all jobs.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the scheduler cannot be initialised,
/// the reload job cannot be registered, or the scheduler fails to start.
pub async fn build_scheduler(
    state: AppState,
    reload_cron: Option<&str>,
) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;

    match reload_cron {
        Some(cron) => register_reload_job(&scheduler, state, cron).await?,
        None => tracing::info!("scheduler: PRICEWATCH_RELOAD_CRON not set; scheduled reload disabled"),
    }

    scheduler.start().await?;
    Ok(scheduler)
}

/// Register the dataset reload job on `cron`.
///
/// A failed reload is logged and the previous dataset keeps serving.
async fn register_reload_job(
    scheduler: &JobScheduler,
    state: AppState,
    cron: &str,
) -> Result<(), JobSchedulerError> {
    let job = Job::new_async(cron, move |_uuid, _lock| {
        let state = state.clone();

        Box::pin(async move {
            tracing::info!("scheduler: starting dataset reload");
            match state.reload().await {
                Ok(stats) => tracing::info!(
                    observations = stats.observation_count,
                    duplicates = stats.duplicates_dropped,
                    mapping = stats.mapping_count,
                    "scheduler: dataset reload complete"
                ),
                Err(e) => tracing::error!(error = %e, "scheduler: dataset reload failed"),
            }
        })
    })?;

    scheduler.add(job).await?;
    tracing::info!(cron, "scheduler: dataset reload registered");
    Ok(())
}
