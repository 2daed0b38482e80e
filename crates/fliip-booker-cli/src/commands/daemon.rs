use super::config::load_config;
use super::progress::RunSpinner;
use super::register::{execute_run, RunOverrides};
use crate::output::Output;
use class_booking_config::{default_scheduler_config, Config, PathManager};
use color_eyre::Result;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info};

/// Shared by the startup run and the cron job. `run_lock` keeps runs from
/// overlapping when one outlasts the schedule interval.
struct DaemonState {
    config: Config,
    paths: PathManager,
    run_lock: Mutex<()>,
}

impl DaemonState {
    async fn run_once(&self, trigger: &'static str) {
        let _guard = self.run_lock.lock().await;
        info!(operation = "scheduled_run_start", trigger, "Starting registration run");

        let spinner = RunSpinner::new(false);
        match execute_run(&self.config, &self.paths, RunOverrides::default(), &spinner).await {
            Ok(Ok(report)) => {
                let summary = report.summary();
                info!(
                    operation = "scheduled_run_complete",
                    trigger,
                    newly_registered = summary.newly_registered,
                    already_registered = summary.already_registered,
                    failed = summary.failed,
                    "Scheduled registration run completed"
                );
            }
            Ok(Err(aborted)) => {
                error!(
                    operation = "scheduled_run_aborted",
                    trigger,
                    error = %aborted.error,
                    "Scheduled registration run aborted"
                );
            }
            Err(e) => {
                error!(
                    operation = "scheduled_run_error",
                    trigger,
                    error = %e,
                    "Scheduled registration run could not start"
                );
            }
        }
    }
}

pub async fn run_daemon(
    paths: PathManager,
    schedule_override: Option<String>,
    no_startup_run: bool,
    output: &Output,
) -> Result<()> {
    let config = load_config(&paths)?;
    let scheduler_config = config.scheduler.clone().unwrap_or_else(default_scheduler_config);
    let schedule = schedule_override.unwrap_or(scheduler_config.schedule);
    let run_on_startup = scheduler_config.run_on_startup && !no_startup_run;
    let log_dir = paths.log_dir().to_path_buf();

    let state = Arc::new(DaemonState {
        config,
        paths,
        run_lock: Mutex::new(()),
    });

    let mut scheduler = JobScheduler::new()
        .await
        .map_err(|e| color_eyre::eyre::eyre!("Failed to create scheduler: {}", e))?;

    let job_state = Arc::clone(&state);
    let job = Job::new_async(schedule.as_str(), move |_id, _scheduler| {
        let state = Arc::clone(&job_state);
        Box::pin(async move {
            state.run_once("schedule").await;
        })
    })
    .map_err(|e| color_eyre::eyre::eyre!("Invalid schedule '{}': {}", schedule, e))?;

    scheduler
        .add(job)
        .await
        .map_err(|e| color_eyre::eyre::eyre!("Failed to schedule registration job: {}", e))?;
    scheduler
        .start()
        .await
        .map_err(|e| color_eyre::eyre::eyre!("Failed to start scheduler: {}", e))?;

    output.info(format!(
        "Daemon started with schedule '{}'. Logs are written to {}",
        schedule,
        log_dir.display()
    ));
    info!(
        operation = "scheduler_started",
        schedule = %schedule,
        run_on_startup,
        "Scheduler started"
    );

    if run_on_startup {
        state.run_once("startup").await;
    }

    tokio::signal::ctrl_c().await?;
    info!(operation = "scheduler_stopping", "Shutdown requested");
    scheduler
        .shutdown()
        .await
        .map_err(|e| color_eyre::eyre::eyre!("Failed to stop scheduler: {}", e))?;
    output.info("Daemon stopped");
    Ok(())
}
