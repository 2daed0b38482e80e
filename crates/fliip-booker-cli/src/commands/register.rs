use super::config::{load_config, load_credential_store};
use super::progress::RunSpinner;
use super::view::print_report;
use crate::output::Output;
use class_booking_config::{Config, Credentials, PathManager};
use class_booking_core::{
    build_reporters, notify_all, BookingError, Clock, RunAborted, RunContext, RunOrchestrator, SystemClock,
};
use class_booking_models::RunReport;
use class_booking_portal::{FliipSession, SessionSettings};
use color_eyre::Result;
use tracing::{info, instrument};

/// Options a single run takes from the command line
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOverrides {
    pub weeks: Option<usize>,
    pub show_browser: bool,
}

/// One registration run in its own browser session. Setup problems
/// (config, credentials, browser launch) are errors; a run that started
/// always yields a report, aborted or not, and the report is handed to the
/// configured reporters.
#[instrument(skip_all)]
pub async fn execute_run(
    config: &Config,
    paths: &PathManager,
    overrides: RunOverrides,
    spinner: &RunSpinner,
) -> Result<std::result::Result<RunReport, RunAborted>> {
    let slots = config
        .class_slots()
        .map_err(|e| color_eyre::eyre::eyre!("Invalid class list: {}", e))?;
    let store = load_credential_store(paths)?;
    let credentials = Credentials::resolve(config, &store).map_err(|e| color_eyre::eyre::eyre!("{}", e))?;
    let max_weeks = overrides.weeks.unwrap_or_else(|| config.booking.weeks());

    paths
        .ensure_directories()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to create directories: {}", e))?;

    let mut settings = SessionSettings::from_config(config, paths);
    if overrides.show_browser {
        settings.headless = false;
    }

    spinner.set_message("Starting browser...");
    let session = FliipSession::launch(settings)
        .await
        .map_err(|e| color_eyre::eyre::eyre!("Failed to start browser: {}", e))?;

    let clock = SystemClock;
    spinner.set_message(format!("Logging in to {}...", config.portal.gym));
    let outcome = match session.sign_in(&credentials).await {
        Ok(()) => {
            spinner.set_message(format!("Registering for {} classes over {} weeks...", slots.len(), max_weeks));
            let ctx = RunContext::from_options(&config.booking);
            RunOrchestrator::new(&session, &clock, ctx).run(&slots, max_weeks).await
        }
        Err(e) => {
            let now = clock.now();
            let error = BookingError::from(e);
            let mut report = RunReport::new(now);
            report.abort(format!("login failed: {}", error), now);
            Err(RunAborted { error, report })
        }
    };
    session.close().await;

    let report = match &outcome {
        Ok(report) => report,
        Err(aborted) => &aborted.report,
    };
    let reporters = build_reporters(config, paths);
    notify_all(&reporters, report).await;

    Ok(outcome)
}

pub async fn run_register(
    paths: &PathManager,
    weeks: Option<usize>,
    show_browser: bool,
    output: &Output,
) -> Result<()> {
    let config = load_config(paths)?;
    let spinner = RunSpinner::new(output.is_human() && !output.is_quiet());

    let result = execute_run(&config, paths, RunOverrides { weeks, show_browser }, &spinner).await;
    spinner.finish();

    match result? {
        Ok(report) => {
            info!(operation = "register_complete", failed = report.summary().failed, "Register command finished");
            print_report(&report, output);
            Ok(())
        }
        Err(aborted) => {
            print_report(&aborted.report, output);
            Err(color_eyre::eyre::eyre!("{}", aborted))
        }
    }
}
