use class_booking_models::{CalendarPageState, ClassSlot, RegistrationOutcome, RunReport, SlotRecord};
use class_booking_portal::CalendarUi;
use tracing::{error, info, instrument, warn};
use crate::attempt::AttemptEngine;
use crate::clock::Clock;
use crate::context::RunContext;
use crate::error::{BookingError, RunAborted};
use crate::navigator::{expected_label, week_sequence, CalendarNavigator};
use crate::resolver::resolve_on_page;

/// Drives one registration run over the configured weeks. Expects the
/// calendar to show the current week when `run` starts.
pub struct RunOrchestrator<'a> {
    ui: &'a dyn CalendarUi,
    clock: &'a dyn Clock,
    ctx: RunContext,
}

impl<'a> RunOrchestrator<'a> {
    pub fn new(ui: &'a dyn CalendarUi, clock: &'a dyn Clock, ctx: RunContext) -> Self {
        Self { ui, clock, ctx }
    }

    /// Attempt every slot in every week. A failed slot is recorded and the
    /// run moves on; a run-fatal error or a week that cannot be shown stops
    /// the run and returns the partial report inside `RunAborted`.
    #[instrument(skip(self, slots))]
    pub async fn run(&self, slots: &[ClassSlot], max_weeks: usize) -> Result<RunReport, RunAborted> {
        let mut report = RunReport::new(self.clock.now());
        let today = self.clock.today();
        let navigator = CalendarNavigator::new(self.ui, self.ctx.ui_timeout);
        let engine = AttemptEngine::new(self.ui, self.clock, &self.ctx);

        info!(
            operation = "run_start",
            slots = slots.len(),
            max_weeks,
            week_order = ?self.ctx.week_order,
            "Starting registration run"
        );

        let mut position = 0;
        for week in week_sequence(self.ctx.week_order, max_weeks) {
            let label = expected_label(today, week);
            let page = match self.show_week(&navigator, position, week, &label).await {
                Ok(page) => page,
                Err(e) => return Err(self.abort(report, e)),
            };
            position = week;
            info!(operation = "week", week, label = %label, "Processing calendar week");

            for slot in slots {
                let target = resolve_on_page(*slot, &page);
                let result = engine.attempt(target).await;

                let (outcome, fatal) = match result {
                    Ok(outcome) => {
                        info!(operation = "slot", week, class_at = %target, outcome = %outcome, "Slot processed");
                        (outcome, None)
                    }
                    Err(e) => {
                        warn!(operation = "slot", week, class_at = %target, error = %e, "Slot failed");
                        self.ui.capture_failure(&target.format("%Y-%m-%d_%H%M").to_string()).await;
                        let outcome = RegistrationOutcome::Failed(e.to_string());
                        (outcome, e.is_run_fatal().then_some(e))
                    }
                };

                report.push(SlotRecord {
                    week,
                    slot: *slot,
                    target,
                    outcome,
                });

                if let Some(e) = fatal {
                    return Err(self.abort(report, e));
                }
            }
        }

        report.finish(self.clock.now());
        let summary = report.summary();
        info!(
            operation = "run_complete",
            newly_registered = summary.newly_registered,
            already_registered = summary.already_registered,
            skipped = summary.skipped,
            failed = summary.failed,
            "Registration run finished"
        );
        Ok(report)
    }

    async fn show_week(
        &self,
        navigator: &CalendarNavigator<'_>,
        from: usize,
        week: usize,
        label: &str,
    ) -> Result<CalendarPageState, BookingError> {
        navigator.move_to(from, week).await?;
        navigator.verify_week(label).await?;
        navigator.page_state().await
    }

    fn abort(&self, mut report: RunReport, error: BookingError) -> RunAborted {
        error!(operation = "run_aborted", error = %error, "Registration run aborted");
        report.abort(error.to_string(), self.clock.now());
        RunAborted { error, report }
    }
}
