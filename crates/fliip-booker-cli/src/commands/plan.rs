use super::config::load_config;
use super::view::plan_table;
use crate::output::Output;
use class_booking_config::PathManager;
use class_booking_core::{plan_targets, Clock, RegistrationWindow, RunContext, SystemClock};
use color_eyre::Result;
use serde_json::json;

pub fn run_plan(paths: &PathManager, weeks: Option<usize>, output: &Output) -> Result<()> {
    let config = load_config(paths)?;
    let slots = config
        .class_slots()
        .map_err(|e| color_eyre::eyre::eyre!("Invalid class list: {}", e))?;
    let ctx = RunContext::from_options(&config.booking);
    let max_weeks = weeks.unwrap_or_else(|| config.booking.weeks());
    let now = SystemClock.now();

    let plan = plan_targets(&slots, max_weeks, now, &ctx);

    if !output.is_human() {
        output.json(&json!({
            "generated_at": now,
            "targets": plan,
        }));
        return Ok(());
    }

    output.block(plan_table(&plan));
    let bookable = plan
        .iter()
        .filter(|t| matches!(t.window, RegistrationWindow::Open | RegistrationWindow::OpensSoon { .. }))
        .count();
    output.info(format!("{} of {} classes can be registered by a run now", bookable, plan.len()));
    Ok(())
}
