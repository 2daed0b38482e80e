use crate::output::Output;
use class_booking_core::{PlannedTarget, RegistrationWindow};
use class_booking_models::{RegistrationOutcome, RunReport};
use comfy_table::{Attribute, Cell, Color, Table};
use serde_json::json;

const TARGET_FORMAT: &str = "%a %d %b %Y %H:%M";

fn styled_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
    table.set_header(
        headers
            .iter()
            .map(|h| Cell::new(h).add_attribute(Attribute::Bold))
            .collect::<Vec<_>>(),
    );
    table
}

fn outcome_cell(outcome: &RegistrationOutcome) -> Cell {
    let color = match outcome {
        RegistrationOutcome::NewlyRegistered => Color::Green,
        RegistrationOutcome::AlreadyRegistered => Color::Cyan,
        RegistrationOutcome::Skipped(_) => Color::DarkGrey,
        RegistrationOutcome::Failed(_) => Color::Red,
    };
    Cell::new(outcome.to_string()).fg(color)
}

pub fn report_table(report: &RunReport) -> Table {
    let mut table = styled_table(&["Week", "Class", "Date", "Result"]);
    for record in &report.records {
        table.add_row(vec![
            Cell::new(record.week),
            Cell::new(record.slot.to_string()),
            Cell::new(record.target.format(TARGET_FORMAT).to_string()),
            outcome_cell(&record.outcome),
        ]);
    }
    table
}

pub fn print_report(report: &RunReport, output: &Output) {
    let summary = report.summary();

    if !output.is_human() {
        output.json(&json!({
            "success": !report.has_failures(),
            "summary": summary,
            "report": report,
        }));
        return;
    }

    if !report.records.is_empty() {
        output.block(report_table(report));
    }
    let line = format!(
        "{} new, {} already registered, {} skipped, {} failed",
        summary.newly_registered, summary.already_registered, summary.skipped, summary.failed
    );
    if let Some(reason) = &report.aborted {
        output.error(format!("Run aborted: {}", reason));
        output.warn(line);
    } else if summary.failed > 0 {
        output.warn(line);
    } else {
        output.success(line);
    }
}

fn window_cell(window: &RegistrationWindow) -> Cell {
    match window {
        RegistrationWindow::Past => Cell::new("past").fg(Color::DarkGrey),
        RegistrationWindow::Open => Cell::new("bookable now").fg(Color::Green),
        RegistrationWindow::OpensSoon { opens_at } => {
            Cell::new(format!("waits until {}", opens_at.format("%H:%M"))).fg(Color::Yellow)
        }
        RegistrationWindow::NotYetOpen { opens_at } => {
            Cell::new(format!("opens {}", opens_at.format(TARGET_FORMAT))).fg(Color::DarkGrey)
        }
    }
}

pub fn plan_table(plan: &[PlannedTarget]) -> Table {
    let mut table = styled_table(&["Week", "Class", "Date", "Registration"]);
    for target in plan {
        table.add_row(vec![
            Cell::new(target.week),
            Cell::new(target.slot.to_string()),
            Cell::new(target.target.format(TARGET_FORMAT).to_string()),
            window_cell(&target.window),
        ]);
    }
    table
}
