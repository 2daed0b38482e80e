pub mod attempt;
pub mod clock;
pub mod context;
pub mod error;
pub mod navigator;
pub mod notify;
pub mod orchestrator;
pub mod plan;
pub mod resolver;
pub mod window;

#[cfg(test)]
mod testing;

pub use attempt::{classify_status, AttemptEngine, SlotStatus};
pub use clock::{Clock, SystemClock};
pub use context::RunContext;
pub use error::{BookingError, RunAborted};
pub use navigator::{expected_label, week_sequence, CalendarNavigator};
pub use notify::{build_reporters, failure_summary, notify_all, LogReporter, OutcomeReporter, ReportFileWriter, WebhookReporter};
pub use orchestrator::RunOrchestrator;
pub use plan::{plan_targets, PlannedTarget};
pub use resolver::{resolve, resolve_on_page, slot_key};
pub use window::RegistrationWindow;
