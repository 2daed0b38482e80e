pub mod slot;
pub mod outcome;
pub mod report;

pub use slot::{CalendarPageState, ClassSlot, SlotKey, parse_weekday};
pub use outcome::{RegistrationOutcome, SkipReason};
pub use report::{ReportSummary, RunReport, SlotRecord};
