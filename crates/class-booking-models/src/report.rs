use chrono::NaiveDateTime;
use serde::Serialize;
use crate::outcome::{RegistrationOutcome, SkipReason};
use crate::slot::ClassSlot;

/// One attempt: which week iteration, which configured slot, the class it
/// resolved to and what happened
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SlotRecord {
    pub week: usize,
    pub slot: ClassSlot,
    pub target: NaiveDateTime,
    pub outcome: RegistrationOutcome,
}

#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct ReportSummary {
    pub newly_registered: usize,
    pub already_registered: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Everything a run produced, in attempt order
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub started_at: NaiveDateTime,
    pub finished_at: Option<NaiveDateTime>,
    pub records: Vec<SlotRecord>,
    /// Set when a run-fatal error stopped the run early
    pub aborted: Option<String>,
}

impl RunReport {
    pub fn new(started_at: NaiveDateTime) -> Self {
        Self {
            started_at,
            finished_at: None,
            records: Vec::new(),
            aborted: None,
        }
    }

    pub fn push(&mut self, record: SlotRecord) {
        self.records.push(record);
    }

    pub fn finish(&mut self, at: NaiveDateTime) {
        self.finished_at = Some(at);
    }

    pub fn abort(&mut self, reason: impl Into<String>, at: NaiveDateTime) {
        self.aborted = Some(reason.into());
        self.finished_at = Some(at);
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted.is_some()
    }

    /// Records for classes that are booked (new or existing registrations)
    pub fn successes(&self) -> impl Iterator<Item = &SlotRecord> {
        self.records.iter().filter(|r| r.outcome.is_registered())
    }

    pub fn failures(&self) -> impl Iterator<Item = &SlotRecord> {
        self.records.iter().filter(|r| r.outcome.is_failure())
    }

    /// A report needs attention when a slot failed or the run was cut short
    pub fn has_failures(&self) -> bool {
        self.aborted.is_some() || self.records.iter().any(|r| r.outcome.is_failure())
    }

    pub fn summary(&self) -> ReportSummary {
        let mut summary = ReportSummary::default();
        for record in &self.records {
            match record.outcome {
                RegistrationOutcome::NewlyRegistered => summary.newly_registered += 1,
                RegistrationOutcome::AlreadyRegistered => summary.already_registered += 1,
                RegistrationOutcome::Skipped(SkipReason::Past)
                | RegistrationOutcome::Skipped(SkipReason::TooFarInFuture) => summary.skipped += 1,
                RegistrationOutcome::Failed(_) => summary.failed += 1,
            }
        }
        summary
    }
}
