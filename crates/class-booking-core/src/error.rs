use chrono::NaiveDateTime;
use class_booking_models::RunReport;
use class_booking_portal::UiError;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BookingError {
    /// No class block on the calendar for the target (holiday closure, schedule change)
    #[error("no class found on the calendar for {target}")]
    SlotNotFound { target: NaiveDateTime },

    #[error("class at {target} is canceled")]
    ClassCanceled { target: NaiveDateTime },

    /// The portal answered the registration click with an error message
    #[error("registration for {target} rejected: {message}")]
    RegistrationRejected { target: NaiveDateTime, message: String },

    #[error("membership has no sessions left: {message}")]
    OutOfMembership { message: String },

    #[error("timed out after {after:?} waiting for {what}")]
    UiTimeout { what: String, after: Duration },

    #[error("calendar shows '{found}' but '{expected}' was expected")]
    UnexpectedCalendarPage { expected: String, found: String },

    #[error("browser error: {0}")]
    Ui(String),
}

impl BookingError {
    /// Errors after which no further slot may be attempted in the same run
    pub fn is_run_fatal(&self) -> bool {
        matches!(
            self,
            Self::OutOfMembership { .. } | Self::UnexpectedCalendarPage { .. }
        )
    }
}

impl From<UiError> for BookingError {
    fn from(e: UiError) -> Self {
        match e {
            UiError::Timeout { what, after } => Self::UiTimeout { what, after },
            other => Self::Ui(other.to_string()),
        }
    }
}

/// A run stopped by a run-fatal error. `report` holds every record produced
/// before the stop, including the failed one.
#[derive(Debug, Error)]
#[error("registration run aborted: {error}")]
pub struct RunAborted {
    #[source]
    pub error: BookingError,
    pub report: RunReport,
}
