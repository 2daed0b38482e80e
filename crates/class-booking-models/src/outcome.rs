use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Class already started
    Past,
    /// Registration window not open yet
    TooFarInFuture,
}

/// Result of one registration attempt for one (week, slot) pair
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum RegistrationOutcome {
    Skipped(SkipReason),
    AlreadyRegistered,
    NewlyRegistered,
    Failed(String),
}

impl RegistrationOutcome {
    /// Booked by this run or an earlier one
    pub fn is_registered(&self) -> bool {
        matches!(self, Self::AlreadyRegistered | Self::NewlyRegistered)
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

impl fmt::Display for RegistrationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Skipped(SkipReason::Past) => write!(f, "Skipped (class in the past)"),
            Self::Skipped(SkipReason::TooFarInFuture) => write!(f, "Skipped (registration not open yet)"),
            Self::AlreadyRegistered => write!(f, "Already Registered"),
            Self::NewlyRegistered => write!(f, "New Registration"),
            Self::Failed(error) => write!(f, "Failed: {}", error),
        }
    }
}
