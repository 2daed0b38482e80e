use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UiError {
    /// An expected element or page state did not show up in time
    #[error("timed out after {after:?} waiting for {what}")]
    Timeout { what: String, after: Duration },

    #[error("browser launch failed: {0}")]
    Launch(String),

    #[error("login failed: {0}")]
    Login(String),

    #[error("unexpected page content: {0}")]
    UnexpectedContent(String),

    #[error("browser driver error: {0}")]
    Driver(String),
}

impl UiError {
    pub fn timeout(what: impl Into<String>, after: Duration) -> Self {
        Self::Timeout {
            what: what.into(),
            after,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

impl From<chromiumoxide::error::CdpError> for UiError {
    fn from(e: chromiumoxide::error::CdpError) -> Self {
        Self::Driver(e.to_string())
    }
}
