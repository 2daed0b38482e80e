use async_trait::async_trait;
use chrono::NaiveDate;
use class_booking_models::SlotKey;
use std::time::Duration;
use crate::error::UiError;

/// Modal dialogs the portal may open after a class block is clicked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DialogVariant {
    /// "Register" / "join the waiting list" confirmation
    BookingConfirmation,
    /// Offer to cancel an existing registration (already booked)
    Unregister,
    /// Generic message box: success acknowledgements and errors such as
    /// "buy a new membership" or "class is full"
    Alert,
}

impl DialogVariant {
    pub const AFTER_REGISTER_CLICK: [DialogVariant; 3] = [
        DialogVariant::BookingConfirmation,
        DialogVariant::Unregister,
        DialogVariant::Alert,
    ];
}

/// A dialog that became visible, with its rendered text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogState {
    pub variant: DialogVariant,
    pub text: String,
}

/// Reference to a class block found on the current calendar page
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SlotHandle {
    pub element_id: String,
}

/// What the booking logic needs from the browser. Every wait is bounded by
/// the timeout it is given and reports `UiError::Timeout` when it expires.
#[async_trait]
pub trait CalendarUi: Send + Sync {
    /// Date the calendar header currently shows
    async fn current_page_date(&self) -> Result<NaiveDate, UiError>;

    /// Wait until the calendar header contains `label`
    async fn wait_for_week_label(&self, label: &str, timeout: Duration) -> Result<(), UiError>;

    /// Show the next week and wait for the page to refresh
    async fn advance_week(&self) -> Result<(), UiError>;

    /// Show the previous week and wait for the page to refresh
    async fn retreat_week(&self) -> Result<(), UiError>;

    /// `None` when no class block matches (e.g. holiday closure)
    async fn find_slot(&self, key: &SlotKey) -> Result<Option<SlotHandle>, UiError>;

    async fn read_text(&self, slot: &SlotHandle) -> Result<String, UiError>;

    async fn click_register(&self, slot: &SlotHandle) -> Result<(), UiError>;

    /// Wait until one of `variants` is visible and report which one
    async fn wait_for_any_dialog(
        &self,
        variants: &[DialogVariant],
        timeout: Duration,
    ) -> Result<DialogState, UiError>;

    /// Press the confirm button of the booking confirmation dialog
    async fn confirm_booking(&self) -> Result<(), UiError>;

    /// Wait for the acknowledgement shown once a booking went through
    async fn wait_for_success(&self, timeout: Duration) -> Result<(), UiError>;

    /// Close a dialog and wait for it to disappear
    async fn dismiss(&self, variant: DialogVariant) -> Result<(), UiError>;

    /// Keep whatever helps diagnose a failed slot. Best effort.
    async fn capture_failure(&self, _label: &str) {}
}
