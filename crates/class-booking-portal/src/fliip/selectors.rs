//! CSS selectors and element ids of the Fliip member portal.
//!
//! These follow the vendor's markup and are the first thing to check when
//! a run starts timing out everywhere.

use crate::traits::DialogVariant;

/// Privacy banner "refuse all" button
pub const COOKIE_REJECT_BUTTON: &str =
    "body > div:nth-of-type(2) > div > div > div > div:nth-of-type(2) > button:nth-of-type(2)";

pub const USERNAME_INPUT: &str = "#username";
pub const PASSWORD_INPUT: &str = "#password";

/// Only rendered once logged in
pub const LANGUAGE_BUTTON: &str = "#change_language div button";

pub const CURRENT_DATE_ID: &str = "current-date";
pub const NEXT_WEEK_BUTTON: &str = "#next_week";
pub const PREV_WEEK_BUTTON: &str = "#prev_week";

pub const CONFIRM_BUTTON: &str = "#confirm";

pub const ALERT_MODAL_ID: &str = "modal_alert";
/// Title of the alert modal reads "Message" when a booking succeeded
pub const SUCCESS_TITLE_TEXT: &str = "Message";

/// Element ids that render each dialog variant
pub fn dialog_ids(variant: DialogVariant) -> &'static [&'static str] {
    match variant {
        DialogVariant::BookingConfirmation => &["book_confirm_modal"],
        DialogVariant::Unregister => &["modal-unregister", "myModal_unreg_waiting"],
        DialogVariant::Alert => &[ALERT_MODAL_ID],
    }
}

/// Header close button of a modal
pub fn close_button(modal_id: &str) -> String {
    format!("#{} > div > div > div:nth-of-type(1) > button", modal_id)
}

pub fn close_button_fallback(modal_id: &str) -> String {
    format!("#{} .close", modal_id)
}

pub fn alert_title() -> String {
    format!("#{} > div > div > div:nth-of-type(1) h4", ALERT_MODAL_ID)
}

/// The "+" icon inside a class block
pub fn register_icon(element_id: &str) -> String {
    format!("[id=\"{}\"] p i", element_id)
}

pub fn by_exact_id(element_id: &str) -> String {
    format!("[id=\"{}\"]", element_id)
}
