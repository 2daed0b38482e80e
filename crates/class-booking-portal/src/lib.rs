pub mod error;
pub mod labels;
pub mod traits;
pub mod fliip;

pub use error::UiError;
pub use labels::{format_week_label, parse_week_label};
pub use traits::{CalendarUi, DialogState, DialogVariant, SlotHandle};
pub use fliip::{FliipSession, SessionSettings};
