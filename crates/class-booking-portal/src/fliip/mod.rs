pub mod auth;
pub mod browser;
pub mod calendar;
pub mod dialogs;
pub mod selectors;
pub mod session;
pub mod wait;

pub use session::{FliipSession, SessionSettings};
