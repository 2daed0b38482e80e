use class_booking_config::{BookingOptions, WeekOrder};
use std::time::Duration;

/// Settings a run needs, passed down explicitly instead of read from globals
#[derive(Debug, Clone)]
pub struct RunContext {
    /// How long before class start registration opens
    pub lookahead: chrono::Duration,
    /// Bound on every UI wait
    pub ui_timeout: Duration,
    /// Longest sleep allowed for a registration window to open
    pub opening_wait: Option<chrono::Duration>,
    pub week_order: WeekOrder,
}

impl RunContext {
    pub fn new(lookahead: chrono::Duration, ui_timeout: Duration) -> Self {
        Self {
            lookahead,
            ui_timeout,
            opening_wait: None,
            week_order: WeekOrder::default(),
        }
    }

    pub fn from_options(options: &BookingOptions) -> Self {
        Self {
            lookahead: options.lookahead(),
            ui_timeout: options.ui_timeout(),
            opening_wait: options.opening_wait(),
            week_order: options.week_order,
        }
    }

    pub fn with_opening_wait(mut self, wait: chrono::Duration) -> Self {
        self.opening_wait = Some(wait);
        self
    }

    pub fn with_week_order(mut self, order: WeekOrder) -> Self {
        self.week_order = order;
        self
    }
}
