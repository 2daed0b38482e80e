use chrono::{Duration, NaiveDate};
use class_booking_config::WeekOrder;
use class_booking_models::CalendarPageState;
use class_booking_portal::{format_week_label, CalendarUi};
use tracing::debug;
use crate::error::BookingError;

/// Header label the calendar shows `week` weeks after `today`
pub fn expected_label(today: NaiveDate, week: usize) -> String {
    format_week_label(today + Duration::weeks(week as i64))
}

/// Week offsets in the order they are processed
pub fn week_sequence(order: WeekOrder, max_weeks: usize) -> Vec<usize> {
    match order {
        WeekOrder::NearestFirst => (0..max_weeks).collect(),
        WeekOrder::FarthestFirst => (0..max_weeks).rev().collect(),
    }
}

/// Week-level moves and checks on the calendar page
pub struct CalendarNavigator<'a> {
    ui: &'a dyn CalendarUi,
    timeout: std::time::Duration,
}

impl<'a> CalendarNavigator<'a> {
    pub fn new(ui: &'a dyn CalendarUi, timeout: std::time::Duration) -> Self {
        Self { ui, timeout }
    }

    /// Fail with `UnexpectedCalendarPage` unless the header shows `label`
    pub async fn verify_week(&self, label: &str) -> Result<(), BookingError> {
        match self.ui.wait_for_week_label(label, self.timeout).await {
            Ok(()) => Ok(()),
            Err(e) if e.is_timeout() => {
                let found = match self.ui.current_page_date().await {
                    Ok(date) => format_week_label(date),
                    Err(_) => "an unreadable header".to_string(),
                };
                Err(BookingError::UnexpectedCalendarPage {
                    expected: label.to_string(),
                    found,
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn page_state(&self) -> Result<CalendarPageState, BookingError> {
        let date = self.ui.current_page_date().await?;
        Ok(CalendarPageState::from_date(date))
    }

    /// Page from week offset `from` to `to`, one week at a time
    pub async fn move_to(&self, from: usize, to: usize) -> Result<(), BookingError> {
        if from != to {
            debug!(from, to, "Moving calendar");
        }
        for _ in from..to {
            self.ui.advance_week().await?;
        }
        for _ in to..from {
            self.ui.retreat_week().await?;
        }
        Ok(())
    }
}
