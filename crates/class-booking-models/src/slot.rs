use chrono::{Datelike, NaiveDate, NaiveTime, Weekday};
use serde::Serialize;
use std::fmt;

/// A recurring class the user wants booked: one weekday at one hour.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
pub struct ClassSlot {
    weekday: Weekday,
    hour: u8,
}

impl ClassSlot {
    /// Returns `None` when `hour` is not a valid hour of the day (0-23).
    pub fn new(weekday: Weekday, hour: u8) -> Option<Self> {
        if hour > 23 {
            return None;
        }
        Some(Self { weekday, hour })
    }

    pub fn weekday(&self) -> Weekday {
        self.weekday
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    /// Start time of the class (minute and second are always zero)
    pub fn start_time(&self) -> NaiveTime {
        NaiveTime::from_hms_opt(self.hour as u32, 0, 0).unwrap_or(NaiveTime::MIN)
    }

    /// Sort key: Monday first, then by hour
    pub fn sort_key(&self) -> (u32, u8) {
        (self.weekday.num_days_from_monday(), self.hour)
    }
}

impl fmt::Display for ClassSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:02}:00", self.weekday, self.hour)
    }
}

/// Parse a weekday name as written in config files ("Monday", "mon", "TUESDAY", ...)
pub fn parse_weekday(name: &str) -> Option<Weekday> {
    name.trim().parse::<Weekday>().ok()
}

/// The week the calendar page is currently displaying
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct CalendarPageState {
    pub reference_date: NaiveDate,
    /// Days since Monday of `reference_date`
    pub weekday_index: u32,
}

impl CalendarPageState {
    pub fn from_date(reference_date: NaiveDate) -> Self {
        Self {
            reference_date,
            weekday_index: reference_date.weekday().num_days_from_monday(),
        }
    }
}

/// Key used by the portal layer to find a class block on the calendar page
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
pub struct SlotKey {
    pub date: NaiveDate,
    pub start: NaiveTime,
}

impl SlotKey {
    /// Date as it appears in the class block element ids (`YYYY-MM-DD`)
    pub fn date_id(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }

    /// Start time as printed in the class block text (`HH:MM`)
    pub fn start_label(&self) -> String {
        self.start.format("%H:%M").to_string()
    }
}

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.date_id(), self.start_label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_slot_rejects_invalid_hour() {
        assert!(ClassSlot::new(Weekday::Mon, 23).is_some());
        assert!(ClassSlot::new(Weekday::Mon, 24).is_none());
    }

    #[test]
    fn test_parse_weekday_accepts_config_spellings() {
        assert_eq!(parse_weekday("Monday"), Some(Weekday::Mon));
        assert_eq!(parse_weekday("wed"), Some(Weekday::Wed));
        assert_eq!(parse_weekday(" FRIDAY "), Some(Weekday::Fri));
        assert_eq!(parse_weekday("Funday"), None);
    }

    #[test]
    fn test_calendar_page_state_weekday_index() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 12).unwrap(); // Wednesday
        let state = CalendarPageState::from_date(date);
        assert_eq!(state.weekday_index, 2);
    }

    #[test]
    fn test_slot_key_labels() {
        let key = SlotKey {
            date: NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(),
            start: NaiveTime::from_hms_opt(7, 0, 0).unwrap(),
        };
        assert_eq!(key.date_id(), "2024-06-03");
        assert_eq!(key.start_label(), "07:00");
    }
}
