use chrono::NaiveDate;

// "Monday 10 Jun, 2024" in the English portal UI
const WEEK_LABEL_FORMAT: &str = "%A %-d %b, %Y";
const WEEK_LABEL_PARSE_FORMAT: &str = "%A %d %b, %Y";

/// Header text the calendar shows when `date` is the selected day
pub fn format_week_label(date: NaiveDate) -> String {
    date.format(WEEK_LABEL_FORMAT).to_string()
}

/// Parse the calendar header back into a date. The header may carry extra
/// lines around the label, so each line is tried on its own.
pub fn parse_week_label(text: &str) -> Option<NaiveDate> {
    let trimmed = text.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, WEEK_LABEL_PARSE_FORMAT) {
        return Some(date);
    }
    trimmed
        .lines()
        .map(str::trim)
        .find_map(|line| NaiveDate::parse_from_str(line, WEEK_LABEL_PARSE_FORMAT).ok())
}
