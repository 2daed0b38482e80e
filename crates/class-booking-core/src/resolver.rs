use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use class_booking_models::{CalendarPageState, ClassSlot, SlotKey};

/// Date and start time of `slot` inside the week that contains
/// `reference_date` (weeks run Monday to Sunday). The offset may be
/// negative when the slot's weekday is earlier than the reference day.
pub fn resolve(slot: ClassSlot, reference_date: NaiveDate) -> NaiveDateTime {
    resolve_on_page(slot, &CalendarPageState::from_date(reference_date))
}

pub fn resolve_on_page(slot: ClassSlot, page: &CalendarPageState) -> NaiveDateTime {
    let offset = slot.weekday().num_days_from_monday() as i64 - page.weekday_index as i64;
    let date = page.reference_date + Duration::days(offset);
    date.and_time(slot.start_time())
}

pub fn slot_key(target: NaiveDateTime) -> SlotKey {
    SlotKey {
        date: target.date(),
        start: target.time(),
    }
}
