//! In-memory calendar and clock for engine and orchestrator tests

use async_trait::async_trait;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use class_booking_models::SlotKey;
use class_booking_portal::{format_week_label, CalendarUi, DialogState, DialogVariant, SlotHandle, UiError};
use std::collections::HashMap;
use std::sync::Mutex;
use crate::clock::Clock;

pub fn at(day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 6, day).unwrap().and_hms_opt(hour, 0, 0).unwrap()
}

pub struct ManualClock {
    now: Mutex<NaiveDateTime>,
    pub sleeps: Mutex<Vec<NaiveDateTime>>,
}

impl ManualClock {
    pub fn new(now: NaiveDateTime) -> Self {
        Self {
            now: Mutex::new(now),
            sleeps: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl Clock for ManualClock {
    fn now(&self) -> NaiveDateTime {
        *self.now.lock().unwrap()
    }

    async fn sleep_until(&self, instant: NaiveDateTime) {
        self.sleeps.lock().unwrap().push(instant);
        let mut now = self.now.lock().unwrap();
        if instant > *now {
            *now = instant;
        }
    }
}

#[derive(Debug, Clone)]
pub struct FakeSlot {
    pub text: String,
    /// Dialog shown when the register icon is clicked
    pub dialog: Option<DialogState>,
}

impl FakeSlot {
    pub fn bookable() -> Self {
        Self::with_dialog("CrossFit\n12:00 - 13:00", DialogVariant::BookingConfirmation, "Register for this class?")
    }

    pub fn with_text(text: &str) -> Self {
        Self {
            text: text.to_string(),
            dialog: None,
        }
    }

    pub fn with_dialog(text: &str, variant: DialogVariant, dialog_text: &str) -> Self {
        Self {
            text: text.to_string(),
            dialog: Some(DialogState {
                variant,
                text: dialog_text.to_string(),
            }),
        }
    }
}

#[derive(Debug, Default)]
pub struct FakeState {
    pub week: i64,
    pub slots: HashMap<String, FakeSlot>,
    /// Header text override, used to simulate a calendar stuck on the wrong week
    pub header_override: Option<String>,
    pub open_dialog: Option<DialogState>,
    pub lookups: Vec<SlotKey>,
    pub clicks: Vec<String>,
    pub confirms: usize,
    pub dismissed: Vec<DialogVariant>,
    pub captures: Vec<String>,
    pub moves: Vec<i64>,
    pub success_message: bool,
    /// Make `dismiss` time out, leaving the dialog open
    pub dismiss_fails: bool,
}

/// Calendar whose week 0 header shows `today`
pub struct FakeCalendar {
    today: NaiveDate,
    pub state: Mutex<FakeState>,
}

impl FakeCalendar {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today,
            state: Mutex::new(FakeState {
                success_message: true,
                ..FakeState::default()
            }),
        }
    }

    pub fn add_slot(&self, target: NaiveDateTime, slot: FakeSlot) {
        let key = crate::resolver::slot_key(target);
        self.state.lock().unwrap().slots.insert(key.to_string(), slot);
    }

    fn page_date(&self, state: &FakeState) -> NaiveDate {
        self.today + Duration::days(7 * state.week)
    }

    fn timeout(what: &str) -> UiError {
        UiError::timeout(what, std::time::Duration::from_secs(5))
    }
}

#[async_trait]
impl CalendarUi for FakeCalendar {
    async fn current_page_date(&self) -> Result<NaiveDate, UiError> {
        let state = self.state.lock().unwrap();
        Ok(self.page_date(&state))
    }

    async fn wait_for_week_label(&self, label: &str, _timeout: std::time::Duration) -> Result<(), UiError> {
        let state = self.state.lock().unwrap();
        let header = state
            .header_override
            .clone()
            .unwrap_or_else(|| format_week_label(self.page_date(&state)));
        if header.contains(label) {
            Ok(())
        } else {
            Err(Self::timeout(label))
        }
    }

    async fn advance_week(&self) -> Result<(), UiError> {
        let mut state = self.state.lock().unwrap();
        state.week += 1;
        state.moves.push(1);
        Ok(())
    }

    async fn retreat_week(&self) -> Result<(), UiError> {
        let mut state = self.state.lock().unwrap();
        state.week -= 1;
        state.moves.push(-1);
        Ok(())
    }

    async fn find_slot(&self, key: &SlotKey) -> Result<Option<SlotHandle>, UiError> {
        let mut state = self.state.lock().unwrap();
        state.lookups.push(*key);
        let id = key.to_string();
        Ok(state.slots.contains_key(&id).then_some(SlotHandle { element_id: id }))
    }

    async fn read_text(&self, slot: &SlotHandle) -> Result<String, UiError> {
        let state = self.state.lock().unwrap();
        state
            .slots
            .get(&slot.element_id)
            .map(|s| s.text.clone())
            .ok_or_else(|| UiError::UnexpectedContent(slot.element_id.clone()))
    }

    async fn click_register(&self, slot: &SlotHandle) -> Result<(), UiError> {
        let mut state = self.state.lock().unwrap();
        state.clicks.push(slot.element_id.clone());
        state.open_dialog = state.slots.get(&slot.element_id).and_then(|s| s.dialog.clone());
        Ok(())
    }

    async fn wait_for_any_dialog(
        &self,
        variants: &[DialogVariant],
        _timeout: std::time::Duration,
    ) -> Result<DialogState, UiError> {
        let state = self.state.lock().unwrap();
        match &state.open_dialog {
            Some(dialog) if variants.contains(&dialog.variant) => Ok(dialog.clone()),
            _ => Err(Self::timeout("dialog")),
        }
    }

    async fn confirm_booking(&self) -> Result<(), UiError> {
        let mut state = self.state.lock().unwrap();
        state.confirms += 1;
        state.open_dialog = state.success_message.then(|| DialogState {
            variant: DialogVariant::Alert,
            text: "Message\nYou are registered".to_string(),
        });
        Ok(())
    }

    async fn wait_for_success(&self, _timeout: std::time::Duration) -> Result<(), UiError> {
        let state = self.state.lock().unwrap();
        match &state.open_dialog {
            Some(dialog) if dialog.variant == DialogVariant::Alert => Ok(()),
            _ => Err(Self::timeout("booking success message")),
        }
    }

    async fn dismiss(&self, variant: DialogVariant) -> Result<(), UiError> {
        let mut state = self.state.lock().unwrap();
        if state.dismiss_fails {
            return Err(Self::timeout("dialog to close"));
        }
        state.dismissed.push(variant);
        state.open_dialog = None;
        Ok(())
    }

    async fn capture_failure(&self, label: &str) {
        self.state.lock().unwrap().captures.push(label.to_string());
    }
}
