use chrono::NaiveDateTime;
use class_booking_models::{RegistrationOutcome, SkipReason};
use class_booking_portal::{CalendarUi, DialogVariant};
use tracing::{debug, info, instrument, warn};
use crate::clock::Clock;
use crate::context::RunContext;
use crate::error::BookingError;
use crate::resolver::slot_key;
use crate::window::RegistrationWindow;

const MEMBERSHIP_EXHAUSTED_MARKER: &str = "new membership";

/// What the class block text says about the member's registration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotStatus {
    /// Confirmed or on the waiting list
    Registered,
    Canceled,
    Open,
}

/// Classify the class block text. Registration markers win over the
/// cancel marker.
pub fn classify_status(text: &str) -> SlotStatus {
    let text = text.to_lowercase();
    if text.contains("confirm") || text.contains("waiting") {
        SlotStatus::Registered
    } else if text.contains("cancel") {
        SlotStatus::Canceled
    } else {
        SlotStatus::Open
    }
}

#[derive(Debug, Clone, Copy)]
enum AttemptState {
    Idle,
    AwaitingDialog,
    Confirming,
    AwaitingSuccess,
    Done,
    Aborted,
}

/// Registration attempt for one class: skip checks, status check, then the
/// click and dialog sequence.
pub struct AttemptEngine<'a> {
    ui: &'a dyn CalendarUi,
    clock: &'a dyn Clock,
    ctx: &'a RunContext,
}

impl<'a> AttemptEngine<'a> {
    pub fn new(ui: &'a dyn CalendarUi, clock: &'a dyn Clock, ctx: &'a RunContext) -> Self {
        Self { ui, clock, ctx }
    }

    fn enter(&self, target: NaiveDateTime, state: AttemptState) {
        debug!(class_at = %target, state = ?state, "Registration attempt state");
    }

    #[instrument(skip_all, fields(class_at = %target))]
    pub async fn attempt(&self, target: NaiveDateTime) -> Result<RegistrationOutcome, BookingError> {
        self.enter(target, AttemptState::Idle);

        match RegistrationWindow::classify(target, self.clock.now(), self.ctx) {
            RegistrationWindow::Past => return Ok(RegistrationOutcome::Skipped(SkipReason::Past)),
            RegistrationWindow::NotYetOpen { .. } => {
                return Ok(RegistrationOutcome::Skipped(SkipReason::TooFarInFuture))
            }
            RegistrationWindow::OpensSoon { opens_at } => {
                info!(opens_at = %opens_at, "Waiting for registration to open");
                self.clock.sleep_until(opens_at).await;
            }
            RegistrationWindow::Open => {}
        }

        let key = slot_key(target);
        let slot = self
            .ui
            .find_slot(&key)
            .await?
            .ok_or(BookingError::SlotNotFound { target })?;

        let status = self.ui.read_text(&slot).await?;
        match classify_status(&status) {
            SlotStatus::Registered => return Ok(RegistrationOutcome::AlreadyRegistered),
            SlotStatus::Canceled => return Err(BookingError::ClassCanceled { target }),
            SlotStatus::Open => {}
        }

        self.ui.click_register(&slot).await?;
        self.enter(target, AttemptState::AwaitingDialog);
        let dialog = self
            .ui
            .wait_for_any_dialog(&DialogVariant::AFTER_REGISTER_CLICK, self.ctx.ui_timeout)
            .await?;

        match dialog.variant {
            DialogVariant::Alert => {
                let message = dialog.text.trim().to_string();
                let error = if message.to_lowercase().contains(MEMBERSHIP_EXHAUSTED_MARKER) {
                    self.enter(target, AttemptState::Aborted);
                    BookingError::OutOfMembership { message }
                } else {
                    BookingError::RegistrationRejected { target, message }
                };
                // The alert decides the outcome even when it will not close
                if let Err(e) = self.ui.dismiss(DialogVariant::Alert).await {
                    warn!(error = %e, "Could not dismiss registration alert");
                }
                Err(error)
            }
            DialogVariant::Unregister => {
                self.ui.dismiss(DialogVariant::Unregister).await?;
                Ok(RegistrationOutcome::AlreadyRegistered)
            }
            DialogVariant::BookingConfirmation => {
                self.enter(target, AttemptState::Confirming);
                self.ui.confirm_booking().await?;
                self.enter(target, AttemptState::AwaitingSuccess);
                self.ui.wait_for_success(self.ctx.ui_timeout).await?;
                self.ui.dismiss(DialogVariant::Alert).await?;
                self.enter(target, AttemptState::Done);
                Ok(RegistrationOutcome::NewlyRegistered)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{at, FakeCalendar, FakeSlot, ManualClock};
    use chrono::Duration;

    fn ctx() -> RunContext {
        RunContext::new(Duration::hours(168), std::time::Duration::from_secs(5))
    }

    async fn attempt_with(
        ui: &FakeCalendar,
        clock: &ManualClock,
        ctx: &RunContext,
        target: NaiveDateTime,
    ) -> Result<RegistrationOutcome, BookingError> {
        AttemptEngine::new(ui, clock, ctx).attempt(target).await
    }

    #[test]
    fn test_classify_status() {
        assert_eq!(classify_status("Confirmed\nCrossFit\n12:00 - 13:00"), SlotStatus::Registered);
        assert_eq!(classify_status("On the WAITING list"), SlotStatus::Registered);
        assert_eq!(classify_status("Canceled"), SlotStatus::Canceled);
        assert_eq!(classify_status("CrossFit\n12:00 - 13:00"), SlotStatus::Open);
    }

    #[tokio::test]
    async fn test_past_class_is_skipped_without_ui() {
        let ui = FakeCalendar::new(at(10, 8).date());
        let clock = ManualClock::new(at(10, 8));
        let outcome = attempt_with(&ui, &clock, &ctx(), at(9, 12)).await.unwrap();
        assert_eq!(outcome, RegistrationOutcome::Skipped(SkipReason::Past));
        assert!(ui.state.lock().unwrap().lookups.is_empty());
    }

    #[tokio::test]
    async fn test_class_beyond_lookahead_is_skipped() {
        let ui = FakeCalendar::new(at(10, 8).date());
        let clock = ManualClock::new(at(10, 8));
        let target = at(10, 8) + Duration::hours(200);
        let outcome = attempt_with(&ui, &clock, &ctx(), target).await.unwrap();
        assert_eq!(outcome, RegistrationOutcome::Skipped(SkipReason::TooFarInFuture));
        assert!(ui.state.lock().unwrap().lookups.is_empty());
    }

    #[tokio::test]
    async fn test_confirmed_class_is_not_clicked() {
        let ui = FakeCalendar::new(at(10, 8).date());
        ui.add_slot(at(12, 12), FakeSlot::with_text("Confirmed\nCrossFit\n12:00 - 13:00"));
        let clock = ManualClock::new(at(10, 8));

        let outcome = attempt_with(&ui, &clock, &ctx(), at(12, 12)).await.unwrap();
        assert_eq!(outcome, RegistrationOutcome::AlreadyRegistered);
        assert!(ui.state.lock().unwrap().clicks.is_empty());
    }

    #[tokio::test]
    async fn test_canceled_class_is_not_clicked() {
        let ui = FakeCalendar::new(at(10, 8).date());
        ui.add_slot(at(12, 12), FakeSlot::with_text("Canceled"));
        let clock = ManualClock::new(at(10, 8));

        let error = attempt_with(&ui, &clock, &ctx(), at(12, 12)).await.unwrap_err();
        assert!(matches!(error, BookingError::ClassCanceled { target } if target == at(12, 12)));
        assert!(ui.state.lock().unwrap().clicks.is_empty());
    }

    #[tokio::test]
    async fn test_fresh_class_is_booked() {
        let ui = FakeCalendar::new(at(10, 8).date());
        ui.add_slot(at(12, 12), FakeSlot::bookable());
        let clock = ManualClock::new(at(10, 8));

        let outcome = attempt_with(&ui, &clock, &ctx(), at(12, 12)).await.unwrap();
        assert_eq!(outcome, RegistrationOutcome::NewlyRegistered);

        let state = ui.state.lock().unwrap();
        assert_eq!(state.clicks.len(), 1);
        assert_eq!(state.confirms, 1);
        assert_eq!(state.dismissed, vec![DialogVariant::Alert]);
    }

    #[tokio::test]
    async fn test_missing_success_message_times_out() {
        let ui = FakeCalendar::new(at(10, 8).date());
        ui.add_slot(at(12, 12), FakeSlot::bookable());
        ui.state.lock().unwrap().success_message = false;
        let clock = ManualClock::new(at(10, 8));

        let error = attempt_with(&ui, &clock, &ctx(), at(12, 12)).await.unwrap_err();
        assert!(matches!(error, BookingError::UiTimeout { .. }));
        assert!(!error.is_run_fatal());
    }

    #[tokio::test]
    async fn test_unregister_dialog_means_already_registered() {
        let ui = FakeCalendar::new(at(10, 8).date());
        ui.add_slot(
            at(12, 12),
            FakeSlot::with_dialog("CrossFit", DialogVariant::Unregister, "Do you want to unregister?"),
        );
        let clock = ManualClock::new(at(10, 8));

        let outcome = attempt_with(&ui, &clock, &ctx(), at(12, 12)).await.unwrap();
        assert_eq!(outcome, RegistrationOutcome::AlreadyRegistered);
        assert_eq!(ui.state.lock().unwrap().dismissed, vec![DialogVariant::Unregister]);
    }

    #[tokio::test]
    async fn test_membership_alert_is_fatal() {
        let ui = FakeCalendar::new(at(10, 8).date());
        ui.add_slot(
            at(12, 12),
            FakeSlot::with_dialog("CrossFit", DialogVariant::Alert, "Please buy a New Membership to register"),
        );
        let clock = ManualClock::new(at(10, 8));

        let error = attempt_with(&ui, &clock, &ctx(), at(12, 12)).await.unwrap_err();
        assert!(matches!(error, BookingError::OutOfMembership { .. }));
        assert!(error.is_run_fatal());
        let state = ui.state.lock().unwrap();
        assert_eq!(state.dismissed, vec![DialogVariant::Alert]);
        assert_eq!(state.confirms, 0);
    }

    #[tokio::test]
    async fn test_membership_alert_is_fatal_when_it_will_not_close() {
        let ui = FakeCalendar::new(at(10, 8).date());
        ui.add_slot(
            at(12, 12),
            FakeSlot::with_dialog("CrossFit", DialogVariant::Alert, "Please buy a new membership"),
        );
        ui.state.lock().unwrap().dismiss_fails = true;
        let clock = ManualClock::new(at(10, 8));

        let error = attempt_with(&ui, &clock, &ctx(), at(12, 12)).await.unwrap_err();
        assert!(matches!(error, BookingError::OutOfMembership { .. }));
        assert!(error.is_run_fatal());
    }

    #[tokio::test]
    async fn test_other_alert_rejects_the_slot() {
        let ui = FakeCalendar::new(at(10, 8).date());
        ui.add_slot(at(12, 12), FakeSlot::with_dialog("CrossFit", DialogVariant::Alert, "Class is full"));
        let clock = ManualClock::new(at(10, 8));

        let error = attempt_with(&ui, &clock, &ctx(), at(12, 12)).await.unwrap_err();
        match error {
            BookingError::RegistrationRejected { message, .. } => assert_eq!(message, "Class is full"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_slot() {
        let ui = FakeCalendar::new(at(10, 8).date());
        let clock = ManualClock::new(at(10, 8));
        let error = attempt_with(&ui, &clock, &ctx(), at(12, 12)).await.unwrap_err();
        assert!(matches!(error, BookingError::SlotNotFound { .. }));
    }

    #[tokio::test]
    async fn test_no_dialog_after_click_times_out() {
        let ui = FakeCalendar::new(at(10, 8).date());
        ui.add_slot(at(12, 12), FakeSlot::with_text("CrossFit"));
        let clock = ManualClock::new(at(10, 8));
        let error = attempt_with(&ui, &clock, &ctx(), at(12, 12)).await.unwrap_err();
        assert!(matches!(error, BookingError::UiTimeout { .. }));
    }

    #[tokio::test]
    async fn test_opening_wait_sleeps_then_books() {
        let ui = FakeCalendar::new(at(10, 8).date());
        ui.add_slot(at(17, 9), FakeSlot::bookable());
        let clock = ManualClock::new(at(10, 8));
        let ctx = ctx().with_opening_wait(Duration::hours(2));

        let outcome = attempt_with(&ui, &clock, &ctx, at(17, 9)).await.unwrap();
        assert_eq!(outcome, RegistrationOutcome::NewlyRegistered);
        assert_eq!(*clock.sleeps.lock().unwrap(), vec![at(10, 9)]);
        assert_eq!(clock.now(), at(10, 9));
    }

    #[tokio::test]
    async fn test_opening_wait_too_short_skips() {
        let ui = FakeCalendar::new(at(10, 8).date());
        ui.add_slot(at(17, 9), FakeSlot::bookable());
        let clock = ManualClock::new(at(10, 8));
        let ctx = ctx().with_opening_wait(Duration::minutes(30));

        let outcome = attempt_with(&ui, &clock, &ctx, at(17, 9)).await.unwrap();
        assert_eq!(outcome, RegistrationOutcome::Skipped(SkipReason::TooFarInFuture));
        assert!(clock.sleeps.lock().unwrap().is_empty());
    }
}
