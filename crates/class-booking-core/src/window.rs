use chrono::NaiveDateTime;
use serde::Serialize;
use crate::context::RunContext;

/// Where a class stands relative to its registration window at a given moment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RegistrationWindow {
    /// Class already started
    Past,
    Open,
    /// Opens within the configured opening wait; a run sleeps until then
    OpensSoon { opens_at: NaiveDateTime },
    NotYetOpen { opens_at: NaiveDateTime },
}

impl RegistrationWindow {
    pub fn classify(target: NaiveDateTime, now: NaiveDateTime, ctx: &RunContext) -> Self {
        if target < now {
            return Self::Past;
        }
        if target - now < ctx.lookahead {
            return Self::Open;
        }

        let opens_at = target - ctx.lookahead;
        match ctx.opening_wait {
            Some(wait) if opens_at - now <= wait => Self::OpensSoon { opens_at },
            _ => Self::NotYetOpen { opens_at },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, day).unwrap().and_hms_opt(hour, 0, 0).unwrap()
    }

    fn ctx() -> RunContext {
        RunContext::new(Duration::hours(168), std::time::Duration::from_secs(5))
    }

    #[test]
    fn test_past_class() {
        assert_eq!(RegistrationWindow::classify(at(9, 12), at(10, 8), &ctx()), RegistrationWindow::Past);
    }

    #[test]
    fn test_lookahead_boundary_is_not_open() {
        let now = at(10, 8);
        assert_eq!(RegistrationWindow::classify(at(17, 7), now, &ctx()), RegistrationWindow::Open);
        assert_eq!(
            RegistrationWindow::classify(at(17, 8), now, &ctx()),
            RegistrationWindow::NotYetOpen { opens_at: now }
        );
    }

    #[test]
    fn test_far_target_not_open() {
        // 200 hours ahead
        let now = at(10, 8);
        let target = now + Duration::hours(200);
        assert!(matches!(
            RegistrationWindow::classify(target, now, &ctx()),
            RegistrationWindow::NotYetOpen { .. }
        ));
    }

    #[test]
    fn test_opening_wait() {
        let now = at(10, 8);
        let target = at(17, 10);
        let ctx = ctx().with_opening_wait(Duration::hours(2));
        assert_eq!(
            RegistrationWindow::classify(target, now, &ctx),
            RegistrationWindow::OpensSoon { opens_at: at(10, 10) }
        );

        let ctx = ctx.with_opening_wait(Duration::minutes(90));
        assert_eq!(
            RegistrationWindow::classify(target, now, &ctx),
            RegistrationWindow::NotYetOpen { opens_at: at(10, 10) }
        );
    }
}
