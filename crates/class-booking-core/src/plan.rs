use chrono::{Duration, NaiveDateTime};
use class_booking_models::{CalendarPageState, ClassSlot};
use serde::Serialize;
use crate::context::RunContext;
use crate::navigator::week_sequence;
use crate::resolver::resolve_on_page;
use crate::window::RegistrationWindow;

/// A class the next run would consider, and whether it could be booked now
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PlannedTarget {
    pub week: usize,
    pub slot: ClassSlot,
    pub target: NaiveDateTime,
    pub window: RegistrationWindow,
}

/// Targets a run starting at `now` would visit, in visiting order. Mirrors
/// the calendar pages a run shows: week `k` is `today + 7k` days.
pub fn plan_targets(
    slots: &[ClassSlot],
    max_weeks: usize,
    now: NaiveDateTime,
    ctx: &RunContext,
) -> Vec<PlannedTarget> {
    let today = now.date();
    week_sequence(ctx.week_order, max_weeks)
        .into_iter()
        .flat_map(|week| {
            let page = CalendarPageState::from_date(today + Duration::weeks(week as i64));
            slots.iter().map(move |slot| {
                let target = resolve_on_page(*slot, &page);
                PlannedTarget {
                    week,
                    slot: *slot,
                    target,
                    window: RegistrationWindow::classify(target, now, ctx),
                }
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::at;
    use chrono::Weekday;
    use class_booking_config::{BookingOptions, WeekOrder};

    #[test]
    fn test_plan_lists_every_week() {
        let ctx = RunContext::new(Duration::hours(168), std::time::Duration::from_secs(5));
        let slots = vec![
            ClassSlot::new(Weekday::Mon, 7).unwrap(),
            ClassSlot::new(Weekday::Fri, 18).unwrap(),
        ];

        let plan = plan_targets(&slots, 2, at(12, 8), &ctx);

        let targets: Vec<_> = plan.iter().map(|p| p.target).collect();
        assert_eq!(targets, vec![at(10, 7), at(14, 18), at(17, 7), at(21, 18)]);
        assert_eq!(plan[0].window, RegistrationWindow::Past);
        assert_eq!(plan[1].window, RegistrationWindow::Open);
        assert_eq!(plan[2].window, RegistrationWindow::Open);
        assert_eq!(plan[3].window, RegistrationWindow::NotYetOpen { opens_at: at(14, 18) });
    }

    #[test]
    fn test_plan_follows_week_order() {
        let ctx = RunContext::new(Duration::hours(336), std::time::Duration::from_secs(5))
            .with_week_order(WeekOrder::FarthestFirst);
        let slots = vec![ClassSlot::new(Weekday::Wed, 12).unwrap()];

        let plan = plan_targets(&slots, 3, at(10, 8), &ctx);

        let weeks: Vec<_> = plan.iter().map(|p| p.week).collect();
        assert_eq!(weeks, vec![2, 1, 0]);
        assert_eq!(plan[0].target, at(26, 12));
    }

    #[test]
    fn test_default_weeks_reach_every_bookable_class() {
        // Sunday 16 June 08:00 with the default two-week lookahead
        let options = BookingOptions::default();
        let ctx = RunContext::from_options(&options);
        let slots = vec![
            ClassSlot::new(Weekday::Tue, 12).unwrap(),
            ClassSlot::new(Weekday::Sun, 9).unwrap(),
        ];
        let now = at(16, 8);

        let plan = plan_targets(&slots, options.weeks(), now, &ctx);

        let open: Vec<_> = plan
            .iter()
            .filter(|p| p.window == RegistrationWindow::Open)
            .map(|p| p.target)
            .collect();
        for target in [at(16, 9), at(18, 12), at(23, 9), at(25, 12)] {
            assert!(target - now < ctx.lookahead);
            assert!(open.contains(&target), "{} is bookable but not planned", target);
        }
        assert!(plan
            .iter()
            .any(|p| p.target == at(30, 9) && matches!(p.window, RegistrationWindow::NotYetOpen { .. })));
    }
}
