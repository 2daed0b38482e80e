use async_trait::async_trait;
use chrono::{Local, NaiveDate, NaiveDateTime};

/// Source of "now" for skip decisions and the registration opening wait.
/// Times are wall-clock local time, the same time the portal prints.
#[async_trait]
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;

    fn today(&self) -> NaiveDate {
        self.now().date()
    }

    /// Return once `instant` has passed. Returns at once for past instants.
    async fn sleep_until(&self, instant: NaiveDateTime);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

#[async_trait]
impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }

    async fn sleep_until(&self, instant: NaiveDateTime) {
        if let Ok(wait) = (instant - self.now()).to_std() {
            tokio::time::sleep(wait).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_system_clock_does_not_sleep_for_past_instants() {
        let clock = SystemClock;
        let past = clock.now() - chrono::Duration::hours(1);
        tokio::time::timeout(std::time::Duration::from_secs(1), clock.sleep_until(past))
            .await
            .unwrap();
    }
}
