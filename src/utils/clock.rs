use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::time::Instant;

/// Represents an entity responsible for providing time across the bot. Wall-clock time is used
/// for everything reported to the user and to the tracker, the monotonic [Instant] drives the
/// timers. Keeping both behind one trait lets tests pause tokio time and still get consistent
/// dates.
#[async_trait]
pub trait Clock: Sync + Send + 'static {
    fn time(&self) -> DateTime<Utc>;

    fn instant(&self) -> Instant;

    async fn sleep_until(&self, instant: Instant);

    /// Converts a wall-clock moment into the monotonic timeline. Moments in the past map to now.
    fn instant_at(&self, moment: DateTime<Utc>) -> Instant {
        let delay = (moment - self.time()).to_std().unwrap_or_default();
        self.instant() + delay
    }
}

pub struct DefaultClock;

#[async_trait]
impl Clock for DefaultClock {
    fn time(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn instant(&self) -> Instant {
        Instant::now()
    }

    async fn sleep_until(&self, instant: Instant) {
        tokio::time::sleep_until(instant).await;
    }
}
