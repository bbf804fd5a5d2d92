//! Collects quoted log lines and turns each burst of them into a single time entry.

use std::time::Duration;

use anyhow::Result;
use chrono::{DateTime, Utc};
use tokio::time::Instant;
use tracing::{debug, info, instrument};

use crate::{
    clock::{entities::TimeEntry, ClockState},
    command::ClockDirection,
};

/// Quiet period after the last submission before the batch is flushed.
pub const FLUSH_DELAY: Duration = Duration::from_secs(10);

/// Wait before a failed flush is tried again.
pub const RETRY_DELAY: Duration = Duration::from_secs(60);

/// Shortest entry ever recorded.
pub const MINIMUM_ENTRY_MINUTES: i64 = 15;

/// Rounds short gaps up to [MINIMUM_ENTRY_MINUTES].
pub fn billable_duration(elapsed: chrono::Duration) -> chrono::Duration {
    elapsed.max(chrono::Duration::minutes(MINIMUM_ENTRY_MINUTES))
}

pub fn confirmation(count: usize) -> String {
    match count {
        1 => "📝 Added 1 log".into(),
        count => format!("📝 Added {count} logs"),
    }
}

/// Pending log lines plus the debounce deadline. Submitting again before the deadline pushes
/// it back, so a burst of messages ends up in one entry.
pub struct LogBatcher {
    lines: Vec<String>,
    deadline: Option<Instant>,
    delay: Duration,
}

impl Default for LogBatcher {
    fn default() -> Self {
        Self::new(FLUSH_DELAY)
    }
}

impl LogBatcher {
    pub fn new(delay: Duration) -> Self {
        Self {
            lines: vec![],
            deadline: None,
            delay,
        }
    }

    /// Queues `lines` and restarts the flush timer. Any previous deadline is dropped.
    pub fn submit(&mut self, lines: impl IntoIterator<Item = String>, now: Instant) {
        self.lines.extend(lines);
        self.deadline = Some(now + self.delay);
        debug!("{} log line(s) pending", self.lines.len());
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn pending(&self) -> &[String] {
        &self.lines
    }

    /// Drops everything queued, returning how many lines were lost.
    pub fn discard(&mut self) -> usize {
        self.deadline = None;
        std::mem::take(&mut self.lines).len()
    }

    fn description(&self) -> String {
        self.lines
            .iter()
            .map(|line| format!(" * {line}"))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Writes all pending lines as one entry covering the time since the last update.
    ///
    /// Lines are only cleared once the entry is saved. A failed flush keeps them and arms the
    /// timer again with [RETRY_DELAY] counted from `instant`.
    #[instrument(skip_all, fields(lines = self.lines.len()))]
    pub async fn flush(
        &mut self,
        clock: &ClockState<'_>,
        now: DateTime<Utc>,
        instant: Instant,
    ) -> Result<usize> {
        self.deadline = None;
        if self.lines.is_empty() {
            return Ok(0);
        }

        if let Err(e) = self.save(clock, now).await {
            self.deadline = Some(instant + RETRY_DELAY);
            return Err(e);
        }

        let count = self.lines.len();
        self.lines.clear();
        info!("Flushed {count} log line(s)");
        Ok(count)
    }

    async fn save(&self, clock: &ClockState<'_>, now: DateTime<Utc>) -> Result<()> {
        clock.update(ClockDirection::In).await?;
        let since = clock.last_update_today(now).await?.unwrap_or(now);
        let duration = billable_duration(now - since);
        let entry = TimeEntry::starting_at(since, duration, clock.tz(), self.description());
        clock.create_entry(entry).await
    }
}
