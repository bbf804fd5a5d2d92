//! Derives the user's clock state from what the time tracker reports.
//!
//! The free functions work on already fetched data. [ClockState] fetches it and also performs
//! clock-in and clock-out.

pub mod entities;

use std::{cmp::Reverse, fmt::Display};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use entities::{ClockRecord, TimeEntry, TimeEntryQuery};
use tracing::{debug, info, instrument};

use crate::{
    api::TimeTracker,
    command::ClockDirection,
    utils::time::{day_start, format_duration, format_time_of_day},
};

pub fn is_clocked_in(records: &[ClockRecord]) -> bool {
    records.first().is_some_and(ClockRecord::is_open)
}

/// Most recent entry that ends after the start of the current day.
pub fn latest_entry_today<'a>(
    entries: &'a [TimeEntry],
    now: DateTime<Utc>,
    tz: Tz,
) -> Option<&'a TimeEntry> {
    let today = day_start(now, tz);
    let mut entries = entries.iter().collect::<Vec<_>>();
    // Stable, so entries with the same start keep the tracker's order.
    entries.sort_by_key(|entry| Reverse(entry.start(tz)));
    entries.into_iter().find(|entry| entry.end(tz) > today)
}

/// End of today's latest entry, or the start of the open clock-in if nothing was logged today.
pub fn last_update_today(
    records: &[ClockRecord],
    entries: &[TimeEntry],
    now: DateTime<Utc>,
    tz: Tz,
) -> Option<DateTime<Utc>> {
    latest_entry_today(entries, now, tz)
        .map(|entry| entry.end(tz))
        .or_else(|| {
            records
                .first()
                .filter(|record| record.is_open())
                .map(|record| record.clock_in_time)
        })
}

pub fn status_message(
    records: &[ClockRecord],
    entries: &[TimeEntry],
    now: DateTime<Utc>,
    tz: Tz,
) -> String {
    match records.first() {
        Some(ClockRecord {
            clock_in_time,
            clock_out_time: None,
        }) => {
            let mut message = format!(
                "🟢 You've been clocked in since {}.",
                format_time_of_day(*clock_in_time, tz)
            );
            if let Some(entry) = latest_entry_today(entries, now, tz) {
                message.push_str(&format!(
                    " Your last log was {} ({}-{}): {}",
                    format_duration(entry.duration()),
                    format_time_of_day(entry.start(tz), tz),
                    format_time_of_day(entry.end(tz), tz),
                    entry.description
                ));
            }
            message
        }
        Some(ClockRecord {
            clock_in_time,
            clock_out_time: Some(clock_out_time),
        }) => format!(
            "🔴 You're clocked out. Your last session was {}-{}.",
            format_time_of_day(*clock_in_time, tz),
            format_time_of_day(*clock_out_time, tz)
        ),
        None => "🔴 You haven't clocked in yet.".into(),
    }
}

/// What a clock-in or clock-out request ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockOutcome {
    Updated(ClockDirection),
    /// The user was already in the requested state, the tracker wasn't called.
    Unchanged(ClockDirection),
}

impl Display for ClockOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClockOutcome::Updated(direction) => write!(f, "✅ Clocked you {direction}"),
            ClockOutcome::Unchanged(direction) => write!(f, "You're already clocked {direction}"),
        }
    }
}

/// View of the user's clock backed by the time tracker.
pub struct ClockState<'a> {
    tracker: &'a dyn TimeTracker,
    project: &'a str,
    tz: Tz,
}

impl<'a> ClockState<'a> {
    pub fn new(tracker: &'a dyn TimeTracker, project: &'a str, tz: Tz) -> Self {
        Self {
            tracker,
            project,
            tz,
        }
    }

    pub fn tz(&self) -> Tz {
        self.tz
    }

    async fn clock_records(&self) -> Result<Vec<ClockRecord>> {
        self.tracker
            .list_clock_ins()
            .await
            .context("Failed to fetch clock history")
    }

    async fn time_entries(&self) -> Result<Vec<TimeEntry>> {
        self.tracker
            .list_time_entries(self.project, TimeEntryQuery::latest())
            .await
            .context("Failed to fetch time entries")
    }

    pub async fn is_clocked_in(&self) -> Result<bool> {
        Ok(is_clocked_in(&self.clock_records().await?))
    }

    pub async fn last_update_today(&self, now: DateTime<Utc>) -> Result<Option<DateTime<Utc>>> {
        let records = self.clock_records().await?;
        let entries = self.time_entries().await?;
        Ok(last_update_today(&records, &entries, now, self.tz))
    }

    pub async fn status_message(&self, now: DateTime<Utc>) -> Result<String> {
        let records = self.clock_records().await?;
        let entries = self.time_entries().await?;
        Ok(status_message(&records, &entries, now, self.tz))
    }

    pub async fn create_entry(&self, entry: TimeEntry) -> Result<()> {
        self.tracker
            .create_time_entry(self.project, entry)
            .await
            .context("Failed to save your logs")
    }

    /// Moves the clock in `direction` unless it is already there.
    #[instrument(skip(self))]
    pub async fn update(&self, direction: ClockDirection) -> Result<ClockOutcome> {
        let clocked_in = self.is_clocked_in().await?;
        match (direction, clocked_in) {
            (ClockDirection::In, true) | (ClockDirection::Out, false) => {
                debug!("Clock is already {direction}");
                return Ok(ClockOutcome::Unchanged(direction));
            }
            (ClockDirection::In, false) => {
                self.tracker.clock_in().await.context("Failed to clock in")?
            }
            (ClockDirection::Out, true) => {
                self.tracker.clock_out().await.context("Failed to clock out")?
            }
        }
        info!("Clocked {direction}");
        Ok(ClockOutcome::Updated(direction))
    }
}
