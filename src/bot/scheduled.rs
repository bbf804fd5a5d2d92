//! Actions triggered by the session's recurring jobs.

use std::time::Duration;

use anyhow::Result;
use chrono::{DateTime, TimeDelta, Timelike, Utc};

use crate::{
    clock::{ClockOutcome, ClockState},
    command::ClockDirection,
    utils::time::humanize,
};

/// Delay between the clock-out warning and the automatic clock-out.
pub const AUTO_CLOCK_OUT_DELAY: Duration = Duration::from_secs(15 * 60);

/// Delay used when the user postpones the automatic clock-out.
pub const POSTPONED_CLOCK_OUT_DELAY: Duration = Duration::from_secs(30 * 60);

pub const CLOCK_OUT_WARNING: &str =
    "⏳ I'll clock you out in 15 minutes. Send \"no clock out\" if you're still working.";

pub const CLOCK_OUT_POSTPONED: &str = "👍 Okay, I'll hold off for another 30 minutes.";

/// Greeting for a local hour of day. The comparisons are strict so 12, 16 and 20 o'clock, like
/// anything after 20, get the morning greeting.
pub fn greeting(hour: u32) -> &'static str {
    if hour > 12 && hour < 16 {
        "Good afternoon"
    } else if hour > 16 && hour < 20 {
        "Good evening"
    } else {
        "Good morning"
    }
}

/// Clocks the user in for the day unless they already are.
pub async fn auto_clock_in(
    clock: &ClockState<'_>,
    first_name: &str,
    now: DateTime<Utc>,
) -> Result<String> {
    let greeting = greeting(now.with_timezone(&clock.tz()).hour());
    let message = match clock.update(ClockDirection::In).await? {
        ClockOutcome::Updated(_) => format!("☀️ {greeting} {first_name}! I've clocked you in."),
        ClockOutcome::Unchanged(_) => {
            format!("☀️ {greeting} {first_name}! You're already clocked in.")
        }
    };
    Ok(message)
}

/// Nudge to log activity. Mentions the last update when there was one today.
///
/// Entries are rounded up to a minimum length, so the last update can end after `now`. That
/// counts as no time passed.
pub async fn activity_prompt(clock: &ClockState<'_>, now: DateTime<Utc>) -> Result<String> {
    let mut message = "⏰ What have you been working on?".to_string();
    if let Some(last_update) = clock.last_update_today(now).await? {
        let elapsed = (now - last_update).max(TimeDelta::zero());
        message.push_str(&format!(" Your last update was {} ago.", humanize(elapsed)));
    }
    Ok(message)
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use chrono::{DateTime, TimeZone, Utc};
    use chrono_tz::Europe::Dublin;

    use super::{activity_prompt, auto_clock_in, greeting};
    use crate::{
        api::MockTimeTracker,
        clock::{
            entities::{ClockRecord, TimeEntry},
            ClockState,
        },
    };

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, hour, minute, 0).unwrap()
    }

    #[test]
    fn greeting_buckets_with_strict_boundaries() {
        assert_eq!(greeting(9), "Good morning");
        assert_eq!(greeting(12), "Good morning");
        assert_eq!(greeting(13), "Good afternoon");
        assert_eq!(greeting(16), "Good morning");
        assert_eq!(greeting(17), "Good evening");
        assert_eq!(greeting(20), "Good morning");
        assert_eq!(greeting(23), "Good morning");
    }

    #[tokio::test]
    async fn auto_clock_in_greets_and_clocks_in() -> Result<()> {
        let mut tracker = MockTimeTracker::new();
        tracker.expect_list_clock_ins().returning(|| Ok(vec![]));
        tracker.expect_clock_in().times(1).returning(|| Ok(()));

        let clock = ClockState::new(&tracker, "proj", Dublin);
        let message = auto_clock_in(&clock, "Jane", at(9, 15)).await?;

        assert_eq!(message, "☀️ Good morning Jane! I've clocked you in.");
        Ok(())
    }

    #[tokio::test]
    async fn auto_clock_in_when_already_in() -> Result<()> {
        let mut tracker = MockTimeTracker::new();
        tracker.expect_list_clock_ins().returning(|| {
            Ok(vec![ClockRecord {
                clock_in_time: at(8, 0),
                clock_out_time: None,
            }])
        });
        tracker.expect_clock_in().never();

        let clock = ClockState::new(&tracker, "proj", Dublin);
        let message = auto_clock_in(&clock, "Jane", at(14, 0)).await?;

        assert_eq!(message, "☀️ Good afternoon Jane! You're already clocked in.");
        Ok(())
    }

    #[tokio::test]
    async fn prompt_mentions_time_since_last_update() -> Result<()> {
        let mut tracker = MockTimeTracker::new();
        tracker.expect_list_clock_ins().returning(|| {
            Ok(vec![ClockRecord {
                clock_in_time: at(9, 15),
                clock_out_time: None,
            }])
        });
        tracker.expect_list_time_entries().returning(|_, _| Ok(vec![]));

        let clock = ClockState::new(&tracker, "proj", Dublin);
        let message = activity_prompt(&clock, at(9, 55)).await?;

        assert_eq!(
            message,
            "⏰ What have you been working on? Your last update was 40 minutes ago."
        );
        Ok(())
    }

    #[tokio::test]
    async fn prompt_is_sent_while_clocked_out() -> Result<()> {
        let mut tracker = MockTimeTracker::new();
        tracker.expect_list_clock_ins().returning(|| Ok(vec![]));
        tracker.expect_list_time_entries().returning(|_, _| Ok(vec![]));

        let clock = ClockState::new(&tracker, "proj", Dublin);
        assert_eq!(
            activity_prompt(&clock, at(3, 0)).await?,
            "⏰ What have you been working on?"
        );
        Ok(())
    }

    #[tokio::test]
    async fn rounded_up_entry_ending_later_counts_as_just_now() -> Result<()> {
        let mut tracker = MockTimeTracker::new();
        tracker.expect_list_clock_ins().returning(|| {
            Ok(vec![ClockRecord {
                clock_in_time: at(10, 3),
                clock_out_time: None,
            }])
        });
        // Flushed at 10:05 and rounded up to 10:03-10:18.
        tracker.expect_list_time_entries().returning(|_, _| {
            Ok(vec![TimeEntry::starting_at(
                at(10, 3),
                chrono::Duration::minutes(15),
                Dublin,
                " * standup".into(),
            )])
        });

        let clock = ClockState::new(&tracker, "proj", Dublin);
        assert_eq!(
            activity_prompt(&clock, at(10, 15)).await?,
            "⏰ What have you been working on? Your last update was a few seconds ago."
        );
        Ok(())
    }
}
