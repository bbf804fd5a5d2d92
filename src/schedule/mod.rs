//! Cron-style schedules for the bot's recurring jobs.
//!
//! Expressions use the classic five fields (`minute hour day-of-month month day-of-week`) and
//! are evaluated by the `cron` crate.
//! [Scheduler] keeps the next fire time of every job so the session loop only ever waits for
//! the earliest one.

pub mod expression;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
pub use expression::CronSchedule;
use tracing::{debug, warn};

/// Recurring jobs of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Job {
    AutoClockIn,
    AutoClockOut,
    PromptActivity,
}

struct ScheduledJob {
    job: Job,
    schedule: CronSchedule,
    next: Option<DateTime<Utc>>,
}

/// Table of armed jobs. Disarmed schedulers never report a due job.
pub struct Scheduler {
    tz: Tz,
    jobs: Vec<ScheduledJob>,
    armed: bool,
}

impl Scheduler {
    pub fn new(tz: Tz, jobs: impl IntoIterator<Item = (Job, CronSchedule)>) -> Self {
        Self {
            tz,
            jobs: jobs
                .into_iter()
                .map(|(job, schedule)| ScheduledJob {
                    job,
                    schedule,
                    next: None,
                })
                .collect(),
            armed: false,
        }
    }

    /// Computes the first fire time of every job after `now`.
    pub fn arm(&mut self, now: DateTime<Utc>) {
        for job in self.jobs.iter_mut() {
            job.next = job.schedule.next_after(now, self.tz);
            match job.next {
                Some(next) => debug!("{:?} scheduled for {next}", job.job),
                None => warn!("{:?} never fires", job.job),
            }
        }
        self.armed = true;
    }

    pub fn disarm(&mut self) {
        for job in self.jobs.iter_mut() {
            job.next = None;
        }
        self.armed = false;
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// The job that fires first. Ties go to the job registered first.
    pub fn next_due(&self) -> Option<(Job, DateTime<Utc>)> {
        self.jobs
            .iter()
            .filter_map(|job| job.next.map(|next| (job.job, next)))
            .min_by_key(|(_, next)| *next)
    }

    /// Marks `job` as fired at `now` and moves it to its next occurrence.
    pub fn complete(&mut self, job: Job, now: DateTime<Utc>) {
        if !self.armed {
            return;
        }
        let tz = self.tz;
        if let Some(entry) = self.jobs.iter_mut().find(|entry| entry.job == job) {
            let after = entry.next.map_or(now, |next| next.max(now));
            entry.next = entry.schedule.next_after(after, tz);
            debug!("{job:?} rescheduled for {:?}", entry.next);
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use chrono_tz::Europe::Dublin;

    use super::{CronSchedule, Job, Scheduler};

    fn scheduler() -> Scheduler {
        Scheduler::new(
            Dublin,
            [
                (Job::AutoClockIn, "15 9 * * 1-5".parse::<CronSchedule>().unwrap()),
                (Job::AutoClockOut, "0 18 * * 1-5".parse::<CronSchedule>().unwrap()),
                (Job::PromptActivity, "*/15 * * * *".parse::<CronSchedule>().unwrap()),
            ],
        )
    }

    #[test]
    fn unarmed_scheduler_has_nothing_due() {
        let mut scheduler = scheduler();
        assert_eq!(scheduler.next_due(), None);
        scheduler.arm(Utc.with_ymd_and_hms(2024, 1, 15, 9, 5, 0).unwrap());
        scheduler.disarm();
        assert_eq!(scheduler.next_due(), None);
    }

    #[test]
    fn earliest_job_wins_and_ties_keep_registration_order() {
        let mut scheduler = scheduler();
        // Monday 09:05 in January, Dublin is on UTC.
        let now = Utc.with_ymd_and_hms(2024, 1, 15, 9, 5, 0).unwrap();
        scheduler.arm(now);

        let quarter_past = Utc.with_ymd_and_hms(2024, 1, 15, 9, 15, 0).unwrap();
        assert_eq!(scheduler.next_due(), Some((Job::AutoClockIn, quarter_past)));

        scheduler.complete(Job::AutoClockIn, quarter_past);
        assert_eq!(scheduler.next_due(), Some((Job::PromptActivity, quarter_past)));

        scheduler.complete(Job::PromptActivity, quarter_past);
        assert_eq!(
            scheduler.next_due(),
            Some((
                Job::PromptActivity,
                Utc.with_ymd_and_hms(2024, 1, 15, 9, 30, 0).unwrap()
            ))
        );
    }
}
