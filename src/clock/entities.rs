use std::fmt::Display;

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// One clock-in session as reported by the time tracker. A missing `clock_out_time` means the
/// session is still open.
#[derive(PartialEq, Eq, Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ClockRecord {
    pub clock_in_time: DateTime<Utc>,
    #[serde(default)]
    pub clock_out_time: Option<DateTime<Utc>>,
}

impl ClockRecord {
    pub fn is_open(&self) -> bool {
        self.clock_out_time.is_none()
    }
}

/// A logged block of work. Dates and times are local to the tracker's timezone.
#[derive(PartialEq, Eq, Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TimeEntry {
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub hours: i64,
    pub minutes: i64,
    pub description: String,
}

impl TimeEntry {
    /// Builds an entry starting at `start` and lasting `duration`, truncated to whole minutes.
    pub fn starting_at(start: DateTime<Utc>, duration: Duration, tz: Tz, description: String) -> Self {
        let local = start.with_timezone(&tz);
        let minutes = duration.num_minutes();
        Self {
            date: local.date_naive(),
            start_time: local.time(),
            hours: minutes / 60,
            minutes: minutes % 60,
            description,
        }
    }

    pub fn duration(&self) -> Duration {
        Duration::hours(self.hours) + Duration::minutes(self.minutes)
    }

    /// Start of the entry. Local times that don't exist (DST gaps) resolve to the earliest valid
    /// interpretation, falling back to reading the local time as UTC.
    pub fn start(&self, tz: Tz) -> DateTime<Utc> {
        let naive = self.date.and_time(self.start_time);
        naive
            .and_local_timezone(tz)
            .earliest()
            .map(|v| v.with_timezone(&Utc))
            .unwrap_or_else(|| naive.and_utc())
    }

    pub fn end(&self, tz: Tz) -> DateTime<Utc> {
        self.start(tz) + self.duration()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl Display for SortOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SortOrder::Asc => write!(f, "asc"),
            SortOrder::Desc => write!(f, "desc"),
        }
    }
}

/// Paging and ordering for listing time entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeEntryQuery {
    pub page: u32,
    pub page_size: u32,
    pub sort_by: String,
    pub sort_order: SortOrder,
}

impl TimeEntryQuery {
    /// The most recent entries first. A day's worth of logs comfortably fits the page.
    pub fn latest() -> Self {
        Self {
            page: 1,
            page_size: 20,
            sort_by: "date".into(),
            sort_order: SortOrder::Desc,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, NaiveDate, NaiveTime, TimeZone, Utc};
    use chrono_tz::Europe::Dublin;

    use super::{ClockRecord, TimeEntry};

    #[test]
    fn entry_end_adds_hours_and_minutes() {
        let entry = TimeEntry {
            date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            start_time: NaiveTime::from_hms_opt(9, 30, 0).unwrap(),
            hours: 1,
            minutes: 45,
            description: String::new(),
        };
        // Dublin is on GMT in January.
        assert_eq!(entry.end(Dublin), Utc.with_ymd_and_hms(2024, 1, 15, 11, 15, 0).unwrap());
    }

    #[test]
    fn entry_starting_at_uses_local_date() {
        let start = Utc.with_ymd_and_hms(2024, 7, 1, 23, 10, 0).unwrap();
        let entry = TimeEntry::starting_at(start, Duration::minutes(75), Dublin, "x".into());
        assert_eq!(entry.date, NaiveDate::from_ymd_opt(2024, 7, 2).unwrap());
        assert_eq!(entry.start_time, NaiveTime::from_hms_opt(0, 10, 0).unwrap());
        assert_eq!((entry.hours, entry.minutes), (1, 15));
    }

    #[test]
    fn clock_record_parses_camel_case() {
        let record: ClockRecord =
            serde_json::from_str(r#"{"clockInTime":"2024-01-15T09:15:00Z"}"#).unwrap();
        assert!(record.is_open());
        assert_eq!(record.clock_in_time, Utc.with_ymd_and_hms(2024, 1, 15, 9, 15, 0).unwrap());
    }
}
