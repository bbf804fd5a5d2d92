use std::{fmt::Display, str::FromStr};

use anyhow::{anyhow, Context};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use cron::Schedule;
use serde::Deserialize;

const WEEKDAYS: [&str; 8] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// Numeric weekdays go by name, so `1-5` keeps meaning Monday to Friday.
fn weekday_name(value: &str) -> String {
    value
        .parse::<usize>()
        .ok()
        .and_then(|day| WEEKDAYS.get(day))
        .map_or_else(|| value.to_string(), |day| day.to_string())
}

/// Rewrites a classic day-of-week field, where 0 and 7 are Sunday, with day names.
fn weekday_field(field: &str) -> String {
    field
        .split(',')
        .flat_map(|item| {
            let (range, step) = match item.split_once('/') {
                Some((range, step)) => (range, Some(step)),
                None => (item, None),
            };
            let mut items = vec![];
            let range = match (range.split_once('-'), step) {
                // Sunday is the first day once named, so `a-7` wraps around.
                (Some((start, "7")), None) => {
                    items.push(weekday_name("0"));
                    format!("{}-{}", weekday_name(start), weekday_name("6"))
                }
                (Some((start, end)), _) => format!("{}-{}", weekday_name(start), weekday_name(end)),
                (None, _) => weekday_name(range),
            };
            items.insert(
                0,
                match step {
                    Some(step) => format!("{range}/{step}"),
                    None => range,
                },
            );
            items
        })
        .collect::<Vec<_>>()
        .join(",")
}

/// A five field cron expression (`minute hour day-of-month month day-of-week`) evaluated in a
/// specific timezone.
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "String")]
pub struct CronSchedule {
    expression: String,
    schedule: Schedule,
}

impl CronSchedule {
    /// First fire time strictly after `after`, as seen on a wall clock in `tz`.
    pub fn next_after(&self, after: DateTime<Utc>, tz: Tz) -> Option<DateTime<Utc>> {
        self.schedule
            .after(&after.with_timezone(&tz))
            .next()
            .map(|next| next.with_timezone(&Utc))
    }
}

impl FromStr for CronSchedule {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields = s.split_whitespace().collect::<Vec<_>>();
        let [minutes, hours, days_of_month, months, days_of_week] = fields[..] else {
            return Err(anyhow!("Expected 5 fields in cron expression {s:?}"));
        };
        let schedule = format!(
            "0 {minutes} {hours} {days_of_month} {months} {}",
            weekday_field(days_of_week)
        )
        .parse::<Schedule>()
        .with_context(|| format!("Invalid cron expression {s:?}"))?;
        Ok(Self {
            expression: fields.join(" "),
            schedule,
        })
    }
}

impl TryFrom<String> for CronSchedule {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl Display for CronSchedule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.expression)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use chrono_tz::Europe::Dublin;

    use super::{weekday_field, CronSchedule};

    fn schedule(expression: &str) -> CronSchedule {
        expression.parse().unwrap()
    }

    #[test]
    fn weekday_schedule_skips_weekend() {
        // Friday 18:00 UTC in January, next weekday 09:15 is Monday.
        let friday_evening = Utc.with_ymd_and_hms(2024, 1, 19, 18, 0, 0).unwrap();
        assert_eq!(
            schedule("15 9 * * 1-5").next_after(friday_evening, Dublin),
            Some(Utc.with_ymd_and_hms(2024, 1, 22, 9, 15, 0).unwrap())
        );
    }

    #[test]
    fn next_is_strictly_after() {
        let at_fire_time = Utc.with_ymd_and_hms(2024, 1, 15, 9, 15, 0).unwrap();
        assert_eq!(
            schedule("*/15 * * * *").next_after(at_fire_time, Dublin),
            Some(Utc.with_ymd_and_hms(2024, 1, 15, 9, 30, 0).unwrap())
        );
        let just_before = Utc.with_ymd_and_hms(2024, 1, 15, 9, 14, 59).unwrap();
        assert_eq!(
            schedule("*/15 * * * *").next_after(just_before, Dublin),
            Some(at_fire_time)
        );
    }

    #[test]
    fn local_time_follows_summer_time() {
        // Dublin is UTC+1 in July, so 18:00 local is 17:00 UTC.
        let morning = Utc.with_ymd_and_hms(2024, 7, 1, 8, 0, 0).unwrap();
        assert_eq!(
            schedule("0 18 * * 1-5").next_after(morning, Dublin),
            Some(Utc.with_ymd_and_hms(2024, 7, 1, 17, 0, 0).unwrap())
        );
    }

    #[test]
    fn weekday_numbers_become_names() {
        assert_eq!(weekday_field("*"), "*");
        assert_eq!(weekday_field("1-5"), "Mon-Fri");
        assert_eq!(weekday_field("0,6"), "Sun,Sat");
        assert_eq!(weekday_field("5-7"), "Fri-Sat,Sun");
        assert_eq!(weekday_field("*/2"), "*/2");
    }

    #[test]
    fn sunday_can_be_seven() {
        // 2024-01-15 is a Monday.
        let monday = Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap();
        let sunday_noon = Some(Utc.with_ymd_and_hms(2024, 1, 21, 12, 0, 0).unwrap());
        assert_eq!(schedule("0 12 * * 7").next_after(monday, Dublin), sunday_noon);
        assert_eq!(schedule("0 12 * * 0").next_after(monday, Dublin), sunday_noon);
    }

    #[test]
    fn invalid_expressions() {
        for expression in ["", "* * * *", "a * * * *", "* * * * * *"] {
            assert!(expression.parse::<CronSchedule>().is_err(), "{expression}");
        }
    }

    #[test]
    fn display_keeps_the_expression() {
        assert_eq!(schedule("15  9 * * 1-5").to_string(), "15 9 * * 1-5");
    }
}
