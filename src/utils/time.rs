use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use now::DateTimeNow;

/// Returns the start of the calendar day `moment` falls on in `tz`.
pub fn day_start(moment: DateTime<Utc>, tz: Tz) -> DateTime<Utc> {
    moment.with_timezone(&tz).beginning_of_day().with_timezone(&Utc)
}

/// Standard way of showing a time of day to the user.
pub fn format_time_of_day(moment: DateTime<Utc>, tz: Tz) -> String {
    moment.with_timezone(&tz).format("%H:%M").to_string()
}

/// Compact duration used in status messages, e.g. `1h30m` or `45m`.
pub fn format_duration(v: Duration) -> String {
    if v.num_hours() > 0 {
        format!("{}h{}m", v.num_hours(), v.num_minutes() % 60)
    } else {
        format!("{}m", v.num_minutes())
    }
}

/// Describes a duration the way a person would say it, using the largest whole unit.
pub fn humanize(v: Duration) -> String {
    let minutes = v.num_minutes();
    let hours = v.num_hours();
    let days = v.num_days();
    match (days, hours, minutes) {
        (0, 0, 0) => "a few seconds".into(),
        (0, 0, 1) => "a minute".into(),
        (0, 0, m) => format!("{m} minutes"),
        (0, 1, _) => "an hour".into(),
        (0, h, _) => format!("{h} hours"),
        (1, _, _) => "a day".into(),
        (d, _, _) => format!("{d} days"),
    }
}
