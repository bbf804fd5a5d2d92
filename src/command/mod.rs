//! Turns chat messages into bot intents.
//!
//! Rules are tried in a fixed order and the first match wins. Messages that match no rule may
//! still carry quoted log lines, see [extract_log_lines].

use std::{fmt::Display, sync::LazyLock};

use regex::Regex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockDirection {
    In,
    Out,
}

impl Display for ClockDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClockDirection::In => write!(f, "in"),
            ClockDirection::Out => write!(f, "out"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    UpdateClock(ClockDirection),
    CancelClockOut,
    DisplayStatus,
    NoMatch,
}

impl Intent {
    /// Tag and arguments, e.g. `["UPDATE_CLOCK", "out"]`. Used when logging dispatches.
    pub fn tokens(&self) -> Vec<String> {
        match self {
            Intent::UpdateClock(direction) => vec!["UPDATE_CLOCK".into(), direction.to_string()],
            Intent::CancelClockOut => vec!["CANCEL_CLOCK_OUT".into()],
            Intent::DisplayStatus => vec!["DISPLAY_STATUS".into()],
            Intent::NoMatch => vec![],
        }
    }
}

static UPDATE_CLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*clock\s+(in|out)\s*$").expect("valid regex"));
static CANCEL_CLOCK_OUT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(?:don'?t|no|stop)\s+clock\s+out\s*$").expect("valid regex")
});
// Case-sensitive on purpose, "Status" is not a command.
static DISPLAY_STATUS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(?:show me my )?status\s*$").expect("valid regex"));

/// Classifies a message. Never fails, unknown text is [Intent::NoMatch].
pub fn classify(message: &str) -> Intent {
    if let Some(captures) = UPDATE_CLOCK.captures(message) {
        let direction = captures[1].trim().to_lowercase();
        return match direction.as_str() {
            "in" => Intent::UpdateClock(ClockDirection::In),
            _ => Intent::UpdateClock(ClockDirection::Out),
        };
    }
    if CANCEL_CLOCK_OUT.is_match(message) {
        return Intent::CancelClockOut;
    }
    if DISPLAY_STATUS.is_match(message) {
        return Intent::DisplayStatus;
    }
    Intent::NoMatch
}

/// Returns the lines of a message that are quoted with `>`, with the marker stripped.
pub fn extract_log_lines(message: &str) -> Vec<String> {
    message
        .lines()
        .filter_map(|line| line.trim_start().strip_prefix('>'))
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty())
        .collect()
}
