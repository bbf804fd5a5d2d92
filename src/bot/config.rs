use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono_tz::Tz;
use serde::Deserialize;

use crate::schedule::CronSchedule;

/// Bot configuration, read from a TOML file.
#[derive(Debug, Clone, Deserialize)]
pub struct BotConfig {
    pub user: UserConfig,
    /// Project the logged time entries are booked against.
    pub project: String,
    #[serde(default = "default_timezone")]
    pub timezone: Tz,
    pub tracker: TrackerConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserConfig {
    /// Chat handle of the person the bot works for.
    pub handle: String,
    /// Credentials for the time-tracking service.
    pub api_token: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrackerConfig {
    pub base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    pub clock_in: CronSchedule,
    pub clock_out: CronSchedule,
    pub prompt: CronSchedule,
}

pub const DEFAULT_CLOCK_IN: &str = "15 9 * * 1-5";
pub const DEFAULT_CLOCK_OUT: &str = "0 18 * * 1-5";
pub const DEFAULT_PROMPT: &str = "*/15 * * * *";

impl Default for ScheduleConfig {
    fn default() -> Self {
        let parse = |expression: &str| {
            expression
                .parse::<CronSchedule>()
                .expect("Default schedules are valid cron expressions")
        };
        Self {
            clock_in: parse(DEFAULT_CLOCK_IN),
            clock_out: parse(DEFAULT_CLOCK_OUT),
            prompt: parse(DEFAULT_PROMPT),
        }
    }
}

fn default_timezone() -> Tz {
    chrono_tz::Europe::Dublin
}

impl BotConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {path:?}"))?;
        Self::parse(&text).with_context(|| format!("Invalid config file {path:?}"))
    }

    pub fn parse(text: &str) -> Result<Self> {
        let config: BotConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.user.handle.trim().is_empty() {
            bail!("user.handle can't be empty");
        }
        if self.user.api_token.trim().is_empty() {
            bail!("user.api_token can't be empty");
        }
        if self.project.trim().is_empty() {
            bail!("project can't be empty");
        }
        if self.tracker.base_url.trim().is_empty() {
            bail!("tracker.base_url can't be empty");
        }
        Ok(())
    }
}
