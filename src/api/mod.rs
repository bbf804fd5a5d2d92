//! Collaborators the bot talks to. [TimeTracker] is the time-tracking service and
//! [ChatTransport] is the chat the user talks through. Both are consumed through these traits
//! only, [http] and [console] hold the adapters used by the binary.

pub mod console;
pub mod http;

use anyhow::Result;
use async_trait::async_trait;

use crate::clock::entities::{ClockRecord, TimeEntry, TimeEntryQuery};

/// A message the user sent to the bot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Person {
    pub handle: String,
    pub first_name: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TimeTracker: Send + Sync {
    async fn clock_in(&self) -> Result<()>;

    async fn clock_out(&self) -> Result<()>;

    /// Clock history, most recent first.
    async fn list_clock_ins(&self) -> Result<Vec<ClockRecord>>;

    async fn list_time_entries(&self, project: &str, query: TimeEntryQuery) -> Result<Vec<TimeEntry>>;

    async fn create_time_entry(&self, project: &str, entry: TimeEntry) -> Result<()>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn send_message(&self, text: &str) -> Result<()>;

    async fn find_person(&self, handle: &str) -> Result<Person>;
}
