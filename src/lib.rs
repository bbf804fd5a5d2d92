//! Personal assistant that nags you to clock in and out of a time tracker and turns quoted chat
//! messages into time entries.
//!

pub mod api;
pub mod batch;
pub mod bot;
pub mod clock;
pub mod command;
pub mod errors;
pub mod schedule;
pub mod utils;
