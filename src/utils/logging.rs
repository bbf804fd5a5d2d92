use std::{path::Path, sync::LazyLock};

use anyhow::Result;
use tracing::level_filters::LevelFilter;
use tracing_appender::rolling::Rotation;
use tracing_subscriber::{
    fmt::{format::FmtSpan, writer::MakeWriterExt},
    EnvFilter,
};

const LOG_FILE_PREFIX: &str = "clockbot";
const KEPT_LOG_FILES: usize = 7;

/// Filter directive for the bot's own events. Everything from dependencies is left out, their
/// failures reach us as errors anyway.
fn log_directive(level: Option<LevelFilter>, env_level: Option<String>) -> String {
    let level = level
        .map(|v| v.to_string())
        .or(env_level)
        .unwrap_or_else(|| "debug".into());
    format!("{}={level}", env!("CARGO_PKG_NAME").replace('-', "_"))
}

/// Sends logs to a daily rotated file in `<app dir>/logs`, and to stdout when `console` is set.
pub fn enable_logging(app_dir: &Path, level: Option<LevelFilter>, console: bool) -> Result<()> {
    let appender = tracing_appender::rolling::Builder::new()
        .rotation(Rotation::DAILY)
        .max_log_files(KEPT_LOG_FILES)
        .filename_prefix(LOG_FILE_PREFIX)
        .filename_suffix("log")
        .build(app_dir.join("logs"))?;

    let stdout = std::io::stdout.with_filter(move |_| console);
    let directive = log_directive(level, std::env::var("RUST_LOG").ok());

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(directive))
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(stdout.and(appender))
        .pretty()
        .init();
    Ok(())
}

pub static TEST_LOGGING: LazyLock<()> = LazyLock::new(|| {
    // Tests in one binary share the global subscriber.
    let _ = tracing_subscriber::fmt()
        .with_max_level(LevelFilter::TRACE)
        .with_test_writer()
        .pretty()
        .try_init();
});
