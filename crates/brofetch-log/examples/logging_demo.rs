//! Prints a few log lines in each format.
//!
//! Run with `BROFETCH_LOG_FORMAT=json cargo run -p brofetch-log --example logging_demo`.

use brofetch_log::spans::{record_outcome, request_span, Timer};
use brofetch_log::{info, warn, LogConfig, LogLevel};

fn main() -> Result<(), brofetch_log::LogError> {
    let mut config = LogConfig::from_env();
    config.level = LogLevel::Debug;
    brofetch_log::init(config)?;

    let span = request_span("GET", "https://example.com/");
    let _guard = span.enter();

    let timer = Timer::start("demo");
    info!(hop = 1, "following redirect");
    warn!("redirect without location, stopping");
    record_outcome(&span, 2, 302);
    timer.finish();

    Ok(())
}
