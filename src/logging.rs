//! Diagnostic logging on stderr through `log` + `simplelog`.

use crate::error::{Error, Result};
use log::LevelFilter;
use simplelog::{ConfigBuilder, WriteLogger};

/// Parse a configured level name
pub fn parse_level(level: &str) -> Result<LevelFilter> {
    level.trim().parse::<LevelFilter>().map_err(|_| {
        Error::validation(
            "log_level",
            format!(
                "unknown level '{}', expected off, error, warn, info, debug or trace",
                level
            ),
        )
    })
}

/// Install the stderr logger. A second call is a no-op.
pub fn init(level: LevelFilter) {
    let mut config = ConfigBuilder::new();
    config
        .set_time_level(LevelFilter::Off)
        .set_thread_level(LevelFilter::Off)
        .set_target_level(LevelFilter::Off);
    if level < LevelFilter::Trace {
        config.add_filter_allow_str("campus_console");
    }
    let _ = WriteLogger::init(level, config.build(), std::io::stderr());
}
