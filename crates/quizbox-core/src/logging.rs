//! Logging setup on top of env_logger

use std::io::{IsTerminal, Write};

/// ANSI color code and padded label for a log level.
fn level_style(level: log::Level, color: bool) -> (&'static str, &'static str, &'static str) {
    let label = match level {
        log::Level::Error => "ERROR",
        log::Level::Warn => "WARN ",
        log::Level::Info => "INFO ",
        log::Level::Debug => "DEBUG",
        log::Level::Trace => "TRACE",
    };
    if !color {
        return ("", label, "");
    }
    let ansi = match level {
        log::Level::Error => "\x1b[31m",
        log::Level::Warn => "\x1b[33m",
        log::Level::Info => "\x1b[32m",
        log::Level::Debug => "\x1b[36m",
        log::Level::Trace => "\x1b[35m",
    };
    (ansi, label, "\x1b[0m")
}

/// Filter used when `RUST_LOG` is not set.
fn default_filter(quiet: bool, debug: bool) -> &'static str {
    if debug {
        "debug"
    } else if quiet {
        "warn"
    } else {
        "info"
    }
}

/// Initialize logging. `RUST_LOG` overrides the level picked from the flags.
///
/// On a terminal, level labels are colored. Otherwise every line carries a
/// millisecond timestamp so server logs can be aggregated.
pub fn init_logging(quiet: bool, debug: bool) {
    let env = env_logger::Env::default().default_filter_or(default_filter(quiet, debug));
    let mut builder = env_logger::Builder::from_env(env);

    if std::io::stderr().is_terminal() {
        builder.format(|buf, record| {
            let (pre, label, post) = level_style(record.level(), true);
            writeln!(buf, "[{pre}{label}{post}] {}", record.args())
        });
    } else {
        builder.format(|buf, record| {
            let (_, label, _) = level_style(record.level(), false);
            writeln!(
                buf,
                "{} [{label}] {}",
                buf.timestamp_millis(),
                record.args()
            )
        });
    }

    // A second init (tests, embedding) keeps the first logger.
    if let Err(e) = builder.try_init() {
        log::debug!("logger already initialized: {e}");
    }
}
