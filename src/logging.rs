//! Logger setup for binaries and examples embedding the solver.
//!
//! The library itself only emits through the `log` macros; nothing is
//! printed unless the host installs a logger, for instance with
//! [`init_logger`].

use std::io::{self, Write};
use std::thread;

use env_logger::{fmt::Formatter, Builder, Target, WriteStyle};
use log::{Level, LevelFilter};

/// Installs a compact stderr logger at `level`.
///
/// Each line carries the level and the name of the emitting thread, which
/// for engine threads is `fsp-<engine name>`.
///
/// # Errors
///
/// Fails if a global logger is already installed.
pub fn init_logger(level: LevelFilter) -> io::Result<()> {
    let mut builder = Builder::new();
    builder
        .filter_level(level)
        .write_style(WriteStyle::Never)
        .target(Target::Stderr)
        .format(|buf: &mut Formatter, record| {
            let current = thread::current();
            writeln!(
                buf,
                "{} {} [{}] {}",
                buf.timestamp_millis(),
                level_tag(record.level()),
                current.name().unwrap_or("main"),
                record.args()
            )
        });

    builder.try_init().map_err(io::Error::other)
}

fn level_tag(level: Level) -> &'static str {
    match level {
        Level::Error => "ERROR",
        Level::Warn => "WARN",
        Level::Info => "INFO",
        Level::Debug => "DEBUG",
        Level::Trace => "TRACE",
    }
}
