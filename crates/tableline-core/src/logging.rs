//! Logging setup: env_logger behind the `log` facade, bridged to indicatif

use indicatif::MultiProgress;

/// Crates whose debug output drowns the pipeline's own.
const NOISY_TARGETS: &[&str] = &["reqwest", "hyper", "hyper_util", "native_tls"];

/// Log verbosity selected on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Normal,
    Debug,
}

impl Verbosity {
    pub fn from_flags(quiet: bool, debug: bool) -> Self {
        if debug {
            Self::Debug
        } else if quiet {
            Self::Quiet
        } else {
            Self::Normal
        }
    }

    fn default_filter(self) -> &'static str {
        match self {
            Self::Quiet => "warn",
            Self::Normal => "info",
            Self::Debug => "debug",
        }
    }
}

/// Padded label and optional ANSI color for a log level.
fn level_label(level: log::Level, color: bool) -> String {
    let (label, ansi) = match level {
        log::Level::Error => ("ERROR", "\x1b[31m"),
        log::Level::Warn => ("WARN ", "\x1b[33m"),
        log::Level::Info => ("INFO ", "\x1b[32m"),
        log::Level::Debug => ("DEBUG", "\x1b[36m"),
        log::Level::Trace => ("TRACE", "\x1b[35m"),
    };
    if color {
        format!("{ansi}{label}\x1b[0m")
    } else {
        label.to_string()
    }
}

fn builder(verbosity: Verbosity) -> env_logger::Builder {
    let mut builder = env_logger::Builder::new();
    builder.parse_filters(verbosity.default_filter());
    if verbosity != Verbosity::Debug {
        for target in NOISY_TARGETS {
            builder.filter_module(target, log::LevelFilter::Warn);
        }
    }
    // RUST_LOG wins over the CLI flags
    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }
    builder
}

/// Logger that prints through `MultiProgress` so lines don't tear progress bars.
pub struct ProgressLogger {
    inner: env_logger::Logger,
    multi: MultiProgress,
}

impl ProgressLogger {
    pub fn new(inner: env_logger::Logger, multi: MultiProgress) -> Self {
        Self { inner, multi }
    }
}

impl log::Log for ProgressLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        self.inner.enabled(metadata)
    }

    fn log(&self, record: &log::Record) {
        if self.inner.matches(record) {
            let line = format!("[{}] {}", level_label(record.level(), true), record.args());
            self.multi.suspend(|| eprintln!("{line}"));
        }
    }

    fn flush(&self) {
        self.inner.flush();
    }
}

/// Initialize logging. With `multi` (TTY) output is colored and routed
/// around progress bars; without it lines are plain `[LEVEL] msg`.
pub fn init_logging(verbosity: Verbosity, multi: Option<&MultiProgress>) {
    use std::io::Write;

    let mut builder = builder(verbosity);
    let result = if let Some(multi) = multi {
        let logger = builder.build();
        let max_level = logger.filter();
        log::set_boxed_logger(Box::new(ProgressLogger::new(logger, multi.clone())))
            .map(|()| log::set_max_level(max_level))
    } else {
        builder
            .format(|buf, record| {
                writeln!(buf, "[{}] {}", level_label(record.level(), false), record.args())
            })
            .try_init()
    };
    if result.is_err() {
        // Already initialised (tests, or a host application)
        log::debug!("logger already set");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_debug_wins() {
        assert_eq!(Verbosity::from_flags(true, true), Verbosity::Debug);
        assert_eq!(Verbosity::from_flags(true, false), Verbosity::Quiet);
        assert_eq!(Verbosity::from_flags(false, false), Verbosity::Normal);
    }

    #[test]
    fn plain_labels_are_padded() {
        assert_eq!(level_label(log::Level::Info, false), "INFO ");
        assert_eq!(level_label(log::Level::Error, false), "ERROR");
    }

    #[test]
    fn colored_labels_reset() {
        let label = level_label(log::Level::Warn, true);
        assert!(label.starts_with("\x1b[33m"));
        assert!(label.ends_with("\x1b[0m"));
    }

    #[test]
    fn init_twice_does_not_panic() {
        init_logging(Verbosity::Quiet, None);
        init_logging(Verbosity::Quiet, None);
    }
}
