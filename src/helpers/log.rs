//! Script log lines
//!
//! `log` goes to stdout, `warn` and `debug` to stderr. `debug` lines are
//! dropped unless the engine runs with `verbose` set.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Debug,
    Warn,
}

impl Level {
    fn prefix(self) -> &'static str {
        match self {
            Level::Info => "[script]",
            Level::Debug => "[script:debug]",
            Level::Warn => "[script:warn]",
        }
    }
}

/// The line a script message prints as, or `None` when it is filtered out.
pub fn format_line(level: Level, msg: &str, verbose: bool) -> Option<String> {
    if level == Level::Debug && !verbose {
        return None;
    }
    Some(format!("{} {}", level.prefix(), msg))
}

pub fn log(msg: &str) {
    if let Some(line) = format_line(Level::Info, msg, true) {
        println!("{line}");
    }
}

pub fn debug(msg: &str, verbose: bool) {
    if let Some(line) = format_line(Level::Debug, msg, verbose) {
        eprintln!("{line}");
    }
}

pub fn warn(msg: &str) {
    if let Some(line) = format_line(Level::Warn, msg, true) {
        eprintln!("{line}");
    }
}
