//! Utilities: logging (dynamic level) and ANSI colour (respects NO_COLOR).
//!
//! Key items:
//!   init_logging / derive_level
//!   log_warn! / log_info! / log_debug! / log_trace!
//!   output::color

/// Logging helpers. Log lines go to stderr so they never mix with command output.
pub mod logging {
    use std::sync::OnceLock;
    use std::sync::atomic::{AtomicU8, Ordering};

    use super::output::{Color, color};

    #[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd)]
    pub enum LogLevel {
        Error = 0,
        Warn = 1,
        Info = 2,
        Debug = 3,
        Trace = 4,
    }

    impl LogLevel {
        pub fn as_str(&self) -> &'static str {
            match self {
                LogLevel::Error => "ERROR",
                LogLevel::Warn => "WARN",
                LogLevel::Info => "INFO",
                LogLevel::Debug => "DEBUG",
                LogLevel::Trace => "TRACE",
            }
        }
    }

    static GLOBAL_LEVEL: OnceLock<AtomicU8> = OnceLock::new();

    fn inner_cell() -> &'static AtomicU8 {
        GLOBAL_LEVEL.get_or_init(|| AtomicU8::new(LogLevel::Warn as u8))
    }

    pub fn init_logging(level: LogLevel) {
        set_log_level(level);
    }

    pub fn set_log_level(level: LogLevel) {
        inner_cell().store(level as u8, Ordering::Relaxed);
    }

    pub fn current_log_level() -> LogLevel {
        match inner_cell().load(Ordering::Relaxed) {
            0 => LogLevel::Error,
            1 => LogLevel::Warn,
            2 => LogLevel::Info,
            3 => LogLevel::Debug,
            _ => LogLevel::Trace,
        }
    }

    /// `-q` keeps errors only; each `-v` adds a level above the default (warn).
    pub fn derive_level(verbose: u8, quiet: bool) -> LogLevel {
        if quiet {
            return LogLevel::Error;
        }
        match verbose {
            0 => LogLevel::Warn,
            1 => LogLevel::Info,
            2 => LogLevel::Debug,
            _ => LogLevel::Trace,
        }
    }

    fn should_emit(level: LogLevel) -> bool {
        level <= current_log_level()
    }

    fn tag(level: LogLevel) -> String {
        let text = format!("[{}]", level.as_str());
        match level {
            LogLevel::Error => color(Color::Red, text),
            LogLevel::Warn => color(Color::Yellow, text),
            _ => text,
        }
    }

    pub fn log(level: LogLevel, msg: impl AsRef<str>) {
        if should_emit(level) {
            eprintln!("{} {}", tag(level), msg.as_ref());
        }
    }

    pub fn warn(msg: impl AsRef<str>) {
        log(LogLevel::Warn, msg);
    }
    pub fn info(msg: impl AsRef<str>) {
        log(LogLevel::Info, msg);
    }
    pub fn debug(msg: impl AsRef<str>) {
        log(LogLevel::Debug, msg);
    }
    pub fn trace(msg: impl AsRef<str>) {
        log(LogLevel::Trace, msg);
    }

    #[macro_export]
    macro_rules! log_warn {
        ($($t:tt)*) => { $crate::utils::logging::warn(format!($($t)*)) };
    }
    #[macro_export]
    macro_rules! log_info {
        ($($t:tt)*) => { $crate::utils::logging::info(format!($($t)*)) };
    }
    #[macro_export]
    macro_rules! log_debug {
        ($($t:tt)*) => { $crate::utils::logging::debug(format!($($t)*)) };
    }
    #[macro_export]
    macro_rules! log_trace {
        ($($t:tt)*) => { $crate::utils::logging::trace(format!($($t)*)) };
    }

}

pub use logging::{derive_level, init_logging};

/// ANSI colour helpers.
pub mod output {
    /// Wrap `text` in an ANSI colour (disabled via NO_COLOR).
    pub fn color(c: Color, text: impl AsRef<str>) -> String {
        if std::env::var_os("NO_COLOR").is_some() {
            return text.as_ref().to_string();
        }
        format!("{}{}{}", c.as_code(), text.as_ref(), "\x1b[0m")
    }

    #[derive(Copy, Clone)]
    pub enum Color {
        Red,
        Yellow,
        Bold,
    }

    impl Color {
        fn as_code(&self) -> &'static str {
            match self {
                Color::Red => "\x1b[31m",
                Color::Yellow => "\x1b[33m",
                Color::Bold => "\x1b[1m",
            }
        }
    }
}
