//! Per-session log file for the desktop app.
//!
//! `init()` truncates `minipaint.log` in the platform data directory
//! (`%APPDATA%`, `~/Library/Application Support` or `$XDG_DATA_HOME`, under a
//! `MiniPaint` folder), writes a header naming the build and platform, and
//! hooks panics so they land in the file too.
//!
//! Until `init()` runs, as in library use, headless scripts and unit tests,
//! the `log_info!` / `log_warn!` / `log_err!` macros discard their output.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};
use std::time::{SystemTime, UNIX_EPOCH};

static LOG_FILE: OnceLock<Mutex<File>> = OnceLock::new();

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    Info,
    Warn,
    Error,
    Panic,
}

impl Level {
    fn tag(self) -> &'static str {
        match self {
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
            Level::Panic => "PANIC",
        }
    }
}

#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        $crate::logger::write($crate::logger::Level::Info, &format!($($arg)*));
    };
}

#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        $crate::logger::write($crate::logger::Level::Warn, &format!($($arg)*));
    };
}

#[macro_export]
macro_rules! log_err {
    ($($arg:tt)*) => {
        $crate::logger::write($crate::logger::Level::Error, &format!($($arg)*));
    };
}

/// Append one entry. I/O errors are swallowed.
pub fn write(level: Level, msg: &str) {
    let Some(mutex) = LOG_FILE.get() else { return };
    if let Ok(mut file) = mutex.lock() {
        let _ = writeln!(file, "{}", format_entry(level, msg, unix_seconds()));
    }
}

/// Open the session log. Failing to open it only costs the log.
pub fn init() {
    let path = data_dir().join("MiniPaint").join("minipaint.log");
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }

    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&path);
    let mut file = match file {
        Ok(f) => f,
        Err(e) => {
            eprintln!("minipaint: cannot open log {}: {}", path.display(), e);
            return;
        }
    };
    let _ = writeln!(file, "{}", session_header(unix_seconds()));
    let _ = writeln!(file, "# log: {}", path.display());
    if LOG_FILE.set(Mutex::new(file)).is_err() {
        return;
    }

    let prev = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        write(Level::Panic, &info.to_string());
        prev(info);
    }));
}

fn session_header(secs: u64) -> String {
    format!(
        "# MiniPaint {} on {}/{}, started {} UTC",
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS,
        std::env::consts::ARCH,
        clock(secs)
    )
}

fn format_entry(level: Level, msg: &str, secs: u64) -> String {
    format!("{} {:<5} {}", clock(secs), level.tag(), msg)
}

/// HH:MM:SS of the UTC day.
fn clock(secs: u64) -> String {
    format!("{:02}:{:02}:{:02}", secs % 86_400 / 3600, secs % 3600 / 60, secs % 60)
}

fn unix_seconds() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_secs())
}

fn data_dir() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Ok(appdata) = std::env::var("APPDATA") {
            return PathBuf::from(appdata);
        }
    }
    #[cfg(target_os = "macos")]
    {
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home).join("Library").join("Application Support");
        }
    }
    std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .or_else(|_| std::env::var("HOME").map(|h| PathBuf::from(h).join(".local").join("share")))
        .unwrap_or_else(|_| PathBuf::from("."))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_wraps_at_midnight() {
        assert_eq!(clock(0), "00:00:00");
        assert_eq!(clock(86_399), "23:59:59");
        assert_eq!(clock(86_400 + 3_725), "01:02:05");
    }

    #[test]
    fn entries_carry_time_and_padded_level() {
        assert_eq!(format_entry(Level::Info, "canvas ready", 61), "00:01:01 INFO  canvas ready");
        assert_eq!(format_entry(Level::Error, "boom", 0), "00:00:00 ERROR boom");
    }

    #[test]
    fn header_names_version_and_platform() {
        let header = session_header(0);
        assert!(header.contains(env!("CARGO_PKG_VERSION")));
        assert!(header.contains(std::env::consts::OS));
    }

    #[test]
    fn writing_before_init_is_harmless() {
        write(Level::Warn, "nobody is listening");
    }
}
