//! Nice `kptsym` output formatting.

use std::fmt;

use log;

/// Logs a warning to the `kptsym-output` logger as well as to the default logger.
macro_rules! kptsym_warn {
    ($fmt:expr $(, $($arg:tt)*)?) => {
        log::warn!($fmt, $($($arg)*)?);
        log::warn!(target: "kptsym-output", $fmt, $($($arg)*)?);
    }
}

/// Logs a main output line to the `kptsym-output` logger.
macro_rules! kptsym_output {
    ($fmt:expr $(, $($arg:tt)*)?) => { log::info!(target: "kptsym-output", $fmt, $($($arg)*)?); }
}

pub(crate) use {kptsym_output, kptsym_warn};

/// Writes a nicely formatted subtitle.
pub(crate) fn write_subtitle(f: &mut fmt::Formatter<'_>, subtitle: &str) -> fmt::Result {
    let length = subtitle.chars().count();
    let bar = "═".repeat(length);
    writeln!(f, "{subtitle}")?;
    writeln!(f, "{bar}")?;
    Ok(())
}

/// Logs a nicely formatted subtitle to the `kptsym-output` logger.
pub(crate) fn log_subtitle(subtitle: &str) {
    let length = subtitle.chars().count();
    let bar = "═".repeat(length);
    kptsym_output!("{}", subtitle);
    kptsym_output!("{}", bar);
}

/// Turns a boolean into a string of `yes` or `no`.
pub(crate) fn nice_bool(b: bool) -> String {
    if b {
        "yes".to_string()
    } else {
        "no".to_string()
    }
}

/// A trait for logging `kptsym` outputs nicely.
pub(crate) trait KptsymOutput: fmt::Debug + fmt::Display {
    /// Logs display output nicely.
    fn log_output_display(&self) {
        let lines = self.to_string();
        lines.lines().for_each(|line| {
            kptsym_output!("{line}");
        })
    }
}

// Blanket implementation
impl<T> KptsymOutput for T where T: fmt::Debug + fmt::Display {}
