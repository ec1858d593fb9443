//! Nice QAngMom output formatting.

use std::fmt;

use log;

const QANGMOM_BANNER_LENGTH: usize = 79;

/// Logs a warning to the `qangmom-output` logger.
macro_rules! qangmom_warn {
    ($fmt:expr $(, $($arg:tt)*)?) => {
        log::warn!($fmt, $($($arg)*)?);
        log::warn!(target: "qangmom-output", $fmt, $($($arg)*)?);
    }
}

/// Logs a main output line to the `qangmom-output` logger.
macro_rules! qangmom_output {
    ($fmt:expr $(, $($arg:tt)*)?) => { log::info!(target: "qangmom-output", $fmt, $($($arg)*)?); }
}

pub(crate) use {qangmom_output, qangmom_warn};

/// Logs a nicely formatted section title to the `qangmom-output` logger.
pub(crate) fn log_title(title: &str) {
    let length = title.chars().count().max(QANGMOM_BANNER_LENGTH - 6);
    let bar = "─".repeat(length);
    qangmom_output!("┌──{bar}──┐");
    qangmom_output!("│§ {title:^length$} §│");
    qangmom_output!("└──{bar}──┘");
}

/// Writes a nicely formatted subtitle.
pub(crate) fn write_subtitle(f: &mut fmt::Formatter<'_>, subtitle: &str) -> fmt::Result {
    let length = subtitle.chars().count();
    let bar = "═".repeat(length);
    writeln!(f, "{subtitle}")?;
    writeln!(f, "{bar}")?;
    Ok(())
}

/// Logs a nicely formatted subtitle to the `qangmom-output` logger.
pub(crate) fn log_subtitle(subtitle: &str) {
    let length = subtitle.chars().count();
    let bar = "═".repeat(length);
    qangmom_output!("{}", subtitle);
    qangmom_output!("{}", bar);
}

/// Turns a boolean into a string of `yes` or `no`.
pub(crate) fn nice_bool(b: bool) -> String {
    if b {
        "yes".to_string()
    } else {
        "no".to_string()
    }
}

/// Formats a doubled quantum number as an integral or half-integral fraction, *e.g.* `3` becomes
/// `3/2` and `4` becomes `2`.
pub(crate) fn nice_half(two_x: i32) -> String {
    if two_x % 2 == 0 {
        format!("{}", two_x / 2)
    } else {
        format!("{two_x}/2")
    }
}

/// A trait for logging `QAngMom` outputs nicely.
pub(crate) trait QAngMomOutput: fmt::Debug + fmt::Display {
    /// Logs display output nicely.
    fn log_output_display(&self) {
        let lines = self.to_string();
        lines.lines().for_each(|line| {
            qangmom_output!("{line}");
        })
    }
}

// Blanket implementation
impl<T> QAngMomOutput for T where T: fmt::Debug + fmt::Display {}
