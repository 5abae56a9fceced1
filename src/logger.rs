//! Logging utilities with colored module prefixes.
//!
//! Provides the `log!` and `debug!` macros for formatted terminal output.
//!
//! # Example
//!
//! ```ignore
//! log!("publish"; "copied {} files", count);
//! debug!("bundle"; "cache hit for {}", name);
//! ```

use owo_colors::{OwoColorize, Stream, Style};
use std::{
    io::{Write, stdout},
    sync::atomic::{AtomicBool, Ordering},
};

/// Global verbose flag (set by --verbose CLI argument)
static VERBOSE: AtomicBool = AtomicBool::new(false);

/// Set verbose mode globally
pub fn set_verbose(v: bool) {
    VERBOSE.store(v, Ordering::SeqCst);
}

/// Check if verbose mode is enabled
pub fn is_verbose() -> bool {
    VERBOSE.load(Ordering::SeqCst)
}

/// Log a message with a colored module prefix
///
/// # Usage
/// ```ignore
/// log!("module"; "message with {} formatting", args);
/// ```
#[macro_export]
macro_rules! log {
    ($module:expr; $($arg:tt)*) => {{
        $crate::logger::log($module, &format!($($arg)*))
    }};
}

/// Log a debug message (only shown when --verbose is enabled)
///
/// # Usage
/// ```ignore
/// debug!("module"; "debug info: {}", value);
/// ```
#[macro_export]
macro_rules! debug {
    ($module:expr; $($arg:tt)*) => {{
        if $crate::logger::is_verbose() {
            $crate::logger::log($module, &format!($($arg)*))
        }
    }};
}

/// Log a message with a colored module prefix
#[inline]
pub fn log(module: &str, message: &str) {
    let prefix = colorize_prefix(module);
    let mut stdout = stdout().lock();
    writeln!(stdout, "{prefix} {message}").ok();
    stdout.flush().ok();
}

/// Apply color to a module prefix based on module type
///
/// Styling goes through `if_supports_color`, so the global owo-colors
/// override set from `--color` applies here too.
#[inline]
fn colorize_prefix(module: &str) -> String {
    let prefix = format!("[{module}]");
    let style = match module.to_ascii_lowercase().as_str() {
        "publish" => Style::new().bright_green().bold(),
        "bundle" => Style::new().bright_blue().bold(),
        "error" => Style::new().bright_red().bold(),
        "warning" => Style::new().yellow().bold(),
        _ => Style::new().bright_yellow().bold(),
    };
    prefix
        .if_supports_color(Stream::Stdout, |p| p.style(style))
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbose_flag_round_trip() {
        set_verbose(true);
        assert!(is_verbose());
        set_verbose(false);
        assert!(!is_verbose());
    }

    #[test]
    fn test_colorize_prefix_honors_override() {
        // One test toggles the global override both ways; splitting this
        // up would race under the parallel test runner.
        owo_colors::set_override(true);
        assert!(colorize_prefix("publish").contains("\u{1b}["));

        owo_colors::set_override(false);
        assert_eq!(colorize_prefix("publish"), "[publish]");
        assert_eq!(colorize_prefix("anything"), "[anything]");
    }
}
