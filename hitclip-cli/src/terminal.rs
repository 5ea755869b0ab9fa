//! Terminal presentation helpers.
//!
//! Everything is emitted through `log::info!` so the same lines reach the
//! console and the run log. Styling is skipped when `NO_COLOR` is set or
//! stdout cannot show colors.

use console::style;
use log::info;
use owo_colors::OwoColorize;
use unicode_width::UnicodeWidthStr;

const LABEL_WIDTH: usize = 15;
const STATUS_INDENT: &str = "  ";

/// Check if color should be used
pub fn should_use_color() -> bool {
    std::env::var_os("NO_COLOR").is_none()
        && supports_color::on(supports_color::Stream::Stdout).is_some()
}

/// Print a section header for a phase of the run
pub fn print_section(title: &str) {
    info!("");
    if should_use_color() {
        info!("===== {} =====", title.to_uppercase().cyan());
    } else {
        info!("===== {} =====", title.to_uppercase());
    }
    info!("");
}

/// Print a processing step
pub fn print_processing(message: &str) {
    if should_use_color() {
        info!("{STATUS_INDENT}» {}", style(message).bold());
    } else {
        info!("{STATUS_INDENT}» {message}");
    }
}

/// Print a status line (key-value pair)
pub fn print_status(label: &str, value: &str, highlight: bool) {
    info!("{}", status_line(label, value, highlight && should_use_color()));
}

fn status_line(label: &str, value: &str, bold: bool) -> String {
    let padding = LABEL_WIDTH.saturating_sub(label.width()).max(1);
    let value = if bold {
        style(value).bold().to_string()
    } else {
        value.to_string()
    };
    format!("{STATUS_INDENT}{label}:{} {value}", " ".repeat(padding))
}

pub fn print_success(message: &str) {
    info!("");
    if should_use_color() {
        info!("{STATUS_INDENT}✓ {}", message.green());
    } else {
        info!("{STATUS_INDENT}✓ {message}");
    }
}

pub fn print_warning(message: &str) {
    if should_use_color() {
        info!("{STATUS_INDENT}⚠ {}", message.yellow());
    } else {
        info!("{STATUS_INDENT}⚠ {message}");
    }
}

/// Print an error block with an optional suggestion
pub fn print_error(title: &str, message: &str, suggestion: Option<&str>) {
    if should_use_color() {
        info!("✗ {}", title.red().bold());
    } else {
        info!("✗ {title}");
    }
    info!("");
    for line in message.lines() {
        info!("{STATUS_INDENT}{line}");
    }
    if let Some(suggestion) = suggestion {
        info!("");
        info!("{STATUS_INDENT}Suggestion: {suggestion}");
    }
    info!("");
}
