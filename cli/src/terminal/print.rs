//! Raw terminal output.
//!
//! Every line goes through [`print`], which emits a `tracing` event on
//! [`PRINT_TARGET`]; the formatter writes those events without a prefix.

use crate::terminal::colors;
use crate::terminal::format::Detail;
use colored::*;
use tracing::info;
use unicode_width::UnicodeWidthStr;

pub const TOTAL_WIDTH: usize = 64;

pub const PRINT_TARGET: &str = "pulpvp::print";

#[macro_export]
macro_rules! pprint {
    () => {
        $crate::terminal::print::print("");
    };
    ($msg:expr) => {
        $crate::terminal::print::print($msg);
    };
}

pub fn print(msg: &str) {
    info!(target: PRINT_TARGET, raw_msg = msg);
}

/// `──⟦ TITLE ⟧──` centered on the terminal width. Hidden when quiet.
pub fn header(title: &str, quiet: u8) {
    if quiet > 0 {
        return;
    }

    let title = format!("⟦ {} ⟧", title.to_uppercase());
    let fill = TOTAL_WIDTH.saturating_sub(UnicodeWidthStr::width(title.as_str()));
    let (left, right) = (fill / 2, fill - fill / 2);

    print(&format!(
        "{}{}{}",
        "─".repeat(left).color(colors::SEPARATOR),
        title.color(colors::PRIMARY),
        "─".repeat(right).color(colors::SEPARATOR)
    ));
}

/// `> key....: value` with keys padded to `key_width`.
pub fn field(key: &str, value: impl Into<ColoredString>, key_width: usize) {
    print(&format!(
        "{} {}{} {}",
        ">".color(colors::SEPARATOR),
        key.color(colors::PRIMARY),
        leader(key, key_width),
        value.into()
    ));
}

/// A numbered heading followed by its rows drawn as a one level tree.
pub fn section(idx: usize, title: &str, rows: &[Detail]) {
    print(&format!(
        "{}{}{} {}",
        "[".color(colors::SEPARATOR),
        idx.to_string().color(colors::ACCENT),
        "]".color(colors::SEPARATOR),
        title.color(colors::PRIMARY)
    ));

    if rows.is_empty() {
        print(&format!(" {} {}", "└─".color(colors::SEPARATOR), "none".dimmed()));
        return;
    }

    let key_width = rows.iter().map(|(key, _)| key.width()).max().unwrap_or(0);
    for (i, (key, value)) in rows.iter().enumerate() {
        let branch = if i + 1 < rows.len() { "├─" } else { "└─" };
        print(&format!(
            " {} {}{} {}",
            branch.color(colors::SEPARATOR),
            key.color(colors::TEXT_DEFAULT),
            leader(key, key_width),
            value
        ));
    }
}

pub fn centerln(msg: &str) {
    let pad = " ".repeat(TOTAL_WIDTH.saturating_sub(console::measure_text_width(msg)) / 2);
    print(&format!("{pad}{msg}"));
}

pub fn rule() {
    print(&"═".repeat(TOTAL_WIDTH).color(colors::SEPARATOR).to_string());
}

/// Dots from the end of `key` up to `width`, then a colon.
fn leader(key: &str, width: usize) -> ColoredString {
    let dots = ".".repeat((width + 1).saturating_sub(key.width()));
    format!("{dots}:").color(colors::SEPARATOR)
}
