//! Terminal output helpers (ANSI SGR true color).
//!
//! Every colored run closes its own escape, so lines can be printed,
//! re-printed or concatenated without color bleeding across them.

use std::fmt::Write as FmtWrite;

use crate::color::Rgb;

/// SGR reset.
pub const RESET: &str = "\x1b[0m";

/// SGR bold.
pub const BOLD: &str = "\x1b[1m";

/// Clear the screen and home the cursor. Emitted by the refresh loop only.
pub const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

/// Foreground true-color escape for `color`.
#[must_use]
pub fn fg(color: Rgb) -> String {
    format!("\x1b[38;2;{};{};{}m", color.r, color.g, color.b)
}

/// Append `text` wrapped in a foreground color escape and a reset.
pub fn push_painted(out: &mut String, text: &str, color: Rgb) {
    let _ = write!(out, "\x1b[38;2;{};{};{}m{text}{RESET}", color.r, color.g, color.b);
}

/// Wrap `text` in a foreground color escape and a reset.
#[must_use]
pub fn paint(text: &str, color: Rgb) -> String {
    let mut out = String::with_capacity(text.len() + 24);
    push_painted(&mut out, text, color);
    out
}

/// Wrap `text` in bold and a reset.
#[must_use]
pub fn bold(text: &str) -> String {
    format!("{BOLD}{text}{RESET}")
}

/// Center `text` in a field of `width` visible characters.
///
/// Text at least as wide as the field is returned unchanged.
#[must_use]
pub fn center(text: &str, width: usize) -> String {
    let len = visible_width(text);
    if len >= width {
        return text.to_string();
    }
    let left = (width - len) / 2;
    let right = width - len - left;
    format!("{}{text}{}", " ".repeat(left), " ".repeat(right))
}

/// Remove CSI escape sequences (colors, screen clears), leaving only printable text.
#[must_use]
pub fn strip_ansi(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c == '\x1b' {
            // CSI: "[", parameters, then one final byte in '@'..='~'
            if chars.next() == Some('[') {
                for inner in chars.by_ref() {
                    if ('@'..='~').contains(&inner) {
                        break;
                    }
                }
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Number of visible characters in `text`, ignoring escapes.
#[must_use]
pub fn visible_width(text: &str) -> usize {
    strip_ansi(text).chars().count()
}
