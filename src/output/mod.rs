//! Output helpers: ANSI true-color escapes and number formatting.

mod format;
mod terminal;

pub use format::{format_human, format_thousands};
pub use terminal::{
    bold, center, fg, paint, push_painted, strip_ansi, visible_width, BOLD, CLEAR_SCREEN, RESET,
};
