// src/ui/icons.rs
//! Icon mappings for file browser entries.

use crate::fs::{Entry, FileCategory};

/// Nerd-font glyph for a browser entry.
pub fn icon_for_entry(entry: &Entry) -> &'static str {
    if entry.is_dir {
        return "\u{f07b}"; // folder icon
    }
    match entry.category {
        FileCategory::Audio => "\u{f1c7}",
        FileCategory::Image => "\u{f1c5}",
        FileCategory::Video => "\u{f1c8}",
        FileCategory::Document => "\u{f15c}",
        FileCategory::Binary => "\u{f1c6}",
    }
}
