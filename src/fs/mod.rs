// src/fs/mod.rs
//! Filesystem module - handles file browsing and audio input validation.

pub mod browser;
pub mod detection;

// Re-export commonly used types
pub use browser::{load_entries, tail_path, Entry};
pub use detection::{detect_file_type, ensure_audio, sniff, FileCategory, FileType, SNIFF_LEN};
