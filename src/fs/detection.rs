// src/fs/detection.rs
//! File type detection using magic numbers and extension-based fallback.

use std::{
    fmt,
    fs::File,
    io::Read,
    path::Path,
};

use infer::{Infer, MatcherType};
use mime_guess::MimeGuess;

use crate::error::{Result, VisualizerError};

/// Bytes read from the head of a file for magic-number sniffing.
pub const SNIFF_LEN: u64 = 8192;

/// High-level file categories.
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum FileCategory {
    Image,
    Audio,
    Video,
    Document,
    Binary,
}

impl fmt::Display for FileCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FileCategory::Image => "Image",
            FileCategory::Audio => "Audio",
            FileCategory::Video => "Video",
            FileCategory::Document => "Document",
            FileCategory::Binary => "Binary",
        };
        write!(f, "{}", s)
    }
}

/// Holds a detected MIME type + category.
#[derive(Debug, Clone, PartialEq)]
pub struct FileType {
    pub mime: String,
    pub category: FileCategory,
}

impl FileType {
    pub fn is_audio(&self) -> bool {
        self.mime.starts_with("audio/")
    }
}

/// Classify content from its leading bytes, falling back to the file name.
pub fn sniff(name: &Path, head: &[u8]) -> FileType {
    // 1. Try magic-number sniffing
    if let Some(kind) = Infer::new().get(head) {
        let mime = kind.mime_type().to_string();
        let category = match kind.matcher_type() {
            MatcherType::Image => FileCategory::Image,
            MatcherType::Audio => FileCategory::Audio,
            MatcherType::Video => FileCategory::Video,
            _ => FileCategory::Binary,
        };
        return FileType { mime, category };
    }

    // 2. Fallback to extension-based lookup
    let mime = MimeGuess::from_path(name)
        .first_or_octet_stream() // defaults to application/octet-stream
        .to_string();

    // 3. Map top-level type to category
    let category = match mime.split('/').next().unwrap_or("application") {
        "image" => FileCategory::Image,
        "audio" => FileCategory::Audio,
        "video" => FileCategory::Video,
        "text" => FileCategory::Document,
        "application" => FileCategory::Document,
        _ => FileCategory::Binary,
    };

    FileType { mime, category }
}

/// Detect MIME type & category for a given file path.
pub fn detect_file_type(path: &Path) -> Result<FileType> {
    let mut head = Vec::with_capacity(SNIFF_LEN as usize);
    File::open(path)?.take(SNIFF_LEN).read_to_end(&mut head)?;
    Ok(sniff(path, &head))
}

/// Reject anything whose MIME type is not `audio/...`.
pub fn ensure_audio(name: &Path, head: &[u8]) -> Result<FileType> {
    let file_type = sniff(name, head);
    if file_type.is_audio() {
        Ok(file_type)
    } else {
        Err(VisualizerError::InvalidInput {
            mime: file_type.mime,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wav_header() -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(b"RIFF");
        bytes.extend_from_slice(&36u32.to_le_bytes());
        bytes.extend_from_slice(b"WAVEfmt ");
        bytes.resize(44, 0);
        bytes
    }

    #[test]
    fn wav_magic_is_audio() {
        let file_type = ensure_audio(Path::new("clip.bin"), &wav_header()).unwrap();
        assert_eq!(file_type.category, FileCategory::Audio);
        assert!(file_type.mime.starts_with("audio/"));
    }

    #[test]
    fn png_magic_is_rejected_even_with_audio_name() {
        let png = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];
        let err = ensure_audio(Path::new("song.mp3"), &png).unwrap_err();
        match err {
            VisualizerError::InvalidInput { mime } => assert_eq!(mime, "image/png"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn extension_fallback_for_unknown_bytes() {
        let file_type = sniff(Path::new("track.mp3"), b"no magic here");
        assert_eq!(file_type.mime, "audio/mpeg");
        assert!(file_type.is_audio());

        let text = sniff(Path::new("notes.txt"), b"no magic here");
        assert_eq!(text.category, FileCategory::Document);
        assert!(ensure_audio(Path::new("notes.txt"), b"plain").is_err());
    }

    #[test]
    fn reads_head_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tone.dat");
        std::fs::write(&path, wav_header()).unwrap();
        assert!(detect_file_type(&path).unwrap().is_audio());
    }
}
