// src/fs/browser.rs
//! Directory listing for the file picker.

use std::{fs, path::Path};

use super::detection::{detect_file_type, FileCategory};

/// One directory entry as shown by the picker.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub name: String,
    pub is_dir: bool,
    pub category: FileCategory,
    pub mime: String,
}

/// Load the entries of `dir`, directories first, then alphabetically (case-insensitive).
/// An unreadable directory yields an empty list.
pub fn load_entries(dir: &Path) -> Vec<Entry> {
    let read = match fs::read_dir(dir) {
        Ok(read) => read,
        Err(e) => {
            log::warn!("Cannot list {}: {e}", dir.display());
            return Vec::new();
        }
    };

    let mut list: Vec<Entry> = read
        .filter_map(|e| e.ok())
        .map(|e| {
            let name = e.file_name().to_string_lossy().into_owned();
            let path = e.path();
            if path.is_dir() {
                Entry {
                    name,
                    is_dir: true,
                    category: FileCategory::Binary,
                    mime: String::new(),
                }
            } else {
                let (category, mime) = match detect_file_type(&path) {
                    Ok(ft) => (ft.category, ft.mime),
                    Err(_) => (FileCategory::Binary, String::new()),
                };
                Entry {
                    name,
                    is_dir: false,
                    category,
                    mime,
                }
            }
        })
        .collect();

    list.sort_by_key(|e| (!e.is_dir, e.name.to_lowercase()));
    list
}

/// Last `depth` components of `path`, for compact titles.
pub fn tail_path(path: &Path, depth: usize) -> String {
    let parts: Vec<String> = path
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .filter(|s| s != "/")
        .collect();
    let start = parts.len().saturating_sub(depth);
    let tail = parts[start..].join("/");
    if start > 0 {
        format!(".../{tail}")
    } else {
        format!("/{tail}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directories_sort_first() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("zeta")).unwrap();
        fs::write(dir.path().join("Alpha.txt"), b"hello").unwrap();
        fs::write(dir.path().join("beta.mp3"), b"not really").unwrap();

        let names: Vec<String> = load_entries(dir.path()).into_iter().map(|e| e.name).collect();
        assert_eq!(names, vec!["zeta", "Alpha.txt", "beta.mp3"]);
    }

    #[test]
    fn missing_directory_is_empty() {
        assert!(load_entries(Path::new("/definitely/not/here")).is_empty());
    }

    #[test]
    fn tail_keeps_last_components() {
        assert_eq!(tail_path(Path::new("/home/user/music/albums"), 2), ".../music/albums");
        assert_eq!(tail_path(Path::new("/music"), 3), "/music");
    }
}
