//! File-existence lookups.
//!
//! Entry-file checks go through the [`FileLookup`] trait so hosts can stub
//! the filesystem in tests or add caching. [`DiskFileLookup`] is the default
//! blocking implementation, with caller-configurable case sensitivity for
//! platforms where manifests were authored against a case-insensitive
//! filesystem.

use std::path::{Path, PathBuf};

/// Checks whether a file exists under a mod folder.
pub trait FileLookup {
    /// Whether `relative_path` exists as a file under `directory`.
    fn file_exists(&self, directory: &Path, relative_path: &str) -> bool;
}

/// Direct filesystem lookup.
#[derive(Debug, Clone, Copy)]
pub struct DiskFileLookup {
    case_insensitive: bool,
}

impl DiskFileLookup {
    pub fn new(case_insensitive: bool) -> Self {
        Self { case_insensitive }
    }
}

impl FileLookup for DiskFileLookup {
    fn file_exists(&self, directory: &Path, relative_path: &str) -> bool {
        if !self.case_insensitive {
            return directory.join(relative_path).is_file();
        }

        // Resolve each component against a directory listing so the match
        // ignores case even on case-sensitive filesystems.
        let mut current = directory.to_path_buf();
        let relative = Path::new(relative_path);
        for component in relative.components() {
            let Some(name) = component.as_os_str().to_str() else {
                return false;
            };
            match find_entry_ignore_case(&current, name) {
                Some(path) => current = path,
                None => return false,
            }
        }
        current.is_file()
    }
}

fn find_entry_ignore_case(directory: &Path, name: &str) -> Option<PathBuf> {
    let wanted = name.to_lowercase();
    let entries = std::fs::read_dir(directory).ok()?;
    for entry in entries.flatten() {
        let file_name = entry.file_name();
        if let Some(entry_name) = file_name.to_str() {
            if entry_name.to_lowercase() == wanted {
                return Some(entry.path());
            }
        }
    }
    None
}
