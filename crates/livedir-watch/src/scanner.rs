//! Static asset discovery by filesystem walking.
//!
//! Every directory under the root is descended, hidden ones included. Files are
//! kept when their lowercased name ends with one of [`STATIC_EXTENSIONS`].
//! Results are relative to the root, `/`-separated, deduplicated and sorted.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

/// File name suffixes that count as static assets (compared lowercased).
pub const STATIC_EXTENSIONS: &[&str] = &[".html", ".css", ".js", ".png", ".jpg", ".jpeg", ".svg"];

/// Check whether a file name has one of the static asset extensions.
///
/// Only the file name is inspected, case-insensitively.
pub fn is_static_file(name: &str) -> bool {
    let lower = name.to_lowercase();
    STATIC_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

/// Scan `root` and return the sorted relative paths of all static assets.
///
/// Shorthand for `Scanner::new(root).scan()`.
pub fn scan_static_files(root: &Path) -> Vec<String> {
    Scanner::new(root.to_path_buf()).scan()
}

/// Discovers static assets by walking the filesystem.
pub struct Scanner {
    root: PathBuf,
}

impl Scanner {
    /// Create a new Scanner rooted at `root`.
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Scan the filesystem and return matching relative paths in ascending order.
    ///
    /// Returns an empty Vec if the root doesn't exist. Unreadable directories are
    /// skipped with a warning.
    pub fn scan(&self) -> Vec<String> {
        let walk = self.walk();
        tracing::debug!(root = %self.root.display(), count = walk.files.len(), "Scanned static files");
        walk.files.into_iter().collect()
    }

    /// Every directory under the root that could be listed, root first.
    ///
    /// Unreadable directories are left out, along with everything below them.
    pub fn directories(&self) -> Vec<PathBuf> {
        self.walk().dirs
    }

    fn walk(&self) -> Walk {
        let mut walk = Walk::default();
        if self.root.exists() {
            walk.visit(&self.root, "");
        }
        walk
    }
}

/// Accumulated results of one traversal.
#[derive(Default)]
struct Walk {
    files: BTreeSet<String>,
    dirs: Vec<PathBuf>,
}

impl Walk {
    fn visit(&mut self, dir_path: &Path, prefix: &str) {
        let entries = match fs::read_dir(dir_path) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(path = %dir_path.display(), error = %e, "Failed to read directory, skipping");
                return;
            }
        };
        self.dirs.push(dir_path.to_path_buf());

        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!(path = %dir_path.display(), error = %e, "Failed to read directory entry, skipping");
                    continue;
                }
            };
            let Ok(file_type) = entry.file_type() else {
                continue;
            };

            let name = entry.file_name().to_string_lossy().into_owned();
            let relative = if prefix.is_empty() {
                name.clone()
            } else {
                format!("{prefix}/{name}")
            };

            if file_type.is_dir() {
                self.visit(&entry.path(), &relative);
            } else if is_static_file(&name) && is_regular_file(&entry, file_type) {
                self.files.insert(relative);
            }
        }
    }
}

/// Symlinks count when they point at a regular file; they are never descended.
fn is_regular_file(entry: &fs::DirEntry, file_type: fs::FileType) -> bool {
    file_type.is_file() || (file_type.is_symlink() && entry.path().is_file())
}
