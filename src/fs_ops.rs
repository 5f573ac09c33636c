//! Filesystem helpers for walking and cleaning up a study working tree.

use log::warn;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Lazily yields every regular file below `root`, deepest entries first, siblings sorted
/// by file name.
///
/// Unreadable entries are logged and skipped.
pub fn candidate_files(root: &Path) -> impl Iterator<Item = PathBuf> {
    WalkDir::new(root)
        .contents_first(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("skipping unreadable entry: {e}");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
}

/// Removes a file, treating an already missing file as success.
pub fn remove_file_if_exists(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        result => result,
    }
}

/// Recursively removes a directory, treating an already missing directory as success.
pub fn remove_dir_if_exists(path: &Path) -> io::Result<()> {
    match fs::remove_dir_all(path) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        result => result,
    }
}

/// Removes every directory below `root` that is (or becomes) empty. `root` itself is kept.
///
/// Returns the number of removed directories.
pub fn prune_empty_dirs(root: &Path) -> io::Result<usize> {
    let mut dirs = Vec::new();
    for entry in WalkDir::new(root).min_depth(1).contents_first(true) {
        let entry = entry?;
        if entry.file_type().is_dir() {
            dirs.push(entry.into_path());
        }
    }

    let mut removed = 0;
    for dir in dirs {
        if fs::read_dir(&dir)?.next().is_none() {
            fs::remove_dir(&dir)?;
            removed += 1;
        }
    }
    Ok(removed)
}

/// Number of directories directly below `root`.
pub fn count_series_dirs(root: &Path) -> io::Result<usize> {
    let mut count = 0;
    for entry in fs::read_dir(root)? {
        if entry?.file_type()?.is_dir() {
            count += 1;
        }
    }
    Ok(count)
}

/// Number of regular files anywhere below `root`.
pub fn count_files(root: &Path) -> io::Result<usize> {
    let mut count = 0;
    for entry in WalkDir::new(root) {
        if entry?.file_type().is_file() {
            count += 1;
        }
    }
    Ok(count)
}
