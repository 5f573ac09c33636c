//! Zip extraction and creation for study archives.

use log::debug;
use std::fs::{self, File};
use std::io;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },

    #[error("{path} is not a readable archive: {message}")]
    InvalidArchive { path: String, message: String },

    #[error("archive entry {0:?} points outside of the extraction directory")]
    UnsafePath(String),

    #[error("zip error: {0}")]
    Zip(String),
}

impl From<zip::result::ZipError> for ArchiveError {
    fn from(err: zip::result::ZipError) -> Self {
        ArchiveError::Zip(format!("{err}"))
    }
}

fn io_error(context: String) -> impl FnOnce(io::Error) -> ArchiveError {
    move |source| ArchiveError::Io { context, source }
}

/// Extracts all entries of the zip archive at `archive_path` into `dest_dir`.
///
/// Entries whose names would resolve outside of `dest_dir` are rejected.
pub fn extract(archive_path: &Path, dest_dir: &Path) -> Result<PathBuf, ArchiveError> {
    debug!(
        "extracting {} -> {}",
        archive_path.display(),
        dest_dir.display()
    );

    let file = File::open(archive_path)
        .map_err(io_error(format!("failed to open {}", archive_path.display())))?;
    let mut archive = ZipArchive::new(file).map_err(|e| ArchiveError::InvalidArchive {
        path: archive_path.display().to_string(),
        message: format!("{e}"),
    })?;

    fs::create_dir_all(dest_dir)
        .map_err(io_error(format!("failed to create {}", dest_dir.display())))?;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        let relative = entry
            .enclosed_name()
            .ok_or_else(|| ArchiveError::UnsafePath(entry.name().to_string()))?;
        let out_path = dest_dir.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&out_path)
                .map_err(io_error(format!("failed to create {}", out_path.display())))?;
            continue;
        }

        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent)
                .map_err(io_error(format!("failed to create {}", parent.display())))?;
        }
        let mut out_file = File::create(&out_path)
            .map_err(io_error(format!("failed to create {}", out_path.display())))?;
        io::copy(&mut entry, &mut out_file)
            .map_err(io_error(format!("failed to extract {}", out_path.display())))?;
    }

    Ok(dest_dir.to_path_buf())
}

/// Name of a zip entry for `path`, relative to `base_dir` and always `/` separated.
fn entry_name(path: &Path, base_dir: &Path) -> Option<String> {
    let relative = path.strip_prefix(base_dir).ok()?;
    let parts: Option<Vec<&str>> = relative
        .components()
        .map(|component| match component {
            Component::Normal(part) => part.to_str(),
            _ => None,
        })
        .collect();
    Some(parts?.join("/"))
}

/// Packs every file below `src_dir` into a deflate compressed zip archive at `archive_path`.
///
/// Entry names are relative to the parent of `src_dir`, so the archive unpacks into a single
/// folder named like `src_dir`.
pub fn create(src_dir: &Path, archive_path: &Path) -> Result<PathBuf, ArchiveError> {
    debug!(
        "archiving {} -> {}",
        src_dir.display(),
        archive_path.display()
    );

    let base_dir = src_dir.parent().unwrap_or(src_dir);
    let file = File::create(archive_path)
        .map_err(io_error(format!("failed to create {}", archive_path.display())))?;
    let mut writer = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for entry in WalkDir::new(src_dir).sort_by_file_name() {
        let entry = entry.map_err(|e| ArchiveError::Io {
            context: format!("failed to walk {}", src_dir.display()),
            source: e.into(),
        })?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let name = entry_name(path, base_dir)
            .ok_or_else(|| ArchiveError::UnsafePath(path.display().to_string()))?;
        writer.start_file(name, options)?;
        let mut src = File::open(path)
            .map_err(io_error(format!("failed to open {}", path.display())))?;
        io::copy(&mut src, &mut writer)
            .map_err(io_error(format!("failed to archive {}", path.display())))?;
    }

    writer.finish()?;
    Ok(archive_path.to_path_buf())
}
