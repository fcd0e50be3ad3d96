//! Filesystem helpers used when preparing a test environment

use std::fs;
use std::io;
use std::path::Path;
use tracing::{debug, info};

use crate::error::Result;

/// Remove `dir` with everything below it and recreate it empty
pub fn create_empty_directory(dir: &Path) -> Result<()> {
    match fs::remove_dir_all(dir) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(e.into()),
    }
    fs::create_dir_all(dir)?;

    info!("Prepared empty directory {}", dir.display());
    Ok(())
}

/// Copy a file or a whole directory tree to `target`
///
/// Directories are merged into an existing target; files overwrite.
/// Below `source`, symlinks to files are copied as files and symlinks to
/// directories are skipped.
pub fn copy_files(source: &Path, target: &Path) -> Result<u64> {
    let copied = if fs::metadata(source)?.is_dir() {
        copy_tree(source, target)?
    } else {
        copy_file(source, target)?
    };

    debug!(
        "Copied {} files from {} to {}",
        copied,
        source.display(),
        target.display()
    );
    Ok(copied)
}

fn copy_tree(source: &Path, target: &Path) -> Result<u64> {
    fs::create_dir_all(target)?;
    let mut copied = 0;
    for entry in fs::read_dir(source)? {
        let entry = entry?;
        let path = entry.path();
        let destination = target.join(entry.file_name());
        let file_type = entry.file_type()?;

        if file_type.is_dir() {
            copied += copy_tree(&path, &destination)?;
        } else if file_type.is_symlink() && fs::metadata(&path)?.is_dir() {
            debug!("Skipping directory link {}", path.display());
        } else {
            copied += copy_file(&path, &destination)?;
        }
    }
    Ok(copied)
}

fn copy_file(source: &Path, target: &Path) -> Result<u64> {
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::copy(source, target)?;
    Ok(1)
}

/// Remove files, symlinks and directory trees; missing paths are skipped.
///
/// Returns how many of the paths existed.
pub fn remove_paths<P: AsRef<Path>>(paths: &[P]) -> Result<usize> {
    let mut removed = 0;
    for path in paths {
        let path = path.as_ref();
        let metadata = match fs::symlink_metadata(path) {
            Ok(m) => m,
            Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
            Err(e) => return Err(e.into()),
        };

        if metadata.is_dir() {
            fs::remove_dir_all(path)?;
        } else {
            fs::remove_file(path)?;
        }
        removed += 1;
    }
    Ok(removed)
}
