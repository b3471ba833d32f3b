use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::Path;

use thiserror::Error;

/// Errors that can occur while persisting rendered output.
#[derive(Debug, Error)]
pub enum WriteError {
    /// Failed to create, write, or rename output.
    #[error("failed to write output: {0}")]
    Io(#[from] std::io::Error),
    /// Failed to move a finished temp file over the destination.
    #[error("failed to move output into place: {0}")]
    Persist(#[from] tempfile::PersistError),
    /// File name would escape the output directory.
    #[error("invalid output file name '{0}'")]
    InvalidName(String),
    /// Destination for a multi-file target is an existing regular file.
    #[error("output path {0} exists and is not a directory")]
    NotADirectory(String),
    /// The swap failed and the previous output could not be moved back.
    #[error(
        "failed to move output into place: {swap}; restoring previous output also failed \
         ({restore}), it was kept at {backup}"
    )]
    Restore {
        swap: std::io::Error,
        restore: std::io::Error,
        backup: String,
    },
}

/// Write `contents` to `path` so readers see either the old file or the new
/// one, never a truncated mix.
pub fn write_file_atomic(path: &Path, contents: &str) -> Result<(), WriteError> {
    let parent = parent_dir(path);
    fs::create_dir_all(parent)?;
    let mut tmp = tempfile::NamedTempFile::new_in(parent)?;
    tmp.write_all(contents.as_bytes())?;
    tmp.as_file().sync_all()?;
    tmp.persist(path)?;
    Ok(())
}

/// Replace `dir` with a directory holding exactly `files`.
///
/// Everything is staged in a sibling temp directory first. An existing
/// directory is moved aside and only removed once the staged one is in
/// place; if the swap fails the old directory is restored.
pub fn write_dir_atomic(dir: &Path, files: &BTreeMap<String, String>) -> Result<(), WriteError> {
    for name in files.keys() {
        validate_name(name)?;
    }
    let dir_name = dir
        .file_name()
        .ok_or_else(|| WriteError::InvalidName(dir.display().to_string()))?
        .to_string_lossy()
        .into_owned();
    let parent = parent_dir(dir);
    fs::create_dir_all(parent)?;

    let stage = tempfile::Builder::new()
        .prefix(&format!(".{dir_name}.stage-"))
        .tempdir_in(parent)?;
    for (name, contents) in files {
        fs::write(stage.path().join(name), contents)?;
    }

    if !dir.exists() {
        fs::rename(stage.path(), dir)?;
        return Ok(());
    }
    if !dir.is_dir() {
        return Err(WriteError::NotADirectory(dir.display().to_string()));
    }

    let backup_root = tempfile::Builder::new()
        .prefix(&format!(".{dir_name}.old-"))
        .tempdir_in(parent)?;
    let backup = backup_root.path().join(&dir_name);
    fs::rename(dir, &backup)?;
    if let Err(swap) = fs::rename(stage.path(), dir) {
        if let Err(restore) = fs::rename(&backup, dir) {
            return Err(WriteError::Restore {
                swap,
                restore,
                backup: backup_root.keep().join(&dir_name).display().to_string(),
            });
        }
        return Err(swap.into());
    }
    if let Err(err) = backup_root.close() {
        tracing::warn!(output = %dir.display(), error = %err, "failed to remove previous output");
    }
    Ok(())
}

fn validate_name(name: &str) -> Result<(), WriteError> {
    let invalid = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains('/')
        || name.contains('\\');
    if invalid {
        return Err(WriteError::InvalidName(name.to_string()));
    }
    Ok(())
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}
