//! Atomic file write operations.
//!
//! Output files are written to a hidden temporary file in the target
//! directory and renamed into place, so a reader never observes a partially
//! written dataset.

use std::io::{self, Write};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use camino::{Utf8Component, Utf8Path};
use cap_std::fs::{Dir, OpenOptions};

use crate::error::PersistError;

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Writes `contents` to `path` inside `dir` atomically.
///
/// `path` must be a bare file name.
///
/// # Errors
///
/// Returns [`PersistError::WriteError`] if the file cannot be written.
pub(crate) fn write_atomic(dir: &Dir, path: &Utf8Path, contents: &[u8]) -> Result<(), PersistError> {
    let write_error = |message: String| PersistError::WriteError {
        path: path.to_path_buf(),
        message,
    };

    let mut components = path.components();
    let (Some(Utf8Component::Normal(file_name)), None) = (components.next(), components.next())
    else {
        return Err(write_error("output path must be a file name".to_owned()));
    };
    let counter = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_nanos());
    let tmp_name = format!(
        ".{}.tmp.{}.{}.{}",
        file_name,
        std::process::id(),
        suffix,
        counter
    );

    if let Err(err) = write_temp_file(dir, &tmp_name, contents) {
        drop(dir.remove_file(&tmp_name));
        return Err(write_error(err.to_string()));
    }
    if let Err(err) = rename_into_place(dir, &tmp_name, file_name) {
        drop(dir.remove_file(&tmp_name));
        return Err(write_error(err.to_string()));
    }
    sync_directory(dir);

    Ok(())
}

fn write_temp_file(dir: &Dir, tmp_name: &str, contents: &[u8]) -> io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    let mut file = dir.open_with(tmp_name, &options)?;
    file.write_all(contents)?;
    file.sync_all()
}

#[cfg(windows)]
fn rename_into_place(dir: &Dir, tmp_name: &str, target_name: &str) -> io::Result<()> {
    // Windows rename fails if the target exists, so remove it first.
    match dir.remove_file(target_name) {
        Ok(()) => {}
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => return Err(err),
    }
    dir.rename(tmp_name, dir, target_name)
}

#[cfg(not(windows))]
fn rename_into_place(dir: &Dir, tmp_name: &str, target_name: &str) -> io::Result<()> {
    dir.rename(tmp_name, dir, target_name)
}

fn sync_directory(dir: &Dir) {
    // Best-effort; a failed directory sync does not undo the rename.
    drop(dir.open(".").and_then(|handle| handle.sync_all()));
}
