//! Filesystem utilities.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use walkdir::WalkDir;

/// Recursively merge the contents of `src` into `dst`.
///
/// Directories are merged, files and symlinks already present in `dst` are
/// replaced. Symlinks are recreated rather than followed so that library
/// version links survive staging. Returns the number of files copied.
pub fn merge_dir(src: &Path, dst: &Path) -> Result<usize> {
    ensure_dir(dst)?;
    let mut copied = 0;

    for entry in WalkDir::new(src).min_depth(1).follow_links(false) {
        let entry =
            entry.with_context(|| format!("failed to read directory: {}", src.display()))?;
        let rel = entry
            .path()
            .strip_prefix(src)
            .with_context(|| format!("path escapes source: {}", entry.path().display()))?;
        let target = dst.join(rel);
        let ty = entry.file_type();

        if ty.is_dir() {
            if target.is_symlink() || target.is_file() {
                remove_path(&target)?;
            }
            ensure_dir(&target)?;
        } else if ty.is_symlink() {
            let link = fs::read_link(entry.path())
                .with_context(|| format!("failed to read link: {}", entry.path().display()))?;
            remove_path(&target)?;
            symlink(&link, &target).with_context(|| {
                format!("failed to create symlink: {}", target.display())
            })?;
            copied += 1;
        } else {
            if target.is_symlink() {
                remove_path(&target)?;
            }
            fs::copy(entry.path(), &target).with_context(|| {
                format!(
                    "failed to copy {} to {}",
                    entry.path().display(),
                    target.display()
                )
            })?;
            copied += 1;
        }
    }

    Ok(copied)
}

/// Remove a file, symlink, or directory tree if it exists.
fn remove_path(path: &Path) -> Result<()> {
    let Ok(meta) = fs::symlink_metadata(path) else {
        return Ok(());
    };
    if meta.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    }
    .with_context(|| format!("failed to remove: {}", path.display()))
}

/// Remove a directory and all its contents, if it exists.
pub fn remove_dir_all_if_exists(path: &Path) -> Result<bool> {
    if path.exists() {
        fs::remove_dir_all(path)
            .with_context(|| format!("failed to remove directory: {}", path.display()))?;
        return Ok(true);
    }
    Ok(false)
}

/// Ensure a directory exists, creating it if necessary.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("failed to create directory: {}", path.display()))?;
    }
    Ok(())
}

/// Write a string to a file, creating parent directories if needed.
pub fn write_string(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    fs::write(path, contents)
        .with_context(|| format!("failed to write file: {}", path.display()))
}

/// Write a string to a file and mark it executable.
pub fn write_executable(path: &Path, contents: &str) -> Result<()> {
    write_string(path, contents)?;
    set_executable(path)
}

#[cfg(unix)]
fn set_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, fs::Permissions::from_mode(0o755))
        .with_context(|| format!("failed to set permissions: {}", path.display()))
}

#[cfg(not(unix))]
fn set_executable(_path: &Path) -> Result<()> {
    Ok(())
}

/// Move a file into `dest_dir`, replacing a file of the same name.
///
/// Falls back to copy-and-delete when the rename crosses filesystems.
pub fn move_into(file: &Path, dest_dir: &Path) -> Result<PathBuf> {
    let name = file
        .file_name()
        .with_context(|| format!("not a file: {}", file.display()))?;
    let dest = dest_dir.join(name);

    ensure_dir(dest_dir)?;
    if dest.exists() {
        fs::remove_file(&dest)
            .with_context(|| format!("failed to replace {}", dest.display()))?;
    }

    if fs::rename(file, &dest).is_err() {
        fs::copy(file, &dest).with_context(|| {
            format!("failed to move {} to {}", file.display(), dest.display())
        })?;
        fs::remove_file(file)
            .with_context(|| format!("failed to remove {}", file.display()))?;
    }

    Ok(dest)
}

/// Create a symlink (platform-aware).
#[cfg(unix)]
pub fn symlink(src: &Path, dst: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(src, dst)
}

#[cfg(windows)]
pub fn symlink(src: &Path, dst: &Path) -> io::Result<()> {
    if src.is_dir() {
        std::os::windows::fs::symlink_dir(src, dst)
    } else {
        std::os::windows::fs::symlink_file(src, dst)
    }
}
