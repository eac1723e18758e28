//! Removing work directories.

use std::path::PathBuf;

use anyhow::Result;
use tracing::debug;

use crate::util::context::RunContext;
use crate::util::fs::remove_dir_all_if_exists;

/// Remove the Debian and RPM staging roots.
///
/// Returns the directories that existed and were removed.
pub fn clean_staging(ctx: &RunContext) -> Result<Vec<PathBuf>> {
    remove_all([ctx.deb_dir(), ctx.rpm_dir()])
}

/// Remove the staging roots and, with `all`, fetched artifacts as well.
pub fn clean(ctx: &RunContext, all: bool) -> Result<Vec<PathBuf>> {
    let mut removed = clean_staging(ctx)?;
    if all {
        removed.extend(remove_all([ctx.artifacts_dir(), ctx.downloads_dir()])?);
    }
    Ok(removed)
}

fn remove_all<const N: usize>(dirs: [PathBuf; N]) -> Result<Vec<PathBuf>> {
    let mut removed = Vec::new();
    for dir in dirs {
        if remove_dir_all_if_exists(&dir)? {
            debug!("removed {}", dir.display());
            removed.push(dir);
        }
    }
    Ok(removed)
}
