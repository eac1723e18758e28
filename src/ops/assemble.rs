//! Package staging.
//!
//! Staging merges the selected artifact paths into a single tree that
//! mirrors the final install layout. Later sources overwrite files from
//! earlier ones. Staging is not atomic: if a copy fails, whatever was
//! already copied stays in place and the package is reported as failed.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::util::fs::{ensure_dir, merge_dir};

/// What happened while staging one package.
#[derive(Debug, Clone, Default)]
pub struct StageReport {
    /// Sources merged into the staging tree, in order.
    pub copied: Vec<PathBuf>,
    /// Sources that were not directories on disk and were skipped.
    pub skipped: Vec<PathBuf>,
    /// Total number of files copied.
    pub files: usize,
}

/// Merge each source directory into `stage_root`, in order.
pub fn stage_package(sources: &[PathBuf], stage_root: &Path) -> Result<StageReport> {
    ensure_dir(stage_root)?;
    let mut report = StageReport::default();

    for source in sources {
        if !source.is_dir() {
            warn!("directory does not exist, skipping: {}", source.display());
            report.skipped.push(source.clone());
            continue;
        }

        let files = merge_dir(source, stage_root).with_context(|| {
            format!(
                "failed to stage {} into {}",
                source.display(),
                stage_root.display()
            )
        })?;
        debug!("staged {} files from {}", files, source.display());

        report.files += files;
        report.copied.push(source.clone());
    }

    Ok(report)
}

/// Staging directory for a package's contents below `package_dir`.
///
/// The install prefix is absolute; it is re-rooted under the package
/// directory (`/opt/rocm-7.1.0` becomes `<package_dir>/opt/rocm-7.1.0`).
pub fn prefix_dir(package_dir: &Path, install_prefix: &str) -> PathBuf {
    package_dir.join(install_prefix.trim_start_matches('/'))
}
