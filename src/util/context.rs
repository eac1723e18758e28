//! Run context: the directories one packaging run works in.
//!
//! Every component receives its directories from a [`RunContext`] instead of
//! process-wide constants, so runs (and tests) rooted in different work
//! directories never interfere.
//!
//! Layout under the work directory:
//!
//! ```text
//! <work>/
//!   downloads/   downloaded artifact archives
//!   artifacts/   extracted artifact directories (one per component)
//!   DEB/         Debian staging, one directory per package
//!   RPM/         RPM staging and rpmbuild topdirs, one per package
//! ```

use std::path::{Path, PathBuf};

/// Directories used by one packaging run.
#[derive(Debug, Clone)]
pub struct RunContext {
    work_dir: PathBuf,
    dest_dir: PathBuf,
}

impl RunContext {
    /// Create a context rooted at `work_dir`, delivering packages to `dest_dir`.
    pub fn new(work_dir: impl Into<PathBuf>, dest_dir: impl Into<PathBuf>) -> Self {
        RunContext {
            work_dir: work_dir.into(),
            dest_dir: dest_dir.into(),
        }
    }

    /// Directory finished packages are moved into.
    pub fn dest_dir(&self) -> &Path {
        &self.dest_dir
    }

    /// Directory downloaded archives are cached in.
    pub fn downloads_dir(&self) -> PathBuf {
        self.work_dir.join("downloads")
    }

    /// Root of the extracted artifact directories.
    pub fn artifacts_dir(&self) -> PathBuf {
        self.work_dir.join("artifacts")
    }

    /// Root of the Debian staging trees.
    pub fn deb_dir(&self) -> PathBuf {
        self.work_dir.join("DEB")
    }

    /// Root of the RPM staging trees.
    pub fn rpm_dir(&self) -> PathBuf {
        self.work_dir.join("RPM")
    }
}
