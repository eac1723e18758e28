//! Per-run build configuration.

use crate::core::errors::PackagingError;
use crate::core::version::version_to_number;

/// Install prefix used when none is given.
pub const DEFAULT_INSTALL_PREFIX: &str = "/opt/rocm";

/// Release version used when none is given.
pub const DEFAULT_ROCM_VERSION: &str = "9.9.9";

/// Version suffix used when none is given.
pub const DEFAULT_VERSION_SUFFIX: &str = "crdnnh";

/// Release settings shared by every package in a run.
///
/// Built once per invocation and never modified afterwards. Every naming and
/// selection function is a pure function of a package definition and this
/// value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildConfig {
    rocm_version: String,
    version_number: String,
    version_suffix: String,
    install_prefix: String,
    gfx_arch: String,
    rpath: bool,
}

impl BuildConfig {
    /// Create a configuration for a release version and GPU architecture.
    ///
    /// Fails if the version does not have numeric components.
    pub fn new(
        rocm_version: impl Into<String>,
        gfx_arch: impl Into<String>,
    ) -> Result<Self, PackagingError> {
        let rocm_version = rocm_version.into();
        let version_number = version_to_number(&rocm_version)?;
        let install_prefix = effective_install_prefix(DEFAULT_INSTALL_PREFIX, &rocm_version);

        Ok(BuildConfig {
            rocm_version,
            version_number,
            version_suffix: DEFAULT_VERSION_SUFFIX.to_string(),
            install_prefix,
            gfx_arch: gfx_arch.into(),
            rpath: false,
        })
    }

    /// Set the version suffix (Debian revision / RPM release).
    pub fn with_version_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.version_suffix = suffix.into();
        self
    }

    /// Set the requested install prefix.
    ///
    /// See [`effective_install_prefix`] for how the default prefix is versioned.
    pub fn with_install_prefix(mut self, prefix: &str) -> Self {
        self.install_prefix = effective_install_prefix(prefix, &self.rocm_version);
        self
    }

    /// Build the rpath variant of every package.
    pub fn with_rpath(mut self, rpath: bool) -> Self {
        self.rpath = rpath;
        self
    }

    pub fn rocm_version(&self) -> &str {
        &self.rocm_version
    }

    /// Packed numeric form of the release version (`7.1.0` -> `70100`).
    pub fn version_number(&self) -> &str {
        &self.version_number
    }

    pub fn version_suffix(&self) -> &str {
        &self.version_suffix
    }

    pub fn install_prefix(&self) -> &str {
        &self.install_prefix
    }

    /// GPU architecture tag as given (e.g. `gfx94X`).
    pub fn gfx_arch(&self) -> &str {
        &self.gfx_arch
    }

    pub fn is_rpath(&self) -> bool {
        self.rpath
    }

    /// Full Debian version: `<version>.<number>-<suffix>`.
    pub fn deb_version(&self) -> String {
        format!(
            "{}.{}-{}",
            self.rocm_version, self.version_number, self.version_suffix
        )
    }

    /// RPM `Version:` field: `<version>.<number>`.
    pub fn rpm_version(&self) -> String {
        format!("{}.{}", self.rocm_version, self.version_number)
    }

    /// RPM `Release:` field.
    pub fn rpm_release(&self) -> &str {
        &self.version_suffix
    }
}

/// The default prefix is made release-specific (`/opt/rocm` becomes
/// `/opt/rocm-<version>`); any other prefix is used verbatim.
pub fn effective_install_prefix(requested: &str, rocm_version: &str) -> String {
    if requested.trim_end_matches('/') == DEFAULT_INSTALL_PREFIX {
        format!("{DEFAULT_INSTALL_PREFIX}-{rocm_version}")
    } else {
        requested.to_string()
    }
}
