//! Final package names.
//!
//! A catalog name such as `hip` becomes the distribution name
//! `hip7.1.0-gfx94x`: the release version (or `-rpath` + version for the
//! rpath variant) is appended, followed by the lowercased GPU architecture
//! for architecture-sensitive packages. Development packages never carry the
//! architecture tag, since headers are shared across architectures.
//!
//! The Debian `-dev` spelling is applied last, after the version suffix has
//! been computed against the catalog's `-devel` name.

use crate::core::build_config::BuildConfig;
use crate::core::catalog::PackageDefinition;
use crate::core::format::{PackageFormat, DEVEL_MARKER};

/// Whether a catalog name denotes a development package.
pub fn is_devel_package(name: &str) -> bool {
    name.ends_with(DEVEL_MARKER)
}

/// The version part appended to every package name.
pub fn version_suffix(cfg: &BuildConfig) -> String {
    if cfg.is_rpath() {
        format!("-rpath{}", cfg.rocm_version())
    } else {
        cfg.rocm_version().to_string()
    }
}

/// Whether the final name carries the GPU architecture tag.
pub fn needs_gfx_arch(pkg: &PackageDefinition) -> bool {
    pkg.is_gfx_arch_sensitive() && !is_devel_package(pkg.name())
}

/// Resolve the format-neutral final name of a package.
pub fn resolve_name(pkg: &PackageDefinition, cfg: &BuildConfig) -> String {
    let suffix = version_suffix(cfg);

    if needs_gfx_arch(pkg) {
        format!(
            "{}{}-{}",
            pkg.name(),
            suffix,
            cfg.gfx_arch().to_lowercase()
        )
    } else {
        format!("{}{}", pkg.name(), suffix)
    }
}

/// Resolve the final name of a package for a specific format.
pub fn resolve_name_for(
    pkg: &PackageDefinition,
    cfg: &BuildConfig,
    format: PackageFormat,
) -> String {
    format.apply_devel_spelling(&resolve_name(pkg, cfg))
}
