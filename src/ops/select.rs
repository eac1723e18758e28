//! Artifact selection: which extracted paths make up a package.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::core::artifact::{artifact_dir_names, ArtifactManifest, NameMatcher};
use crate::core::catalog::Catalog;
use crate::core::errors::PackagingError;

/// Select the source paths whose contents make up `pkg_name`.
///
/// For a composite package this is the concatenation of the selections of
/// its `Includes`, in declaration order. For a regular package, every
/// component's artifact directory under `artifacts_root` is scanned and each
/// manifest line matching the package name contributes one path.
///
/// No deduplication happens: a path matched twice is returned twice and
/// simply copied twice during staging.
pub fn select_artifact_dirs(
    catalog: &Catalog,
    artifacts_root: &Path,
    pkg_name: &str,
    gfx_arch: &str,
) -> Result<Vec<PathBuf>, PackagingError> {
    let mut selected = Vec::new();
    let mut stack = Vec::new();
    select_into(
        catalog,
        artifacts_root,
        pkg_name,
        gfx_arch,
        &mut stack,
        &mut selected,
    )?;
    Ok(selected)
}

fn select_into<'a>(
    catalog: &'a Catalog,
    artifacts_root: &Path,
    pkg_name: &str,
    gfx_arch: &str,
    stack: &mut Vec<&'a str>,
    selected: &mut Vec<PathBuf>,
) -> Result<(), PackagingError> {
    let pkg = catalog
        .get(pkg_name)
        .ok_or_else(|| PackagingError::UnknownPackage {
            name: pkg_name.to_string(),
        })?;

    if let Some(pos) = stack.iter().position(|&name| name == pkg.name()) {
        let mut cycle: Vec<String> = stack[pos..].iter().map(|s| s.to_string()).collect();
        cycle.push(pkg.name().to_string());
        return Err(PackagingError::IncludeCycle { cycle });
    }

    if let Some(includes) = pkg.includes() {
        stack.push(pkg.name());
        for included in includes {
            select_into(catalog, artifacts_root, included, gfx_arch, stack, selected)?;
        }
        stack.pop();
        return Ok(());
    }

    let matcher = NameMatcher::new(pkg.name());
    for dir_name in artifact_dir_names(pkg, gfx_arch) {
        let manifest = ArtifactManifest::load(&artifacts_root.join(&dir_name))?;
        let before = selected.len();
        selected.extend(manifest.matching_paths(&matcher));
        debug!(
            "{}: {} matching entries in {}",
            pkg.name(),
            selected.len() - before,
            dir_name
        );
    }

    Ok(())
}
