//! Artifact directories and their manifests.
//!
//! Each build component is published as an artifact named
//! `<prefix>_<component>_<suffix>`, where the suffix is `<gfx_arch>-dcgpu`
//! for architecture-sensitive packages and `generic` otherwise. An extracted
//! artifact directory carries an `artifact_manifest.txt` listing the relative
//! paths it contains, one per line.
//!
//! A single artifact usually holds several logical packages (runtime,
//! headers, static libraries), so manifest lines are matched against package
//! names loosely rather than exactly.

use std::path::{Path, PathBuf};

use crate::core::catalog::PackageDefinition;
use crate::core::errors::PackagingError;

/// Name of the manifest file inside every artifact directory.
pub const MANIFEST_FILE_NAME: &str = "artifact_manifest.txt";

/// Artifact suffix for architecture-independent packages.
pub const GENERIC_ARTIFACT_SUFFIX: &str = "generic";

/// The artifact suffix for a package under the given architecture.
pub fn artifact_suffix(pkg: &PackageDefinition, gfx_arch: &str) -> String {
    if pkg.is_gfx_arch_sensitive() {
        format!("{gfx_arch}-dcgpu")
    } else {
        GENERIC_ARTIFACT_SUFFIX.to_string()
    }
}

/// Artifact directory names for each of a package's components, in order.
///
/// Composite packages have no components of their own and yield nothing.
pub fn artifact_dir_names(pkg: &PackageDefinition, gfx_arch: &str) -> Vec<String> {
    let Some(prefix) = pkg.artifact_prefix() else {
        return Vec::new();
    };
    let suffix = artifact_suffix(pkg, gfx_arch);

    pkg.components()
        .iter()
        .map(|component| format!("{prefix}_{component}_{suffix}"))
        .collect()
}

/// Decides whether a manifest line belongs to a package.
#[derive(Debug, Clone)]
pub struct NameMatcher {
    candidates: Vec<String>,
    underscored: String,
}

impl NameMatcher {
    pub fn new(pkg_name: &str) -> Self {
        let underscored = pkg_name.replace('-', "_");

        let mut candidates = vec![pkg_name.to_string(), underscored.clone()];
        if let Some(base) = pkg_name.strip_suffix("-devel") {
            candidates.push(base.to_string());
        }
        if let Some(base) = pkg_name.strip_suffix("-dev") {
            candidates.push(base.to_string());
        }
        candidates.retain(|c| !c.is_empty());
        candidates.dedup();

        NameMatcher {
            candidates,
            underscored,
        }
    }

    /// A line matches if it contains the name, its underscored spelling, or
    /// the name without a trailing `-devel`/`-dev`. Dash and underscore
    /// spellings on the line side are treated as equivalent too.
    pub fn matches(&self, line: &str) -> bool {
        let line = line.trim();
        if line.is_empty() {
            return false;
        }

        self.candidates.iter().any(|c| line.contains(c.as_str()))
            || line.replace('-', "_").contains(&self.underscored)
    }
}

/// The parsed manifest of one artifact directory.
#[derive(Debug, Clone)]
pub struct ArtifactManifest {
    dir: PathBuf,
    entries: Vec<String>,
}

impl ArtifactManifest {
    /// Read `artifact_manifest.txt` from an artifact directory.
    ///
    /// A missing manifest is an error: the artifact was not fetched or was
    /// extracted incompletely.
    pub fn load(dir: &Path) -> Result<Self, PackagingError> {
        let path = dir.join(MANIFEST_FILE_NAME);
        let contents = std::fs::read_to_string(&path)
            .map_err(|source| PackagingError::MissingManifest { path, source })?;
        Ok(Self::parse(dir, &contents))
    }

    /// Parse manifest contents belonging to `dir`.
    pub fn parse(dir: &Path, contents: &str) -> Self {
        ArtifactManifest {
            dir: dir.to_path_buf(),
            entries: contents.lines().map(str::to_string).collect(),
        }
    }

    /// The artifact directory this manifest describes.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Raw manifest lines.
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Source paths of every line matching the package, in manifest order.
    pub fn matching_paths<'a>(
        &'a self,
        matcher: &'a NameMatcher,
    ) -> impl Iterator<Item = PathBuf> + 'a {
        self.entries
            .iter()
            .filter(|line| matcher.matches(line))
            .map(|line| self.dir.join(line.trim().trim_start_matches('/')))
    }
}
