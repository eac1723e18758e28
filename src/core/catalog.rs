//! The package catalog (`package.json`).
//!
//! The catalog is a JSON array of package records, one per distributable
//! unit. Records are decoded into typed [`PackageDefinition`]s up front and
//! the whole catalog is rejected if any record is malformed, so the rest of
//! the pipeline never has to guess at missing keys.
//!
//! ```json
//! [
//!   {
//!     "Package": "hip",
//!     "Artifact": "core-hip",
//!     "Components": ["lib", "run"],
//!     "Gfxarch": "True",
//!     "DEBDepends": ["rocm-core", "libc6"],
//!     "Maintainer": "ROCm Dev Support <rocm-dev.support@amd.com>",
//!     "Description": "HIP runtime"
//!   }
//! ]
//! ```

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use serde::de::{self, IgnoredAny};
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use crate::core::errors::CatalogError;

/// Key marking a composite record, accepted in any case.
const COMPOSITE_KEY: &str = "Composite";

/// A single package definition from the catalog.
///
/// Definitions are immutable once they are part of a [`Catalog`]; the
/// `with_*` builders only exist to assemble definitions before loading.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PackageDefinition {
    #[serde(rename = "Package")]
    name: String,

    #[serde(rename = "Components", default)]
    components: Vec<String>,

    #[serde(rename = "Artifact", default)]
    artifact_prefix: Option<String>,

    #[serde(rename = "Gfxarch", default, deserialize_with = "flexible_bool")]
    gfx_arch_sensitive: bool,

    #[serde(rename = "Includes", default)]
    includes: Option<Vec<String>>,

    #[serde(flatten)]
    depends: DependsLists,

    #[serde(rename = "DisablePackaging", default, deserialize_with = "key_present")]
    packaging_disabled: bool,

    #[serde(rename = "Composite", default, deserialize_with = "key_present")]
    composite: bool,

    #[serde(flatten)]
    metadata: PackageMetadata,
}

/// Per-format dependency lists. Entries are bare package names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DependsLists {
    /// Debian `Depends:` entries
    #[serde(rename = "DEBDepends", default)]
    pub deb_depends: Vec<String>,

    /// RPM `Requires:` entries
    #[serde(rename = "RPMRequires", default)]
    pub rpm_requires: Vec<String>,

    /// RPM `Recommends:` entries
    #[serde(rename = "RPMRecommends", default)]
    pub rpm_recommends: Vec<String>,
}

/// Descriptive fields copied into the generated packaging metadata as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PackageMetadata {
    #[serde(rename = "Description", default)]
    pub description: Option<String>,

    /// `Name <email>` of the maintainer
    #[serde(rename = "Maintainer", default)]
    pub maintainer: Option<String>,

    #[serde(rename = "Homepage", default)]
    pub homepage: Option<String>,

    #[serde(rename = "License", default)]
    pub license: Option<String>,

    #[serde(rename = "Vendor", default)]
    pub vendor: Option<String>,

    /// RPM group
    #[serde(rename = "Group", default)]
    pub group: Option<String>,

    /// Debian section
    #[serde(rename = "Section", default)]
    pub section: Option<String>,

    /// Debian priority
    #[serde(rename = "Priority", default)]
    pub priority: Option<String>,

    /// Debian architecture (e.g. `amd64`)
    #[serde(rename = "Architecture", default)]
    pub architecture: Option<String>,

    /// RPM build architecture (e.g. `x86_64`)
    #[serde(rename = "BuildArch", default)]
    pub build_arch: Option<String>,

    /// Skip `dh_dwz` when building the Debian package
    #[serde(rename = "Disable_DWZ", default, deserialize_with = "flexible_bool")]
    pub disable_dwz: bool,
}

impl PackageDefinition {
    /// Create a bare definition with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        PackageDefinition {
            name: name.into(),
            components: Vec::new(),
            artifact_prefix: None,
            gfx_arch_sensitive: false,
            includes: None,
            depends: DependsLists::default(),
            packaging_disabled: false,
            composite: false,
            metadata: PackageMetadata::default(),
        }
    }

    /// Set the components and the artifact prefix they are built under.
    pub fn with_artifacts<I, S>(mut self, prefix: impl Into<String>, components: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.artifact_prefix = Some(prefix.into());
        self.components = components.into_iter().map(Into::into).collect();
        self
    }

    /// Mark the package as varying per GPU architecture.
    pub fn with_gfx_arch(mut self, sensitive: bool) -> Self {
        self.gfx_arch_sensitive = sensitive;
        self
    }

    /// Turn the package into a composite of the given packages.
    pub fn with_includes<I, S>(mut self, includes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.includes = Some(includes.into_iter().map(Into::into).collect());
        self.composite = true;
        self
    }

    /// Set the per-format dependency lists.
    pub fn with_depends(mut self, depends: DependsLists) -> Self {
        self.depends = depends;
        self
    }

    /// Set the descriptive metadata.
    pub fn with_metadata(mut self, metadata: PackageMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Exclude the package from default operations.
    pub fn disabled(mut self) -> Self {
        self.packaging_disabled = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn components(&self) -> &[String] {
        &self.components
    }

    pub fn artifact_prefix(&self) -> Option<&str> {
        self.artifact_prefix.as_deref()
    }

    pub fn is_gfx_arch_sensitive(&self) -> bool {
        self.gfx_arch_sensitive
    }

    /// Packages aggregated by this one, if it is a composite.
    pub fn includes(&self) -> Option<&[String]> {
        self.includes.as_deref()
    }

    pub fn depends(&self) -> &DependsLists {
        &self.depends
    }

    pub fn metadata(&self) -> &PackageMetadata {
        &self.metadata
    }

    pub fn is_packaging_disabled(&self) -> bool {
        self.packaging_disabled
    }

    /// Whether the package belongs to the `composite` category.
    pub fn is_composite(&self) -> bool {
        self.composite
    }
}

/// All package definitions for a release, keyed by name.
///
/// Read-only after loading; iteration follows the order of the source file.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    packages: Vec<PackageDefinition>,
    index: HashMap<String, usize>,
}

impl Catalog {
    /// Load the catalog from a JSON file.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let contents = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let packages = decode_packages(&contents).map_err(|source| CatalogError::Parse {
            path: Some(path.to_path_buf()),
            source,
        })?;

        let catalog = Self::from_definitions(packages)?;
        tracing::debug!(
            "loaded {} package definitions from {}",
            catalog.len(),
            path.display()
        );
        Ok(catalog)
    }

    /// Parse a catalog from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let packages = decode_packages(json)
            .map_err(|source| CatalogError::Parse { path: None, source })?;
        Self::from_definitions(packages)
    }

    /// Build a catalog from already-decoded definitions.
    pub fn from_definitions(packages: Vec<PackageDefinition>) -> Result<Self, CatalogError> {
        let mut index = HashMap::with_capacity(packages.len());

        for (i, pkg) in packages.iter().enumerate() {
            if index.insert(pkg.name.clone(), i).is_some() {
                return Err(CatalogError::DuplicatePackage {
                    name: pkg.name.clone(),
                });
            }
            if pkg.includes.is_none() && !pkg.components.is_empty() && pkg.artifact_prefix.is_none()
            {
                return Err(CatalogError::MissingArtifactPrefix {
                    name: pkg.name.clone(),
                });
            }
        }

        Ok(Catalog { packages, index })
    }

    /// Look up a package by name.
    pub fn get(&self, name: &str) -> Option<&PackageDefinition> {
        self.index.get(name).map(|&i| &self.packages[i])
    }

    /// Check whether a package with this name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Look up a package that is not packaging-disabled.
    pub fn get_enabled(&self, name: &str) -> Option<&PackageDefinition> {
        self.get(name).filter(|pkg| !pkg.is_packaging_disabled())
    }

    /// Iterate over all definitions in file order.
    pub fn iter(&self) -> impl Iterator<Item = &PackageDefinition> {
        self.packages.iter()
    }

    /// Iterate over definitions that are not packaging-disabled.
    pub fn enabled(&self) -> impl Iterator<Item = &PackageDefinition> {
        self.packages.iter().filter(|pkg| !pkg.is_packaging_disabled())
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}

/// Decode catalog records, folding any spelling of the composite key into
/// [`COMPOSITE_KEY`] first.
fn decode_packages(json: &str) -> serde_json::Result<Vec<PackageDefinition>> {
    let records: Vec<Map<String, Value>> = serde_json::from_str(json)?;
    records
        .into_iter()
        .map(|mut record| {
            let spellings: Vec<String> = record
                .keys()
                .filter(|key| *key != COMPOSITE_KEY && key.eq_ignore_ascii_case(COMPOSITE_KEY))
                .cloned()
                .collect();
            for key in spellings {
                if let Some(value) = record.remove(&key) {
                    record.insert(COMPOSITE_KEY.to_string(), value);
                }
            }
            serde_json::from_value(Value::Object(record))
        })
        .collect()
}

/// Accept `true`/`false` or their string spellings in any case.
fn flexible_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    struct FlexibleBool;

    impl de::Visitor<'_> for FlexibleBool {
        type Value = bool;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a boolean or the string \"true\"/\"false\"")
        }

        fn visit_bool<E: de::Error>(self, v: bool) -> Result<bool, E> {
            Ok(v)
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<bool, E> {
            match v.trim().to_ascii_lowercase().as_str() {
                "true" => Ok(true),
                "false" | "" => Ok(false),
                _ => Err(E::invalid_value(de::Unexpected::Str(v), &self)),
            }
        }

        fn visit_unit<E: de::Error>(self) -> Result<bool, E> {
            Ok(false)
        }
    }

    deserializer.deserialize_any(FlexibleBool)
}

/// Flag keys whose mere presence sets them, whatever their value.
fn key_present<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    IgnoredAny::deserialize(deserializer)?;
    Ok(true)
}
