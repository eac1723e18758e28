//! rocpack - Debian and RPM packaging for ROCm releases
//!
//! This crate maps a declarative package catalog onto pre-built artifact
//! directories: it resolves final package names and versioned
//! dependencies, selects the artifact contents belonging to each package,
//! stages them, and hands the staged tree to `debuild` or `rpmbuild`.

pub mod core;
pub mod ops;
pub mod util;

/// Test doubles for external tools.
#[cfg(test)]
pub mod test_support;

pub use core::{
    build_config::BuildConfig, catalog::Catalog, catalog::PackageDefinition,
    errors::CatalogError, errors::PackagingError, format::PackageFormat,
};

pub use util::context::RunContext;
