//! Core data structures and resolution rules for rocpack.
//!
//! This module contains everything that is a pure function of the catalog
//! and the build configuration:
//! - The typed package catalog
//! - Final package naming and dependency translation
//! - Artifact directory naming and manifest matching

pub mod artifact;
pub mod build_config;
pub mod catalog;
pub mod depends;
pub mod errors;
pub mod format;
pub mod naming;
pub mod version;

pub use artifact::{ArtifactManifest, NameMatcher};
pub use build_config::BuildConfig;
pub use catalog::{Catalog, PackageDefinition};
pub use depends::{translate_dependencies, translate_dependencies_for};
pub use errors::{CatalogError, PackagingError};
pub use format::PackageFormat;
pub use naming::{resolve_name, resolve_name_for};
