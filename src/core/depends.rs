//! Versioned dependency expressions.

use crate::core::build_config::BuildConfig;
use crate::core::catalog::Catalog;
use crate::core::format::PackageFormat;
use crate::core::naming::resolve_name;

/// Translate bare dependency names into a comma-separated expression.
///
/// Names of enabled catalog packages are replaced by their resolved name;
/// anything else is assumed to come from the base OS and passes through
/// unchanged. Order is preserved and duplicates are kept.
pub fn translate_dependencies<S: AsRef<str>>(
    catalog: &Catalog,
    names: &[S],
    cfg: &BuildConfig,
) -> String {
    translated(catalog, names, cfg).collect::<Vec<_>>().join(", ")
}

/// Like [`translate_dependencies`], with the format's devel spelling applied
/// to every entry after translation.
pub fn translate_dependencies_for<S: AsRef<str>>(
    catalog: &Catalog,
    names: &[S],
    cfg: &BuildConfig,
    format: PackageFormat,
) -> String {
    translated(catalog, names, cfg)
        .map(|dep| format.apply_devel_spelling(&dep))
        .collect::<Vec<_>>()
        .join(", ")
}

fn translated<'a, S: AsRef<str>>(
    catalog: &'a Catalog,
    names: &'a [S],
    cfg: &'a BuildConfig,
) -> impl Iterator<Item = String> + 'a {
    names.iter().map(move |name| {
        let name = name.as_ref();
        match catalog.get_enabled(name) {
            Some(pkg) => resolve_name(pkg, cfg),
            None => name.to_string(),
        }
    })
}
