//! RPM packages via `rpmbuild`.
//!
//! `RPM/<name>/` is used as rpmbuild's `_topdir`. The payload is staged in
//! `RPM/<name>/stage/` and copied into the buildroot by the generated spec
//! file, so both formats package exactly the same staged tree.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::core::catalog::PackageDefinition;
use crate::core::depends::translate_dependencies_for;
use crate::core::errors::PackagingError;
use crate::core::format::PackageFormat;
use crate::core::naming::resolve_name_for;
use crate::ops::assemble::stage_package;
use crate::ops::package::{apply_rpath, PackagingEnv};
use crate::ops::select::select_artifact_dirs;
use crate::util::fs::{move_into, write_string};
use crate::util::process::ProcessBuilder;

/// Name of the generated spec file inside the package directory.
pub const SPEC_FILE_NAME: &str = "specfile";

/// Everything the spec file template needs besides the package itself.
#[derive(Debug, Clone)]
pub struct SpecInputs<'a> {
    pub name: &'a str,
    pub version: &'a str,
    pub release: &'a str,
    pub install_prefix: &'a str,
    pub stage_dir: &'a Path,
    pub requires: &'a str,
    pub recommends: &'a str,
}

/// Build the RPM package for `pkg_name` and move it to the destination.
///
/// Returns the delivered `.rpm` files.
pub fn create_rpm_package(env: &PackagingEnv<'_>, pkg_name: &str) -> Result<Vec<PathBuf>> {
    let pkg = env
        .catalog
        .get(pkg_name)
        .ok_or_else(|| PackagingError::UnknownPackage {
            name: pkg_name.to_string(),
        })?;
    let rpm_name = resolve_name_for(pkg, env.cfg, PackageFormat::Rpm);

    let package_dir = env.ctx.rpm_dir().join(pkg.name());
    let stage_dir = package_dir.join("stage");

    let sources = select_artifact_dirs(
        env.catalog,
        &env.ctx.artifacts_dir(),
        pkg.name(),
        env.cfg.gfx_arch(),
    )?;
    let report = stage_package(&sources, &stage_dir)?;
    debug!(
        "{}: staged {} files from {} sources",
        rpm_name,
        report.files,
        report.copied.len()
    );

    apply_rpath(env, &stage_dir)?;

    let depends = pkg.depends();
    let requires =
        translate_dependencies_for(env.catalog, &depends.rpm_requires, env.cfg, PackageFormat::Rpm);
    let recommends = translate_dependencies_for(
        env.catalog,
        &depends.rpm_recommends,
        env.cfg,
        PackageFormat::Rpm,
    );
    let version = env.cfg.rpm_version();
    let spec = render_spec(
        pkg,
        &SpecInputs {
            name: &rpm_name,
            version: &version,
            release: env.cfg.rpm_release(),
            install_prefix: env.cfg.install_prefix(),
            stage_dir: &stage_dir,
            requires: &requires,
            recommends: &recommends,
        },
    )?;
    let spec_file = package_dir.join(SPEC_FILE_NAME);
    write_string(&spec_file, &spec)?;

    let cmd = ProcessBuilder::new(&env.tools.rpmbuild)
        .arg("--define")
        .arg(format!("_topdir {}", package_dir.display()))
        .arg("-ba")
        .arg(&spec_file);
    env.runner.run_checked(&cmd)?;

    collect_rpms(&package_dir, env.ctx.dest_dir())
}

/// Move every built binary RPM under `<topdir>/RPMS/<arch>/` into `dest`.
fn collect_rpms(topdir: &Path, dest: &Path) -> Result<Vec<PathBuf>> {
    let pattern = format!(
        "{}/RPMS/*/*.{}",
        glob::Pattern::escape(&topdir.to_string_lossy()),
        PackageFormat::Rpm.extension()
    );

    let mut delivered = Vec::new();
    for entry in glob::glob(&pattern).with_context(|| format!("invalid glob pattern: {pattern}"))? {
        let path = entry.context("failed to read rpm output directory")?;
        let moved = move_into(&path, dest)?;
        info!("delivered {}", moved.display());
        delivered.push(moved);
    }

    Ok(delivered)
}

/// Render the spec file.
pub fn render_spec(
    pkg: &PackageDefinition,
    inputs: &SpecInputs<'_>,
) -> Result<String, PackagingError> {
    let meta = pkg.metadata();
    let missing = |field| PackagingError::MissingMetadata {
        name: pkg.name().to_string(),
        field,
    };
    let description = meta
        .description
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .ok_or_else(|| missing("Description"))?;
    let license = meta
        .license
        .as_deref()
        .filter(|l| !l.trim().is_empty())
        .ok_or_else(|| missing("License"))?;
    let summary = description.lines().next().unwrap_or(description);

    let mut spec = String::new();
    spec.push_str("%define _build_id_links none\n");
    spec.push_str("%global debug_package %{nil}\n");
    spec.push_str("%global __os_install_post %{nil}\n\n");

    let mut header = vec![
        format!("Name: {}", inputs.name),
        format!("Version: {}", inputs.version),
        format!("Release: {}", inputs.release),
        format!("Summary: {summary}"),
        format!("License: {license}"),
    ];
    if let Some(group) = &meta.group {
        header.push(format!("Group: {group}"));
    }
    if let Some(vendor) = &meta.vendor {
        header.push(format!("Vendor: {vendor}"));
    }
    if let Some(homepage) = &meta.homepage {
        header.push(format!("URL: {homepage}"));
    }
    if let Some(arch) = &meta.build_arch {
        header.push(format!("BuildArch: {arch}"));
    }
    header.push("AutoReqProv: no".to_string());
    if !inputs.requires.is_empty() {
        header.push(format!("Requires: {}", inputs.requires));
    }
    if !inputs.recommends.is_empty() {
        header.push(format!("Recommends: {}", inputs.recommends));
    }
    spec.push_str(&header.join("\n"));

    let prefix = inputs.install_prefix;
    spec.push_str(&format!(
        "\n\n%description\n{description}\n\
         \n%install\n\
         mkdir -p %{{buildroot}}{prefix}\n\
         cp -a {stage}/. %{{buildroot}}{prefix}/\n\
         \n%files\n\
         {prefix}\n",
        stage = inputs.stage_dir.display()
    ));

    Ok(spec)
}
