//! Debian packages via `debuild`.
//!
//! Each package gets `DEB/<name>/` with a `debian/` directory holding the
//! generated metadata and the staged payload under the install prefix.
//! `debuild` drops the finished `.deb` next to the package directories, from
//! where files belonging to this package are moved to the destination.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::core::catalog::PackageDefinition;
use crate::core::depends::translate_dependencies_for;
use crate::core::errors::PackagingError;
use crate::core::format::PackageFormat;
use crate::core::naming::resolve_name_for;
use crate::ops::assemble::{prefix_dir, stage_package};
use crate::ops::package::{apply_rpath, PackagingEnv};
use crate::ops::select::select_artifact_dirs;
use crate::util::fs::{move_into, write_executable, write_string};
use crate::util::process::ProcessBuilder;

const DEBHELPER_COMPAT: u32 = 12;
const STANDARDS_VERSION: &str = "4.5.0";

/// Build the Debian package for `pkg_name` and move it to the destination.
///
/// Returns the delivered `.deb` files.
pub fn create_deb_package(env: &PackagingEnv<'_>, pkg_name: &str) -> Result<Vec<PathBuf>> {
    let pkg = env
        .catalog
        .get(pkg_name)
        .ok_or_else(|| PackagingError::UnknownPackage {
            name: pkg_name.to_string(),
        })?;
    let deb_name = resolve_name_for(pkg, env.cfg, PackageFormat::Deb);

    let deb_root = env.ctx.deb_dir();
    let package_dir = deb_root.join(pkg.name());
    write_debian_dir(env, pkg, &package_dir.join("debian"))?;

    let sources = select_artifact_dirs(
        env.catalog,
        &env.ctx.artifacts_dir(),
        pkg.name(),
        env.cfg.gfx_arch(),
    )?;
    let report = stage_package(&sources, &prefix_dir(&package_dir, env.cfg.install_prefix()))?;
    debug!(
        "{}: staged {} files from {} sources",
        deb_name,
        report.files,
        report.copied.len()
    );

    apply_rpath(env, &package_dir)?;

    let cmd = ProcessBuilder::new(&env.tools.debuild)
        .args(["-uc", "-us", "-b"])
        .cwd(&package_dir);
    env.runner.run_checked(&cmd)?;

    collect_debs(&deb_root, &deb_name, env.ctx.dest_dir())
}

fn write_debian_dir(env: &PackagingEnv<'_>, pkg: &PackageDefinition, debian: &Path) -> Result<()> {
    let deb_name = resolve_name_for(pkg, env.cfg, PackageFormat::Deb);
    let version = env.cfg.deb_version();

    write_string(
        &debian.join("changelog"),
        &render_changelog(pkg, &deb_name, &version, Utc::now())?,
    )?;
    write_executable(&debian.join("rules"), &render_rules(pkg))?;
    write_string(&debian.join("install"), &render_install(env.cfg.install_prefix()))?;

    let depends = translate_dependencies_for(
        env.catalog,
        &pkg.depends().deb_depends,
        env.cfg,
        PackageFormat::Deb,
    );
    write_string(
        &debian.join("control"),
        &render_control(pkg, &deb_name, &depends)?,
    )?;

    debug!("wrote debian metadata in {}", debian.display());
    Ok(())
}

/// Move every `.deb` in `deb_root` whose name starts with `deb_name` into `dest`.
fn collect_debs(deb_root: &Path, deb_name: &str, dest: &Path) -> Result<Vec<PathBuf>> {
    let pattern = format!(
        "{}/*.{}",
        glob::Pattern::escape(&deb_root.to_string_lossy()),
        PackageFormat::Deb.extension()
    );

    let mut delivered = Vec::new();
    for entry in glob::glob(&pattern).with_context(|| format!("invalid glob pattern: {pattern}"))? {
        let path = entry.context("failed to read debian output directory")?;
        let matches = path
            .file_name()
            .map(|f| f.to_string_lossy().starts_with(deb_name))
            .unwrap_or(false);
        if !matches {
            continue;
        }

        let moved = move_into(&path, dest)?;
        info!("delivered {}", moved.display());
        delivered.push(moved);
    }

    Ok(delivered)
}

/// Split `Name <email>` into its two halves.
fn split_maintainer(maintainer: &str) -> Option<(&str, &str)> {
    let (name, rest) = maintainer.split_once('<')?;
    let email = rest.strip_suffix('>').unwrap_or(rest).trim();
    let name = name.trim();
    if name.is_empty() || email.is_empty() {
        return None;
    }
    Some((name, email))
}

fn required<'a>(
    pkg: &PackageDefinition,
    value: Option<&'a str>,
    field: &'static str,
) -> Result<&'a str, PackagingError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| PackagingError::MissingMetadata {
            name: pkg.name().to_string(),
            field,
        })
}

/// Render `debian/changelog`.
pub fn render_changelog(
    pkg: &PackageDefinition,
    deb_name: &str,
    version: &str,
    date: DateTime<Utc>,
) -> Result<String, PackagingError> {
    let maintainer = required(pkg, pkg.metadata().maintainer.as_deref(), "Maintainer")?;
    let (name, email) = split_maintainer(maintainer).ok_or_else(|| {
        PackagingError::MissingMetadata {
            name: pkg.name().to_string(),
            field: "Maintainer",
        }
    })?;

    Ok(format!(
        "{deb_name} ({version}) UNRELEASED; urgency=medium\n\
         \n  * Initial release\n\
         \n -- {name} <{email}>  {date}\n",
        date = date.to_rfc2822()
    ))
}

/// Render `debian/rules`.
pub fn render_rules(pkg: &PackageDefinition) -> String {
    let mut rules = String::from("#!/usr/bin/make -f\n\n%:\n\tdh $@\n");
    if pkg.metadata().disable_dwz {
        rules.push_str("\noverride_dh_dwz:\n\t@echo \"dh_dwz disabled\"\n");
    }
    rules
}

/// Render `debian/install`: ship the whole install-prefix tree.
pub fn render_install(install_prefix: &str) -> String {
    let rel = install_prefix.trim_matches('/');
    let parent = Path::new(install_prefix)
        .parent()
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_else(|| "/".to_string());
    let parent = parent.trim_end_matches('/');
    format!("{rel} {parent}/\n")
}

/// Render `debian/control`.
pub fn render_control(
    pkg: &PackageDefinition,
    deb_name: &str,
    depends: &str,
) -> Result<String, PackagingError> {
    let meta = pkg.metadata();
    let maintainer = required(pkg, meta.maintainer.as_deref(), "Maintainer")?;
    let description = required(pkg, meta.description.as_deref(), "Description")?;

    let mut source = vec![
        format!("Source: {deb_name}"),
        format!("Section: {}", meta.section.as_deref().unwrap_or("misc")),
        format!("Priority: {}", meta.priority.as_deref().unwrap_or("optional")),
        format!("Maintainer: {maintainer}"),
        format!("Build-Depends: debhelper-compat (= {DEBHELPER_COMPAT})"),
        format!("Standards-Version: {STANDARDS_VERSION}"),
    ];
    if let Some(homepage) = &meta.homepage {
        source.push(format!("Homepage: {homepage}"));
    }

    let mut binary = vec![
        format!("Package: {deb_name}"),
        format!(
            "Architecture: {}",
            meta.architecture.as_deref().unwrap_or("any")
        ),
    ];
    if !depends.is_empty() {
        binary.push(format!("Depends: {depends}"));
    }
    binary.push(format!("Description: {}", description_field(description)));

    Ok(format!("{}\n\n{}\n", source.join("\n"), binary.join("\n")))
}

/// Debian description: first line is the synopsis, the rest is indented.
fn description_field(description: &str) -> String {
    let mut lines = description.trim().lines();
    let synopsis = lines.next().unwrap_or_default().trim().to_string();

    let mut field = synopsis.clone();
    let mut extended: Vec<&str> = lines.collect();
    if extended.is_empty() {
        extended.push(synopsis.as_str());
    }
    for line in extended {
        let line = line.trim_end();
        if line.is_empty() {
            field.push_str("\n .");
        } else {
            field.push_str("\n ");
            field.push_str(line);
        }
    }
    field
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::catalog::PackageMetadata;
    use crate::ops::package::PackagerTools;
    use crate::test_support::{CommandPattern, MockProcessOutput, MockRunner, PackagingFixture};
    use chrono::TimeZone;
    use std::fs;

    fn env<'a>(
        fixture: &'a PackagingFixture,
        ctx: &'a crate::util::context::RunContext,
        tools: &'a PackagerTools,
        runner: &'a MockRunner,
    ) -> PackagingEnv<'a> {
        PackagingEnv {
            ctx,
            catalog: &fixture.catalog,
            cfg: &fixture.cfg,
            tools,
            runner,
        }
    }

    fn described(name: &str) -> PackageDefinition {
        PackageDefinition::new(name).with_metadata(PackageMetadata {
            maintainer: Some("ROCm Dev Support <rocm-dev.support@amd.com>".into()),
            description: Some("HIP runtime".into()),
            ..Default::default()
        })
    }

    #[test]
    fn test_changelog() {
        let date = Utc.with_ymd_and_hms(2025, 7, 1, 10, 52, 37).unwrap();
        let changelog =
            render_changelog(&described("hip"), "hip7.1.0-gfx94x", "7.1.0.70100-1", date).unwrap();

        assert_eq!(
            changelog,
            "hip7.1.0-gfx94x (7.1.0.70100-1) UNRELEASED; urgency=medium\n\
             \n  * Initial release\n\
             \n -- ROCm Dev Support <rocm-dev.support@amd.com>  Tue, 1 Jul 2025 10:52:37 +0000\n"
        );
    }

    #[test]
    fn test_changelog_requires_maintainer() {
        let err = render_changelog(&PackageDefinition::new("hip"), "hip", "1", Utc::now())
            .unwrap_err();
        assert!(matches!(err, PackagingError::MissingMetadata { field: "Maintainer", .. }));

        let bad = PackageDefinition::new("hip").with_metadata(PackageMetadata {
            maintainer: Some("nobody".into()),
            ..Default::default()
        });
        assert!(render_changelog(&bad, "hip", "1", Utc::now()).is_err());
    }

    #[test]
    fn test_split_maintainer() {
        assert_eq!(
            split_maintainer("ROCm Dev <dev@amd.com>"),
            Some(("ROCm Dev", "dev@amd.com"))
        );
        assert_eq!(split_maintainer("dev@amd.com"), None);
        assert_eq!(split_maintainer("<dev@amd.com>"), None);
    }

    #[test]
    fn test_rules_dwz_override() {
        let plain = render_rules(&PackageDefinition::new("hip"));
        assert!(plain.starts_with("#!/usr/bin/make -f\n"));
        assert!(!plain.contains("override_dh_dwz"));

        let no_dwz = PackageDefinition::new("hip").with_metadata(PackageMetadata {
            disable_dwz: true,
            ..Default::default()
        });
        assert!(render_rules(&no_dwz).contains("override_dh_dwz:"));
    }

    #[test]
    fn test_install_file() {
        assert_eq!(render_install("/opt/rocm-7.1.0"), "opt/rocm-7.1.0 /opt/\n");
        assert_eq!(render_install("/rocm"), "rocm /\n");
    }

    #[test]
    fn test_control() {
        let pkg = described("hip");
        let control = render_control(&pkg, "hip7.1.0-gfx94x", "hip-dev7.1.0, libc6").unwrap();

        assert!(control.contains("Source: hip7.1.0-gfx94x\n"));
        assert!(control.contains("\n\nPackage: hip7.1.0-gfx94x\n"));
        assert!(control.contains("Depends: hip-dev7.1.0, libc6\n"));
        assert!(control.contains("Architecture: any\n"));
        assert!(control.contains("Description: HIP runtime\n HIP runtime\n"));
        assert!(control.ends_with('\n'));
    }

    #[test]
    fn test_control_omits_empty_depends() {
        let control = render_control(&described("rocm-core"), "rocm-core7.1.0", "").unwrap();
        assert!(!control.contains("Depends: "));
    }

    #[test]
    fn test_control_requires_description() {
        let pkg = PackageDefinition::new("hip").with_metadata(PackageMetadata {
            maintainer: Some("A <a@b.c>".into()),
            ..Default::default()
        });
        let err = render_control(&pkg, "hip", "").unwrap_err();
        assert!(matches!(err, PackagingError::MissingMetadata { field: "Description", .. }));
    }

    #[test]
    fn test_description_field() {
        assert_eq!(
            description_field("HIP runtime\nRuntime libraries.\n\nMore."),
            "HIP runtime\n Runtime libraries.\n .\n More."
        );
    }

    #[test]
    fn test_create_deb_package() {
        let fixture = PackagingFixture::new();
        let ctx = fixture.ctx();
        let tools = PackagerTools::default();
        let deb_root = ctx.deb_dir();

        let runner = MockRunner::new();
        runner.expect(
            CommandPattern::Tool("debuild".into()),
            MockProcessOutput::success("")
                .creating(deb_root.join("hip7.1.0-gfx94x_7.1.0.70100-crdnnh_amd64.deb"))
                .creating(deb_root.join("hip7.1.0-gfx94x-dbgsym_7.1.0.70100-crdnnh_amd64.deb"))
                .creating(deb_root.join("rocm-core7.1.0_7.1.0.70100-crdnnh_amd64.deb")),
        );

        let delivered = create_deb_package(&env(&fixture, &ctx, &tools, &runner), "hip").unwrap();

        assert_eq!(delivered.len(), 2);
        assert!(ctx
            .dest_dir()
            .join("hip7.1.0-gfx94x_7.1.0.70100-crdnnh_amd64.deb")
            .exists());
        assert!(deb_root
            .join("rocm-core7.1.0_7.1.0.70100-crdnnh_amd64.deb")
            .exists());

        let package_dir = deb_root.join("hip");
        assert!(package_dir
            .join("opt/rocm-7.1.0/lib/libamdhip64.so")
            .exists());
        let control = fs::read_to_string(package_dir.join("debian/control")).unwrap();
        assert!(control.contains("Depends: rocm-core7.1.0, libc6\n"));

        let calls = runner.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].command, "debuild -uc -us -b");
        assert_eq!(calls[0].cwd.as_deref(), Some(package_dir.as_path()));
    }

    #[test]
    fn test_create_deb_package_devel_spelling() {
        let fixture = PackagingFixture::new();
        let ctx = fixture.ctx();
        let tools = PackagerTools::default();
        let runner = MockRunner::new();
        runner.expect(
            CommandPattern::Tool("debuild".into()),
            MockProcessOutput::success("")
                .creating(ctx.deb_dir().join("hip-dev7.1.0_7.1.0.70100-crdnnh_amd64.deb")),
        );

        let delivered =
            create_deb_package(&env(&fixture, &ctx, &tools, &runner), "hip-devel").unwrap();
        assert_eq!(delivered.len(), 1);

        let debian = ctx.deb_dir().join("hip-devel/debian");
        let control = fs::read_to_string(debian.join("control")).unwrap();
        assert!(control.contains("Package: hip-dev7.1.0\n"));
        assert!(control.contains("Depends: hip7.1.0-gfx94x\n"));
        assert!(fs::read_to_string(debian.join("rules"))
            .unwrap()
            .contains("override_dh_dwz"));
    }

    #[test]
    fn test_create_deb_package_debuild_failure() {
        let fixture = PackagingFixture::new();
        let ctx = fixture.ctx();
        let tools = PackagerTools::default();
        let runner = MockRunner::new();
        runner.expect(
            CommandPattern::Tool("debuild".into()),
            MockProcessOutput::failure(2, "dpkg-buildpackage: error"),
        );

        let err = create_deb_package(&env(&fixture, &ctx, &tools, &runner), "hip").unwrap_err();
        let err = err.downcast_ref::<PackagingError>().unwrap();
        assert!(matches!(err, PackagingError::ExternalTool { code: Some(2), .. }));
        assert!(err.tool_output().unwrap().contains("dpkg-buildpackage"));
        assert!(fs::read_dir(ctx.dest_dir()).is_err());
    }

    #[test]
    fn test_create_deb_package_missing_manifest() {
        let fixture = PackagingFixture::new();
        let ctx = fixture.ctx();
        let tools = PackagerTools::default();
        let runner = MockRunner::succeeding();

        let err =
            create_deb_package(&env(&fixture, &ctx, &tools, &runner), "broken").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PackagingError>(),
            Some(PackagingError::MissingManifest { .. })
        ));
        assert!(runner.calls().is_empty());
    }
}
