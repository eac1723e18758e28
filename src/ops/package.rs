//! Packaging runs: pick packages, build every requested format, report.
//!
//! A run never stops at the first failure. Each package and format is built
//! in isolation and its outcome recorded in a [`RunReport`]; the caller
//! decides the exit status from the report.

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::{error, info, warn};

use crate::core::build_config::BuildConfig;
use crate::core::catalog::Catalog;
use crate::core::errors::PackagingError;
use crate::core::format::PackageFormat;
use crate::core::naming::resolve_name_for;
use crate::ops::clean::clean_staging;
use crate::ops::deb::create_deb_package;
use crate::ops::rpm::create_rpm_package;
use crate::util::config::ToolsConfig;
use crate::util::context::RunContext;
use crate::util::fs::ensure_dir;
use crate::util::process::{find_executable, CommandRunner, ProcessBuilder};
use crate::util::shell::{Shell, Status};

/// Selector matching every enabled non-composite package.
pub const SINGLE_CATEGORY: &str = "single";

/// Selector matching every enabled composite package.
pub const COMPOSITE_CATEGORY: &str = "composite";

/// External tools used while packaging.
#[derive(Debug, Clone)]
pub struct PackagerTools {
    pub debuild: PathBuf,
    pub rpmbuild: PathBuf,
    /// Rewrites RUNPATH to RPATH in a staged tree; rpath builds skip the
    /// rewrite when unset.
    pub rpath_tool: Option<PathBuf>,
}

impl Default for PackagerTools {
    fn default() -> Self {
        PackagerTools {
            debuild: PathBuf::from("debuild"),
            rpmbuild: PathBuf::from("rpmbuild"),
            rpath_tool: None,
        }
    }
}

impl PackagerTools {
    /// Tools from the config file, falling back to PATH lookups.
    pub fn from_config(tools: &ToolsConfig) -> Self {
        let lookup = |configured: &Option<PathBuf>, name: &str| {
            configured
                .clone()
                .or_else(|| find_executable(name))
                .unwrap_or_else(|| PathBuf::from(name))
        };

        PackagerTools {
            debuild: lookup(&tools.debuild, "debuild"),
            rpmbuild: lookup(&tools.rpmbuild, "rpmbuild"),
            rpath_tool: tools.rpath_tool.clone(),
        }
    }
}

/// Everything a format backend needs to build one package.
#[derive(Clone, Copy)]
pub struct PackagingEnv<'a> {
    pub ctx: &'a RunContext,
    pub catalog: &'a Catalog,
    pub cfg: &'a BuildConfig,
    pub tools: &'a PackagerTools,
    pub runner: &'a dyn CommandRunner,
}

impl fmt::Debug for PackagingEnv<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PackagingEnv")
            .field("ctx", self.ctx)
            .field("cfg", self.cfg)
            .field("tools", self.tools)
            .finish_non_exhaustive()
    }
}

/// Run the rpath tool over `dir` when building the rpath variant.
pub(crate) fn apply_rpath(env: &PackagingEnv<'_>, dir: &Path) -> Result<()> {
    if !env.cfg.is_rpath() {
        return Ok(());
    }

    match &env.tools.rpath_tool {
        Some(tool) => {
            info!("rewriting RUNPATH to RPATH in {}", dir.display());
            env.runner.run_checked(&ProcessBuilder::new(tool).arg(dir))?;
        }
        None => warn!(
            "rpath build requested but no rpath tool configured; {} left unchanged",
            dir.display()
        ),
    }
    Ok(())
}

/// Packages picked by a list of selectors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageSelection {
    /// Packages to build, in catalog order.
    pub packages: Vec<String>,
    /// Selectors that name neither a package nor a category.
    pub unknown: Vec<String>,
    /// Packages named explicitly whose packaging is disabled.
    pub disabled: Vec<String>,
}

/// Resolve selectors (package names, `single`, `composite`) against the catalog.
///
/// No selectors picks every enabled package. Packages with packaging
/// disabled are never selected.
pub fn select_packages<S: AsRef<str>>(catalog: &Catalog, selectors: &[S]) -> PackageSelection {
    let mut selection = PackageSelection::default();

    if selectors.is_empty() {
        selection.packages = catalog.enabled().map(|p| p.name().to_string()).collect();
        return selection;
    }

    for selector in selectors {
        let selector = selector.as_ref();
        if selector == SINGLE_CATEGORY || selector == COMPOSITE_CATEGORY {
            continue;
        }
        match catalog.get(selector) {
            None => selection.unknown.push(selector.to_string()),
            Some(pkg) if pkg.is_packaging_disabled() => {
                selection.disabled.push(selector.to_string())
            }
            Some(_) => {}
        }
    }

    let wants = |name: &str, composite: bool| {
        selectors.iter().any(|s| {
            let s = s.as_ref();
            s == name
                || (s == SINGLE_CATEGORY && !composite)
                || (s == COMPOSITE_CATEGORY && composite)
        })
    };
    selection.packages = catalog
        .enabled()
        .filter(|p| wants(p.name(), p.is_composite()))
        .map(|p| p.name().to_string())
        .collect();

    selection
}

/// Options for a packaging run.
#[derive(Debug, Clone)]
pub struct PackageOptions {
    /// Package names or categories; empty selects everything enabled.
    pub selectors: Vec<String>,
    /// Formats to build, in order.
    pub formats: Vec<PackageFormat>,
    /// Remove the staging roots before the run.
    pub clean_build: bool,
    /// Leave the staging roots in place after the run.
    pub keep_staging: bool,
}

impl Default for PackageOptions {
    fn default() -> Self {
        PackageOptions {
            selectors: Vec::new(),
            formats: PackageFormat::ALL.to_vec(),
            clean_build: false,
            keep_staging: false,
        }
    }
}

/// Result of building one package in one format.
#[derive(Debug)]
pub enum Outcome {
    Built(Vec<PathBuf>),
    Failed(anyhow::Error),
}

/// One entry of a [`RunReport`].
#[derive(Debug)]
pub struct PackageOutcome {
    pub package: String,
    pub format: PackageFormat,
    pub outcome: Outcome,
}

/// Summary of a packaging run.
#[derive(Debug, Default)]
pub struct RunReport {
    pub outcomes: Vec<PackageOutcome>,
    /// Selectors that matched nothing; each counts as a failure.
    pub unknown: Vec<String>,
    /// Explicitly requested packages skipped because packaging is disabled.
    pub disabled: Vec<String>,
}

impl RunReport {
    /// Outcomes that produced packages.
    pub fn succeeded(&self) -> impl Iterator<Item = &PackageOutcome> {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.outcome, Outcome::Built(_)))
    }

    /// Outcomes that failed.
    pub fn failed(&self) -> impl Iterator<Item = &PackageOutcome> {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.outcome, Outcome::Failed(_)))
    }

    /// Builds that succeeded without delivering any file.
    pub fn empty_deliveries(&self) -> impl Iterator<Item = &PackageOutcome> {
        self.outcomes
            .iter()
            .filter(|o| matches!(&o.outcome, Outcome::Built(files) if files.is_empty()))
    }

    /// All delivered package files.
    pub fn delivered(&self) -> Vec<&Path> {
        self.outcomes
            .iter()
            .filter_map(|o| match &o.outcome {
                Outcome::Built(files) => Some(files),
                Outcome::Failed(_) => None,
            })
            .flatten()
            .map(PathBuf::as_path)
            .collect()
    }

    /// True when every requested package was built in every format.
    pub fn is_success(&self) -> bool {
        self.unknown.is_empty() && self.failed().next().is_none()
    }
}

/// Build every selected package in every requested format.
///
/// Errors returned from here are environment failures (the destination
/// cannot be created, cleaning fails). Per-package failures end up in the
/// report.
pub fn run_packaging(
    env: &PackagingEnv<'_>,
    opts: &PackageOptions,
    shell: &Shell,
) -> Result<RunReport> {
    if opts.clean_build {
        clean_staging(env.ctx)?;
    }
    ensure_dir(env.ctx.dest_dir())?;

    let selection = select_packages(env.catalog, &opts.selectors);
    for name in &selection.unknown {
        shell.error(format!("package not found in catalog: `{name}`"));
    }
    for name in &selection.disabled {
        shell.status(Status::Skipped, format!("{name} (packaging disabled)"));
    }
    info!("selected {} packages", selection.packages.len());

    let mut report = RunReport {
        outcomes: Vec::new(),
        unknown: selection.unknown,
        disabled: selection.disabled,
    };

    for name in &selection.packages {
        for &format in &opts.formats {
            let outcome = build_one(env, name, format, shell);
            report.outcomes.push(PackageOutcome {
                package: name.clone(),
                format,
                outcome,
            });
        }
    }

    if !opts.keep_staging {
        clean_staging(env.ctx)?;
    }

    Ok(report)
}

fn build_one(env: &PackagingEnv<'_>, name: &str, format: PackageFormat, shell: &Shell) -> Outcome {
    let display = env
        .catalog
        .get(name)
        .map(|pkg| resolve_name_for(pkg, env.cfg, format))
        .unwrap_or_else(|| name.to_string());
    let span = shell.span(Status::Packaging, format!("{display} ({format})"));

    let result = match format {
        PackageFormat::Deb => create_deb_package(env, name),
        PackageFormat::Rpm => create_rpm_package(env, name),
    };

    match result {
        Ok(files) => {
            if files.is_empty() {
                warn!("{} ({}) built but produced no package files", name, format);
                shell.warn(format!("{display} ({format}): packager produced no files"));
            }
            span.finish_with_message(format!("{display} ({format}), {} file(s)", files.len()));
            Outcome::Built(files)
        }
        Err(err) => {
            error!("{} ({}) failed: {:#}", name, format, err);
            if let Some(output) = err
                .downcast_ref::<PackagingError>()
                .and_then(PackagingError::tool_output)
            {
                error!("tool output:\n{}", output.trim_end());
            }
            shell.error(format!("{display} ({format}): {err:#}"));
            Outcome::Failed(err)
        }
    }
}
