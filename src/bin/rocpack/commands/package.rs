//! `rocpack package` command

use anyhow::{anyhow, bail, Result};

use crate::cli::{GlobalArgs, PackageArgs};
use crate::commands::fetch::fetch_selected;
use crate::commands::Session;
use rocpack::ops::clean::clean;
use rocpack::ops::package::{run_packaging, PackageOptions, PackagerTools, PackagingEnv};
use rocpack::util::shell::Status;
use rocpack::util::SystemRunner;
use rocpack::{PackageFormat, RunContext};

pub fn execute(args: PackageArgs, global: &GlobalArgs) -> Result<()> {
    let session = Session::new(global)?;
    let shell = &session.shell;

    let dest_dir = session.dest_dir(args.dest_dir.as_deref())?;
    let ctx = RunContext::new(&session.work_dir, dest_dir);

    let catalog = session.load_catalog(global)?;
    let cfg = session.build_config(&args.release)?;

    if args.clean_all {
        for dir in clean(&ctx, true)? {
            shell.status(Status::Removed, dir.display());
        }
    }

    if args.no_fetch {
        shell.note("skipping fetch, using artifacts in the work directory");
    } else if let Some(url) = &args.release.artifact_url {
        // packaging still runs against whatever was fetched
        if let Err(err) = fetch_selected(&session, &ctx, &catalog, &cfg, url, &args.pkg_names) {
            shell.error(format!("fetch failed: {err:#}"));
        }
    } else {
        shell.note("no --artifact-url given, using artifacts in the work directory");
    }

    // --pkg-type wins over the config file
    let format = match args.pkg_type {
        Some(format) => Some(format),
        None => session
            .config
            .release
            .format
            .as_deref()
            .map(str::parse::<PackageFormat>)
            .transpose()
            .map_err(|e| anyhow!("invalid release.format in config: {}", e))?,
    };
    let opts = PackageOptions {
        selectors: args.pkg_names,
        formats: PackageFormat::selection(format),
        clean_build: args.clean_build,
        keep_staging: args.keep_staging,
    };

    let tools = PackagerTools::from_config(&session.config.tools);
    let env = PackagingEnv {
        ctx: &ctx,
        catalog: &catalog,
        cfg: &cfg,
        tools: &tools,
        runner: &SystemRunner,
    };

    let report = run_packaging(&env, &opts, shell)?;

    for file in report.delivered() {
        shell.status(Status::Created, file.display());
    }
    let failed = report.failed().count() + report.unknown.len();
    shell.status(
        Status::Finished,
        format!(
            "{} built, {} failed, {} skipped",
            report.succeeded().count(),
            failed,
            report.disabled.len()
        ),
    );

    if !report.is_success() {
        bail!("{} package build(s) failed", failed);
    }
    Ok(())
}
