//! `rocpack fetch` command

use anyhow::{bail, Result};

use crate::cli::{FetchArgs, GlobalArgs};
use crate::commands::Session;
use rocpack::ops::fetch::{artifact_base_url, build_id_from_url, fetch_artifacts, plan_fetch};
use rocpack::ops::package::select_packages;
use rocpack::ops::FetchReport;
use rocpack::util::shell::Status;
use rocpack::{BuildConfig, Catalog, RunContext};

pub fn execute(args: FetchArgs, global: &GlobalArgs) -> Result<()> {
    let session = Session::new(global)?;
    let Some(url) = args.release.artifact_url.clone() else {
        bail!("--artifact-url is required to fetch artifacts");
    };

    let catalog = session.load_catalog(global)?;
    let cfg = session.build_config(&args.release)?;
    let ctx = RunContext::new(&session.work_dir, &session.work_dir);

    let report = fetch_selected(&session, &ctx, &catalog, &cfg, &url, &args.pkg_names)?;
    session.shell.status(
        Status::Finished,
        format!(
            "{} downloaded, {} extracted, {} already present",
            report.downloaded.len(),
            report.extracted.len(),
            report.reused.len()
        ),
    );
    Ok(())
}

/// Fetch the artifacts of the packages picked by `selectors`.
pub fn fetch_selected(
    session: &Session,
    ctx: &RunContext,
    catalog: &Catalog,
    cfg: &BuildConfig,
    url: &str,
    selectors: &[String],
) -> Result<FetchReport> {
    let base = artifact_base_url(url)?;
    if let Some(build_id) = build_id_from_url(url) {
        session
            .shell
            .note(format!("build {} ({})", build_id, cfg.gfx_arch()));
    }

    let selection = select_packages(catalog, selectors);
    for name in &selection.unknown {
        session.shell.warn(format!("not in catalog, nothing to fetch: {name}"));
    }
    let dirs = plan_fetch(catalog, &selection.packages, cfg.gfx_arch())?;

    fetch_artifacts(ctx, &base, &dirs, &session.shell)
}
