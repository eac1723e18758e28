//! `rocpack select` command

use anyhow::Result;

use crate::cli::{GlobalArgs, SelectArgs};
use crate::commands::Session;
use rocpack::ops::assemble::stage_package;
use rocpack::ops::select::select_artifact_dirs;
use rocpack::util::shell::Status;
use rocpack::RunContext;

pub fn execute(args: SelectArgs, global: &GlobalArgs) -> Result<()> {
    let session = Session::new(global)?;
    let catalog = session.load_catalog(global)?;
    let cfg = session.build_config(&args.release)?;
    let ctx = RunContext::new(&session.work_dir, &session.work_dir);

    let sources =
        select_artifact_dirs(&catalog, &ctx.artifacts_dir(), &args.name, cfg.gfx_arch())?;
    for source in &sources {
        println!("{}", source.display());
    }

    if let Some(stage) = &args.stage {
        let span = session.shell.span(Status::Staging, stage.display());
        let report = stage_package(&sources, stage)?;
        for skipped in &report.skipped {
            session
                .shell
                .status(Status::Skipped, format!("{} (not a directory)", skipped.display()));
        }
        span.finish_with_message(format!(
            "{} files from {} sources",
            report.files,
            report.copied.len()
        ));
    }

    Ok(())
}
