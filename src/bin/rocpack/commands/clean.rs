//! `rocpack clean` command

use anyhow::Result;

use crate::cli::{CleanArgs, GlobalArgs};
use crate::commands::Session;
use rocpack::ops::clean::clean;
use rocpack::util::shell::Status;
use rocpack::RunContext;

pub fn execute(args: CleanArgs, global: &GlobalArgs) -> Result<()> {
    let session = Session::new(global)?;
    // nothing is delivered by clean, so the destination is irrelevant
    let ctx = RunContext::new(&session.work_dir, &session.work_dir);

    let removed = clean(&ctx, args.all)?;
    if removed.is_empty() {
        session.shell.note("nothing to clean");
    }
    for dir in removed {
        session.shell.status(Status::Removed, dir.display());
    }

    Ok(())
}
