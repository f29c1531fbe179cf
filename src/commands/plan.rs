use clap::Args;

use release_export::release::{self, ReleasePlan};

use super::{CmdResult, GlobalArgs};

#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Release tag to plan for (overrides the configured version)
    #[arg(long)]
    pub tag: Option<String>,
}

pub fn run(args: PlanArgs, global: &GlobalArgs) -> CmdResult<ReleasePlan> {
    let loaded = global.load_config()?;
    let resolved = release::resolve(&loaded.config, &global.base_dir()?, args.tag.as_deref())?;
    Ok((release::plan(&resolved), 0))
}
