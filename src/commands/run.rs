use clap::Args;

use release_export::executor::ProcessRunner;
use release_export::release::{self, ReleaseRun};

use super::{CmdResult, GlobalArgs};

#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Release tag to export (overrides the configured version)
    #[arg(long)]
    pub tag: Option<String>,

    /// Exit with status 1 when any step failed
    #[arg(long)]
    pub strict: bool,
}

pub fn run(args: RunArgs, global: &GlobalArgs) -> CmdResult<ReleaseRun> {
    let loaded = global.load_config()?;
    let resolved = release::resolve(&loaded.config, &global.base_dir()?, args.tag.as_deref())?;

    let result = release::run(&resolved, &ProcessRunner::new());
    let exit_code = release::exit_code(&result, args.strict);

    Ok((result, exit_code))
}
