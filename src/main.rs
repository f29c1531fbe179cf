use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod output;

use commands::{config, plan, run, GlobalArgs};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "release-export")]
#[command(version = VERSION)]
#[command(about = "Export a release tag, build its interface and binaries, then remove the tree")]
struct Cli {
    /// Use this config file instead of the default lookup
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full release export (default)
    Run(run::RunArgs),
    /// Show the ordered steps and commands without running them
    Plan(plan::PlanArgs),
    /// Inspect or create configuration
    Config(config::ConfigArgs),
}

fn run_json(command: Commands, global: &GlobalArgs) -> (release_export::Result<serde_json::Value>, i32) {
    match command {
        Commands::Run(args) => output::map_cmd_result_to_json(run::run(args, global)),
        Commands::Plan(args) => output::map_cmd_result_to_json(plan::run(args, global)),
        Commands::Config(args) => output::map_cmd_result_to_json(config::run(args, global)),
    }
}

/// Bare invocation runs the release with configured defaults.
fn command_or_default(command: Option<Commands>) -> Commands {
    command.unwrap_or_else(|| Commands::Run(run::RunArgs::default()))
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    let global = GlobalArgs { config: cli.config };

    let (json_result, exit_code) = run_json(command_or_default(cli.command), &global);
    output::print_json_result(json_result);

    std::process::ExitCode::from(exit_code_to_u8(exit_code))
}

fn exit_code_to_u8(code: i32) -> u8 {
    if code <= 0 {
        0
    } else if code >= 255 {
        255
    } else {
        code as u8
    }
}
