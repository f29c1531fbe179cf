use clap::{Args, Subcommand};
use serde::Serialize;

use release_export::defaults::{self, ConfigSource, ReleaseConfig};
use release_export::{paths, Error};

use super::{CmdResult, GlobalArgs};

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Display the effective configuration
    Show {
        /// Show only built-in defaults (ignore config files)
        #[arg(long)]
        builtin: bool,
    },
    /// Show where configuration is looked up
    Path,
    /// Write built-in defaults to the config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Debug, Serialize)]
pub struct ConfigOutput {
    command: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<ConfigSource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    config: Option<ReleaseConfig>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    candidates: Vec<ConfigCandidate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<String>,
}

#[derive(Debug, Serialize)]
struct ConfigCandidate {
    path: String,
    exists: bool,
}

impl ConfigOutput {
    fn new(command: &str) -> Self {
        Self {
            command: command.to_string(),
            source: None,
            config: None,
            candidates: Vec::new(),
            path: None,
        }
    }
}

pub fn run(args: ConfigArgs, global: &GlobalArgs) -> CmdResult<ConfigOutput> {
    match args.command {
        ConfigCommand::Show { builtin } => {
            let mut out = ConfigOutput::new("config.show");
            if builtin {
                out.source = Some(ConfigSource::Builtin);
                out.config = Some(ReleaseConfig::default());
            } else {
                let loaded = global.load_config()?;
                out.source = Some(loaded.source);
                out.config = Some(loaded.config);
            }
            Ok((out, 0))
        }
        ConfigCommand::Path => {
            let mut lookup = Vec::new();
            if let Some(explicit) = &global.config {
                lookup.push(explicit.clone());
            } else {
                lookup.push(paths::local_config(&global.base_dir()?));
                lookup.push(paths::release_json()?);
            }

            let mut out = ConfigOutput::new("config.path");
            out.candidates = lookup
                .into_iter()
                .map(|p| ConfigCandidate {
                    exists: p.exists(),
                    path: p.display().to_string(),
                })
                .collect();
            Ok((out, 0))
        }
        ConfigCommand::Init { force } => {
            let path = defaults::target_path(global.config.as_deref())?;
            if path.exists() && !force {
                return Err(Error::validation_invalid_argument(
                    "path",
                    "Config file already exists",
                    Some(path.display().to_string()),
                )
                .with_hint("Pass --force to overwrite it"));
            }

            defaults::save(&ReleaseConfig::default(), &path)?;

            let mut out = ConfigOutput::new("config.init");
            out.path = Some(path.display().to_string());
            Ok((out, 0))
        }
    }
}
