use std::path::PathBuf;

use release_export::defaults::{self, LoadedConfig};
use release_export::Error;

pub type CmdResult<T> = release_export::Result<(T, i32)>;

pub(crate) struct GlobalArgs {
    pub config: Option<PathBuf>,
}

impl GlobalArgs {
    /// Directory relative paths are resolved against.
    pub fn base_dir(&self) -> release_export::Result<PathBuf> {
        std::env::current_dir().map_err(|e| {
            Error::internal_io(e.to_string(), Some("resolve current directory".to_string()))
        })
    }

    pub fn load_config(&self) -> release_export::Result<LoadedConfig> {
        defaults::load(self.config.as_deref(), &self.base_dir()?)
    }
}

pub mod config;
pub mod plan;
pub mod run;
