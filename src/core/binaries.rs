use std::path::{Path, PathBuf};

use crate::defaults::BinariesConfig;
use crate::error::Result;
use crate::executor::{CommandOutput, CommandRunner, CommandSpec};
use crate::paths;

/// MATLAB batch invocation that compiles the platform executables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinariesBuild {
    pub matlab: String,
    pub options: Vec<String>,
    pub log_file: PathBuf,
    pub work_dir: PathBuf,
    pub script: String,
}

/// Inline MATLAB statement: put `script_dir` on the path, call the entry
/// point with the release version and exit; errors are printed, not raised.
pub fn matlab_script(config: &BinariesConfig, version: &str) -> String {
    format!(
        "addpath('{}'); try, {}('{}'); exit(); catch e, disp(e.message); end;",
        escape_matlab(&config.script_dir),
        config.entry_point,
        escape_matlab(version)
    )
}

// MATLAB char literals double embedded quotes.
fn escape_matlab(value: &str) -> String {
    value.replace('\'', "''")
}

impl BinariesBuild {
    /// `base` anchors a relative log path so the log outlives the export tree.
    pub fn resolve(config: &BinariesConfig, version: &str, export_dir: &Path, base: &Path) -> Result<Self> {
        let matlab = paths::expand(&config.matlab, "binaries.matlab")?;
        let log_file = paths::resolve(base, &paths::expand(&config.log_file, "binaries.log_file")?);

        Ok(Self {
            matlab,
            options: config.options.clone(),
            log_file,
            work_dir: export_dir.to_path_buf(),
            script: matlab_script(config, version),
        })
    }

    pub fn command(&self) -> CommandSpec {
        CommandSpec::new(&self.matlab)
            .args(self.options.iter().cloned())
            .arg("-logfile")
            .arg(self.log_file.to_string_lossy())
            .arg("-r")
            .arg(&self.script)
            .current_dir(&self.work_dir)
    }

    /// Exit status is reported back but never drives control flow.
    pub fn run(&self, runner: &dyn CommandRunner) -> CommandOutput {
        runner.run(&self.command())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_calls_entry_point_with_version() {
        let script = matlab_script(&BinariesConfig::default(), "AIMS-2.5.41");
        assert_eq!(
            script,
            "addpath('Util'); try, imosCompile('AIMS-2.5.41'); exit(); catch e, disp(e.message); end;"
        );
    }

    #[test]
    fn script_escapes_quotes() {
        let script = matlab_script(&BinariesConfig::default(), "it's");
        assert!(script.contains("imosCompile('it''s')"));
    }

    #[test]
    fn command_passes_options_log_and_script() {
        let base = Path::new("/work");
        let build = BinariesBuild::resolve(
            &BinariesConfig::default(),
            "2.6",
            &base.join("export"),
            base,
        )
        .unwrap();
        let spec = build.command();

        assert_eq!(spec.program, "matlab");
        assert_eq!(&spec.args[..3], &["-nodisplay", "-wait", "-logfile"]);
        assert_eq!(spec.args[3], base.join("log.txt").to_string_lossy());
        assert_eq!(spec.args[4], "-r");
        assert!(spec.args[5].starts_with("addpath('Util')"));
        assert_eq!(spec.current_dir, Some(base.join("export")));
    }
}
