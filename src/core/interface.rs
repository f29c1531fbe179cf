//! Java interface build through Apache Ant.
//!
//! `install` is attempted once; when it does not exit cleanly the `clean`
//! target runs once and the outcome is reported. Nothing is retried.

use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::defaults::InterfaceConfig;
use crate::error::{Error, Result};
use crate::executor::{CommandOutput, CommandRunner, CommandSpec};

/// Fully resolved Ant invocation settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceBuild {
    pub tool: String,
    pub tool_home: Option<String>,
    pub build_dir: PathBuf,
    pub install_target: String,
    pub clean_target: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InterfaceOutcome {
    pub install: CommandOutput,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clean: Option<CommandOutput>,
}

impl InterfaceOutcome {
    pub fn installed(&self) -> bool {
        self.install.success
    }
}

impl InterfaceBuild {
    pub fn from_config(config: &InterfaceConfig, tool: String, tool_home: Option<String>, export_dir: &Path) -> Self {
        Self {
            tool_home: tool_home.or_else(|| derive_tool_home(&tool)),
            tool,
            build_dir: export_dir.join(&config.dir),
            install_target: config.install_target.clone(),
            clean_target: config.clean_target.clone(),
        }
    }

    pub fn install_command(&self) -> CommandSpec {
        self.target_command(&self.install_target)
    }

    pub fn clean_command(&self) -> CommandSpec {
        self.target_command(&self.clean_target)
    }

    fn target_command(&self, target: &str) -> CommandSpec {
        let spec = CommandSpec::new(&self.tool)
            .arg(target)
            .current_dir(&self.build_dir);

        match &self.tool_home {
            Some(home) => spec.env("ANT_HOME", home),
            None => spec,
        }
    }

    /// Run the install target, falling back to a single clean on failure.
    pub fn run(&self, runner: &dyn CommandRunner) -> InterfaceOutcome {
        let install = runner.run(&self.install_command());
        if install.success {
            return InterfaceOutcome {
                install,
                clean: None,
            };
        }

        log_status!(
            "interface",
            "Interface compilation failed (status {}) - cleaning",
            install.exit_code
        );
        let clean = runner.run(&self.clean_command());

        InterfaceOutcome {
            install,
            clean: Some(clean),
        }
    }

    /// Error describing a failed install, for step reporting.
    pub fn install_error(&self, outcome: &InterfaceOutcome) -> Option<Error> {
        if outcome.installed() {
            return None;
        }
        let mut err = Error::tool_command_failed(self.install_command().display(), outcome.install.exit_code);
        if let Some(clean) = &outcome.clean {
            if !clean.success {
                err = err.with_hint(format!(
                    "'{}' target also failed with status {}",
                    self.clean_target, clean.exit_code
                ));
            }
        }
        Some(err)
    }
}

/// ANT_HOME is the parent of the `bin` directory holding the executable.
fn derive_tool_home(tool: &str) -> Option<String> {
    let bin = Path::new(tool).parent()?;
    if bin.file_name()? != "bin" {
        return None;
    }
    let home = bin.parent()?;
    if home.as_os_str().is_empty() {
        return None;
    }
    Some(home.to_string_lossy().into_owned())
}

/// Resolve the configured tool and home paths.
pub fn resolve(config: &InterfaceConfig, export_dir: &Path) -> Result<InterfaceBuild> {
    let tool = crate::paths::expand(&config.tool, "interface.tool")?;
    let tool_home = config
        .tool_home
        .as_deref()
        .map(|home| crate::paths::expand(home, "interface.tool_home"))
        .transpose()?;

    Ok(InterfaceBuild::from_config(config, tool, tool_home, export_dir))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    struct ScriptedRunner {
        codes: RefCell<Vec<i32>>,
        seen: RefCell<Vec<CommandSpec>>,
    }

    impl ScriptedRunner {
        fn new(codes: &[i32]) -> Self {
            Self {
                codes: RefCell::new(codes.iter().rev().copied().collect()),
                seen: RefCell::new(Vec::new()),
            }
        }
    }

    impl CommandRunner for ScriptedRunner {
        fn run(&self, spec: &CommandSpec) -> CommandOutput {
            self.seen.borrow_mut().push(spec.clone());
            CommandOutput::from_code(self.codes.borrow_mut().pop().unwrap_or(0))
        }
    }

    fn build() -> InterfaceBuild {
        InterfaceBuild::from_config(
            &InterfaceConfig::default(),
            "/opt/apache-ant-1.10.5/bin/ant".to_string(),
            None,
            Path::new("export"),
        )
    }

    #[test]
    fn successful_install_skips_clean() {
        let runner = ScriptedRunner::new(&[0]);
        let outcome = build().run(&runner);

        assert!(outcome.installed());
        assert!(outcome.clean.is_none());
        assert_eq!(runner.seen.borrow().len(), 1);
    }

    #[test]
    fn failed_install_cleans_exactly_once() {
        let runner = ScriptedRunner::new(&[1, 1]);
        let outcome = build().run(&runner);

        let seen = runner.seen.borrow();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].args, vec!["install"]);
        assert_eq!(seen[1].args, vec!["clean"]);
        assert!(!outcome.clean.unwrap().success);
    }

    #[test]
    fn commands_run_in_java_dir_with_ant_home() {
        let spec = build().install_command();
        assert_eq!(
            spec.current_dir.as_deref(),
            Some(Path::new("export").join("Java").as_path())
        );
        assert_eq!(
            spec.env,
            vec![("ANT_HOME".to_string(), "/opt/apache-ant-1.10.5".to_string())]
        );
    }

    #[test]
    fn bare_tool_name_has_no_home() {
        assert_eq!(derive_tool_home("ant"), None);
        assert_eq!(derive_tool_home("/usr/share/ant/ant"), None);
    }

    #[test]
    fn configured_home_wins_over_derived() {
        let b = InterfaceBuild::from_config(
            &InterfaceConfig::default(),
            "/opt/ant/bin/ant".to_string(),
            Some("/srv/ant".to_string()),
            Path::new("export"),
        );
        assert_eq!(b.tool_home.as_deref(), Some("/srv/ant"));
    }

    #[test]
    fn install_error_mentions_failed_clean() {
        let b = build();
        let outcome = InterfaceOutcome {
            install: CommandOutput::from_code(1),
            clean: Some(CommandOutput::from_code(2)),
        };
        let err = b.install_error(&outcome).unwrap();
        assert_eq!(err.details["exitCode"], 1);
        assert!(err.hints[0].message.contains("status 2"));
    }
}
