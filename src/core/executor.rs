// Process execution for pipeline steps - direct spawn, `cmd /C` only for Windows batch tools

use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::utils::shell;

/// A fully resolved external invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub current_dir: Option<PathBuf>,
    pub env: Vec<(String, String)>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            current_dir: None,
            env: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.current_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Shell-style rendering for logs and plans.
    pub fn display(&self) -> String {
        shell::render_command(&self.program, &self.args)
    }
}

/// Exit status of an external invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandOutput {
    pub success: bool,
    /// -1 when the process could not be spawned or was killed by a signal.
    pub exit_code: i32,
}

impl CommandOutput {
    pub fn from_code(exit_code: i32) -> Self {
        Self {
            success: exit_code == 0,
            exit_code,
        }
    }
}

/// Seam between the pipeline and process spawning.
pub trait CommandRunner {
    fn run(&self, spec: &CommandSpec) -> CommandOutput;
}

/// True for programs Windows can only start through `cmd /C`: batch files and
/// bare names such as `ant` that resolve to `ant.bat` via PATHEXT.
pub fn needs_command_shell(program: &str) -> bool {
    match Path::new(program).extension().and_then(|ext| ext.to_str()) {
        None => true,
        Some(ext) => ext.eq_ignore_ascii_case("bat") || ext.eq_ignore_ascii_case("cmd"),
    }
}

/// Spawns the process and blocks until it exits.
///
/// Child stdout is forwarded to our stderr so stdout only ever carries the
/// JSON response; child stderr is inherited.
#[derive(Debug, Default)]
pub struct ProcessRunner;

impl ProcessRunner {
    pub fn new() -> Self {
        Self
    }
}

impl CommandRunner for ProcessRunner {
    fn run(&self, spec: &CommandSpec) -> CommandOutput {
        #[cfg(windows)]
        let mut cmd = if needs_command_shell(&spec.program) {
            let mut cmd = Command::new("cmd");
            cmd.args(["/C", spec.program.as_str()]);
            cmd
        } else {
            Command::new(&spec.program)
        };

        #[cfg(not(windows))]
        let mut cmd = Command::new(&spec.program);

        cmd.args(&spec.args);

        if let Some(dir) = &spec.current_dir {
            cmd.current_dir(dir);
        }

        cmd.envs(spec.env.iter().map(|(k, v)| (k.as_str(), v.as_str())));

        cmd.stdin(Stdio::null())
            .stdout(Stdio::from(std::io::stderr()))
            .stderr(Stdio::inherit());

        match cmd.status() {
            Ok(status) => CommandOutput {
                success: status.success(),
                exit_code: status.code().unwrap_or(-1),
            },
            Err(e) => {
                log_status!("exec", "Failed to start {}: {}", spec.program, e);
                CommandOutput {
                    success: false,
                    exit_code: -1,
                }
            }
        }
    }
}
