use std::path::Path;

use crate::error::{Error, Result};
use crate::executor::{CommandOutput, CommandRunner, CommandSpec};

pub fn clone_command(url: &str, target_dir: &Path) -> CommandSpec {
    CommandSpec::new("git")
        .arg("clone")
        .arg(url)
        .arg(target_dir.to_string_lossy())
}

pub fn checkout_command(repo_dir: &Path, reference: &str) -> CommandSpec {
    CommandSpec::new("git")
        .arg("checkout")
        .arg(reference)
        .current_dir(repo_dir)
}

/// Clone `url` into `target_dir`.
pub fn clone_repo(runner: &dyn CommandRunner, url: &str, target_dir: &Path) -> Result<CommandOutput> {
    let output = runner.run(&clone_command(url, target_dir));
    if !output.success {
        return Err(Error::git_command_failed(format!(
            "git clone {} failed with status {}",
            url, output.exit_code
        )));
    }
    Ok(output)
}

/// Switch the working tree in `repo_dir` to `reference` (tag, branch or commit).
pub fn checkout(runner: &dyn CommandRunner, repo_dir: &Path, reference: &str) -> Result<CommandOutput> {
    let output = runner.run(&checkout_command(repo_dir, reference));
    if !output.success {
        return Err(Error::git_command_failed(format!(
            "git checkout {} failed with status {}",
            reference, output.exit_code
        ))
        .with_hint(format!("Check that tag '{}' exists in the repository", reference)));
    }
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    struct FixedRunner {
        exit_code: i32,
        seen: RefCell<Vec<CommandSpec>>,
    }

    impl CommandRunner for FixedRunner {
        fn run(&self, spec: &CommandSpec) -> CommandOutput {
            self.seen.borrow_mut().push(spec.clone());
            CommandOutput::from_code(self.exit_code)
        }
    }

    fn runner(exit_code: i32) -> FixedRunner {
        FixedRunner {
            exit_code,
            seen: RefCell::new(Vec::new()),
        }
    }

    #[test]
    fn clone_command_targets_export_dir() {
        let spec = clone_command("https://example.com/repo.git", Path::new("export"));
        assert_eq!(spec.program, "git");
        assert_eq!(spec.args, vec!["clone", "https://example.com/repo.git", "export"]);
        assert!(spec.current_dir.is_none());
    }

    #[test]
    fn checkout_runs_inside_repo() {
        let r = runner(0);
        checkout(&r, Path::new("export"), "AIMS-2.5.41").unwrap();

        let seen = r.seen.borrow();
        assert_eq!(seen[0].args, vec!["checkout", "AIMS-2.5.41"]);
        assert_eq!(seen[0].current_dir.as_deref(), Some(Path::new("export")));
    }

    #[test]
    fn failed_checkout_is_a_git_error_with_hint() {
        let err = checkout(&runner(1), Path::new("export"), "missing-tag").unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::GitCommandFailed);
        assert!(err.hints[0].message.contains("missing-tag"));
    }

    #[test]
    fn failed_clone_is_a_git_error() {
        let err = clone_repo(&runner(128), "file:///nowhere/.git", Path::new("export")).unwrap_err();
        assert!(err.message.contains("status 128"));
    }
}
