//! Release export: clone a tag, prune, build the interface and binaries,
//! tear the tree down.
//!
//! Steps always run in the same order. Only the interface build reacts to
//! its own failure (one clean); every other failure is recorded and the run
//! moves on. Teardown is always last.

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::binaries::BinariesBuild;
use crate::defaults::ReleaseConfig;
use crate::error::{Error, Result};
use crate::executor::CommandRunner;
use crate::interface::{self, InterfaceBuild};
use crate::paths;
use crate::pipeline::{self, RunStatus, RunSummary, Step, StepLog, StepResult};
use crate::utils::validation;
use crate::{git, workspace};

/// Configuration with every path expanded and validated for one run.
#[derive(Debug, Clone)]
pub struct ResolvedRelease {
    pub project: String,
    pub version: String,
    pub url: String,
    pub export_dir: PathBuf,
    pub prune: Vec<String>,
    pub interface: InterfaceBuild,
    pub binaries: BinariesBuild,
}

/// Resolve `config` against `base`, the directory the tool was launched from.
/// `tag` overrides the configured version.
pub fn resolve(config: &ReleaseConfig, base: &Path, tag: Option<&str>) -> Result<ResolvedRelease> {
    let version = validation::validate_tag(tag.unwrap_or(&config.version))?.to_string();

    let export_raw = paths::expand(&config.export_dir, "export_dir")?;
    let export_dir = paths::resolve(base, validation::validate_export_dir(&export_raw)?);
    validation::validate_export_target(&export_dir, base)?;

    let url = paths::expand(&config.repository_url(), "url")?;
    validation::require_non_empty(&url, "url", "Repository URL is empty")?;

    Ok(ResolvedRelease {
        project: config.project.clone(),
        interface: interface::resolve(&config.interface, &export_dir)?,
        binaries: BinariesBuild::resolve(&config.binaries, &version, &export_dir, base)?,
        prune: config.prune.clone(),
        version,
        url,
        export_dir,
    })
}

// =============================================================================
// Plan
// =============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct PlanStep {
    pub step: Step,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReleasePlan {
    pub project: String,
    pub version: String,
    pub url: String,
    pub export_dir: String,
    pub log_file: String,
    pub steps: Vec<PlanStep>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

fn plan_step(step: Step) -> PlanStep {
    PlanStep {
        step,
        command: None,
        path: None,
        condition: None,
    }
}

/// What `run` would execute, without executing anything.
pub fn plan(release: &ResolvedRelease) -> ReleasePlan {
    let mut steps = vec![
        PlanStep {
            command: Some(git::clone_command(&release.url, &release.export_dir).display()),
            ..plan_step(Step::Clone)
        },
        PlanStep {
            command: Some(git::checkout_command(&release.export_dir, &release.version).display()),
            ..plan_step(Step::Checkout)
        },
    ];

    steps.extend(release.prune.iter().map(|entry| PlanStep {
        path: Some(release.export_dir.join(entry).display().to_string()),
        ..plan_step(Step::Prune)
    }));

    steps.push(PlanStep {
        command: Some(release.interface.install_command().display()),
        ..plan_step(Step::InterfaceInstall)
    });
    steps.push(PlanStep {
        command: Some(release.interface.clean_command().display()),
        condition: Some(format!(
            "only when '{}' fails",
            release.interface.install_target
        )),
        ..plan_step(Step::InterfaceClean)
    });
    steps.push(PlanStep {
        command: Some(release.binaries.command().display()),
        ..plan_step(Step::Binaries)
    });
    steps.push(PlanStep {
        path: Some(release.export_dir.display().to_string()),
        ..plan_step(Step::Teardown)
    });

    ReleasePlan {
        project: release.project.clone(),
        version: release.version.clone(),
        url: release.url.clone(),
        export_dir: release.export_dir.display().to_string(),
        log_file: release.binaries.log_file.display().to_string(),
        steps,
        warnings: preflight_warnings(release),
    }
}

fn preflight_warnings(release: &ResolvedRelease) -> Vec<String> {
    let mut warnings = Vec::new();
    if release.binaries.log_file.starts_with(&release.export_dir) {
        warnings.push(format!(
            "Compile log {} is inside the export directory and will be removed by teardown",
            release.binaries.log_file.display()
        ));
    }
    warnings
}

// =============================================================================
// Run
// =============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct ReleaseRun {
    pub project: String,
    pub version: String,
    pub export_dir: String,
    pub log_file: String,
    pub status: RunStatus,
    pub summary: RunSummary,
    pub steps: Vec<StepResult>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    pub started_at: String,
    pub finished_at: String,
}

impl ReleaseRun {
    pub fn has_failures(&self) -> bool {
        self.summary.failed > 0
    }
}

/// Process exit code for a finished run: 0 unless `strict` and a step failed.
pub fn exit_code(run: &ReleaseRun, strict: bool) -> i32 {
    if strict && run.has_failures() {
        1
    } else {
        0
    }
}

fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Execute every step once, in order, through `runner`.
pub fn run(release: &ResolvedRelease, runner: &dyn CommandRunner) -> ReleaseRun {
    let started_at = timestamp();
    let warnings = preflight_warnings(release);
    let export_dir = &release.export_dir;
    // Anything already on disk was not created by this run and is left alone.
    let preexisting = export_dir.exists();
    let mut log = StepLog::new();

    log_status!(
        "export",
        "Exporting tree from {} to {}",
        release.url,
        export_dir.display()
    );
    let clone = git::clone_command(&release.url, export_dir).display();
    log.record(match git::clone_repo(runner, &release.url, export_dir) {
        Ok(out) => StepResult::success(Step::Clone).with_exit_code(out.exit_code),
        Err(e) => StepResult::failed(Step::Clone, &e),
    }
    .with_command(clone));

    let checkout = git::checkout_command(export_dir, &release.version).display();
    log.record(match git::checkout(runner, export_dir, &release.version) {
        Ok(out) => StepResult::success(Step::Checkout).with_exit_code(out.exit_code),
        Err(e) => StepResult::failed(Step::Checkout, &e),
    }
    .with_command(checkout));

    for entry in &release.prune {
        log_status!("prune", "Removing {}", entry);
        let target = export_dir.join(entry).display().to_string();
        log.record(match workspace::prune(export_dir, entry) {
            Ok(_) => StepResult::success(Step::Prune),
            Err(e) => StepResult::failed(Step::Prune, &e),
        }
        .with_path(target));
    }

    log_status!("interface", "Building interface");
    run_interface(&release.interface, runner, &mut log);

    log_status!("binaries", "Building binaries");
    let binaries = release.binaries.run(runner);
    log.record(
        StepResult::success(Step::Binaries)
            .with_command(release.binaries.command().display())
            .with_exit_code(binaries.exit_code),
    );

    let teardown = if preexisting {
        StepResult::skipped(
            Step::Teardown,
            "export directory existed before the run; left in place",
        )
    } else {
        log_status!("teardown", "Removing {}", export_dir.display());
        match workspace::teardown(export_dir) {
            Ok(()) => StepResult::success(Step::Teardown),
            Err(e) => StepResult::failed(Step::Teardown, &e),
        }
    };
    log.record(teardown.with_path(export_dir.display().to_string()));

    let steps = log.into_steps();
    let summary = pipeline::summarize(&steps);

    ReleaseRun {
        project: release.project.clone(),
        version: release.version.clone(),
        export_dir: export_dir.display().to_string(),
        log_file: release.binaries.log_file.display().to_string(),
        status: pipeline::overall_status(&summary),
        summary,
        steps,
        warnings,
        started_at,
        finished_at: timestamp(),
    }
}

fn run_interface(build: &InterfaceBuild, runner: &dyn CommandRunner, log: &mut StepLog) {
    let outcome = build.run(runner);
    let install = match build.install_error(&outcome) {
        None => StepResult::success(Step::InterfaceInstall),
        Some(e) => StepResult::failed(Step::InterfaceInstall, &e),
    };
    log.record(
        install
            .with_command(build.install_command().display())
            .with_exit_code(outcome.install.exit_code),
    );

    let clean = match outcome.clean {
        None => StepResult::skipped(Step::InterfaceClean, "install succeeded"),
        Some(out) if out.success => StepResult::success(Step::InterfaceClean).with_exit_code(out.exit_code),
        Some(out) => StepResult::failed(
            Step::InterfaceClean,
            &Error::tool_command_failed(build.clean_command().display(), out.exit_code),
        )
        .with_exit_code(out.exit_code),
    };
    log.record(clean.with_command(build.clean_command().display()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn resolve_applies_tag_override_and_base() {
        let base = Path::new("/work");
        let release = resolve(&ReleaseConfig::default(), base, Some("2.6.1")).unwrap();

        assert_eq!(release.version, "2.6.1");
        assert_eq!(release.export_dir, base.join("export"));
        assert!(release.binaries.script.contains("imosCompile('2.6.1')"));
        assert_eq!(release.url, "https://github.com/aodn/imos-toolbox.git");
    }

    #[test]
    fn resolve_rejects_unsafe_export_dir() {
        let config = ReleaseConfig {
            export_dir: ".".to_string(),
            ..ReleaseConfig::default()
        };
        assert!(resolve(&config, Path::new("/work"), None).is_err());
    }

    #[test]
    fn resolve_rejects_invalid_tag() {
        assert!(resolve(&ReleaseConfig::default(), Path::new("/work"), Some("-x")).is_err());
    }

    #[test]
    fn plan_lists_steps_in_execution_order() {
        let dir = tempdir().unwrap();
        let release = resolve(&ReleaseConfig::default(), dir.path(), None).unwrap();
        let order: Vec<Step> = plan(&release).steps.iter().map(|s| s.step).collect();

        assert_eq!(
            order,
            vec![
                Step::Clone,
                Step::Checkout,
                Step::Prune,
                Step::InterfaceInstall,
                Step::InterfaceClean,
                Step::Binaries,
                Step::Teardown,
            ]
        );
    }

    #[test]
    fn resolve_rejects_existing_export_dir() {
        let dir = tempdir().unwrap();
        std::fs::create_dir(dir.path().join("export")).unwrap();

        let err = resolve(&ReleaseConfig::default(), dir.path(), None).unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::ConfigInvalidValue);
    }

    #[test]
    fn resolve_rejects_home_and_launch_dir() {
        let dir = tempdir().unwrap();
        let mut config = ReleaseConfig::default();

        if paths::home_dir().is_some() {
            config.export_dir = "~".to_string();
            assert!(resolve(&config, dir.path(), None).is_err());
        }

        config.export_dir = dir.path().display().to_string();
        assert!(resolve(&config, dir.path(), None).is_err());
    }

    fn finished(steps: Vec<StepResult>) -> ReleaseRun {
        let summary = pipeline::summarize(&steps);
        ReleaseRun {
            project: "imos-toolbox".to_string(),
            version: "AIMS-2.5.41".to_string(),
            export_dir: "export".to_string(),
            log_file: "log.txt".to_string(),
            status: pipeline::overall_status(&summary),
            summary,
            steps,
            warnings: Vec::new(),
            started_at: timestamp(),
            finished_at: timestamp(),
        }
    }

    #[test]
    fn exit_code_is_zero_unless_strict_and_failed() {
        let clean = finished(vec![StepResult::success(Step::Clone)]);
        assert_eq!(exit_code(&clean, false), 0);
        assert_eq!(exit_code(&clean, true), 0);

        let failed = finished(vec![
            StepResult::success(Step::Clone),
            StepResult::failed(Step::Teardown, &Error::internal_io("busy", None)),
        ]);
        assert_eq!(exit_code(&failed, false), 0);
        assert_eq!(exit_code(&failed, true), 1);
    }

    #[test]
    fn plan_warns_when_log_would_be_torn_down() {
        let dir = tempdir().unwrap();
        let mut config = ReleaseConfig::default();
        config.binaries.log_file = "export/log.txt".to_string();
        let release = resolve(&config, dir.path(), None).unwrap();

        assert!(plan(&release)
            .warnings
            .iter()
            .any(|w| w.contains("removed by teardown")));
    }
}
