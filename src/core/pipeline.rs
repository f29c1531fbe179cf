use serde::Serialize;

use crate::error::{Error, Hint};

/// The fixed release steps, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Step {
    #[serde(rename = "clone")]
    Clone,
    #[serde(rename = "checkout")]
    Checkout,
    #[serde(rename = "prune")]
    Prune,
    #[serde(rename = "interface.install")]
    InterfaceInstall,
    #[serde(rename = "interface.clean")]
    InterfaceClean,
    #[serde(rename = "binaries")]
    Binaries,
    #[serde(rename = "teardown")]
    Teardown,
}

impl Step {
    pub fn as_str(&self) -> &'static str {
        match self {
            Step::Clone => "clone",
            Step::Checkout => "checkout",
            Step::Prune => "prune",
            Step::InterfaceInstall => "interface.install",
            Step::InterfaceClean => "interface.clean",
            Step::Binaries => "binaries",
            Step::Teardown => "teardown",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Success,
    Failed,
    Skipped,
}

#[derive(Debug, Clone, Serialize)]
pub struct StepResult {
    pub step: Step,
    pub status: StepStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Why a skipped step did not run.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub hints: Vec<Hint>,
}

impl StepResult {
    fn new(step: Step, status: StepStatus) -> Self {
        Self {
            step,
            status,
            command: None,
            path: None,
            exit_code: None,
            error_code: None,
            error: None,
            reason: None,
            hints: Vec::new(),
        }
    }

    pub fn success(step: Step) -> Self {
        Self::new(step, StepStatus::Success)
    }

    pub fn failed(step: Step, err: &Error) -> Self {
        let mut result = Self::new(step, StepStatus::Failed);
        result.error_code = Some(err.code.as_str().to_string());
        result.error = Some(error_text(err));
        result.hints = err.hints.clone();
        result
    }

    pub fn skipped(step: Step, reason: impl Into<String>) -> Self {
        let mut result = Self::new(step, StepStatus::Skipped);
        result.reason = Some(reason.into());
        result
    }

    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = Some(command.into());
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_exit_code(mut self, exit_code: i32) -> Self {
        self.exit_code = Some(exit_code);
        self
    }
}

// IO and config errors keep the interesting part in details.
fn error_text(err: &Error) -> String {
    let detail = ["error", "problem"]
        .iter()
        .find_map(|key| err.details.get(*key).and_then(|v| v.as_str()));
    match detail {
        Some(detail) => format!("{}: {}", err.message, detail),
        None => err.message.clone(),
    }
}

fn failure_line(result: &StepResult) -> Option<String> {
    (result.status == StepStatus::Failed).then(|| {
        format!(
            "[release] {} failed: {}",
            result.step.as_str(),
            result.error.as_deref().unwrap_or("unknown error")
        )
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Success,
    PartialSuccess,
    Failed,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub total_steps: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
}

pub fn summarize(steps: &[StepResult]) -> RunSummary {
    let count = |status: StepStatus| steps.iter().filter(|s| s.status == status).count();
    RunSummary {
        total_steps: steps.len(),
        succeeded: count(StepStatus::Success),
        failed: count(StepStatus::Failed),
        skipped: count(StepStatus::Skipped),
    }
}

pub fn overall_status(summary: &RunSummary) -> RunStatus {
    if summary.failed == 0 {
        RunStatus::Success
    } else if summary.succeeded > 0 {
        RunStatus::PartialSuccess
    } else {
        RunStatus::Failed
    }
}

/// Collects step results in the order they happen.
#[derive(Debug, Default)]
pub struct StepLog {
    steps: Vec<StepResult>,
}

impl StepLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Failures always reach stderr, terminal or not; skips only on a terminal.
    pub fn record(&mut self, result: StepResult) {
        if let Some(line) = failure_line(&result) {
            eprintln!("{}", line);
        } else if result.status == StepStatus::Skipped {
            log_status!(
                "release",
                "{} skipped: {}",
                result.step.as_str(),
                result.reason.as_deref().unwrap_or("")
            );
        }
        self.steps.push(result);
    }

    pub fn into_steps(self) -> Vec<StepResult> {
        self.steps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_serializes_with_dotted_names() {
        let json = serde_json::to_value(Step::InterfaceClean).unwrap();
        assert_eq!(json, "interface.clean");
        assert_eq!(Step::InterfaceClean.as_str(), "interface.clean");
    }

    #[test]
    fn failed_result_carries_error_code_and_detail() {
        let err = Error::internal_io("permission denied", Some("teardown".to_string()));
        let result = StepResult::failed(Step::Teardown, &err);

        assert_eq!(result.status, StepStatus::Failed);
        assert_eq!(result.error_code.as_deref(), Some("internal.io_error"));
        assert_eq!(result.error.as_deref(), Some("IO error: permission denied"));
    }

    #[test]
    fn skipped_result_serializes_reason_not_error() {
        let json =
            serde_json::to_value(StepResult::skipped(Step::InterfaceClean, "install succeeded"))
                .unwrap();

        assert_eq!(json["status"], "skipped");
        assert_eq!(json["reason"], "install succeeded");
        assert!(json.get("error").is_none());
    }

    #[test]
    fn failure_line_only_for_failed_steps() {
        let failed = StepResult::failed(Step::Checkout, &Error::git_command_failed("bad tag"));
        assert_eq!(
            failure_line(&failed).as_deref(),
            Some("[release] checkout failed: bad tag")
        );
        assert!(failure_line(&StepResult::success(Step::Clone)).is_none());
        assert!(failure_line(&StepResult::skipped(Step::InterfaceClean, "ok")).is_none());
    }

    #[test]
    fn summary_counts_by_status() {
        let steps = vec![
            StepResult::success(Step::Clone),
            StepResult::failed(Step::Checkout, &Error::git_command_failed("bad tag")),
            StepResult::skipped(Step::InterfaceClean, "install succeeded"),
        ];
        let summary = summarize(&steps);

        assert_eq!(
            summary,
            RunSummary {
                total_steps: 3,
                succeeded: 1,
                failed: 1,
                skipped: 1,
            }
        );
        assert_eq!(overall_status(&summary), RunStatus::PartialSuccess);
    }

    #[test]
    fn all_failed_is_failed() {
        let steps = vec![StepResult::failed(
            Step::Clone,
            &Error::git_command_failed("unreachable"),
        )];
        assert_eq!(overall_status(&summarize(&steps)), RunStatus::Failed);
    }

    #[test]
    fn step_log_preserves_order() {
        let mut log = StepLog::new();
        log.record(StepResult::success(Step::Clone));
        log.record(StepResult::success(Step::Checkout));

        let order: Vec<Step> = log.into_steps().iter().map(|s| s.step).collect();
        assert_eq!(order, vec![Step::Clone, Step::Checkout]);
    }
}
