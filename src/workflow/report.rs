//! Per-step outcomes of a workflow run.

use std::fmt;

use tracing::{info, warn};

use crate::error::DialError;

/// How a workflow step ended.
#[derive(Debug)]
pub enum StepStatus {
    /// The step finished; the string summarises its result
    Succeeded(String),
    /// The step failed; later independent steps still ran
    Failed(DialError),
    /// The step did not run because a prerequisite failed
    Skipped(String),
}

/// The outcome of a single named step.
#[derive(Debug)]
pub struct StepReport {
    /// Step name, e.g. `compare:gpt-4o-mini`
    pub name: String,
    /// How the step ended
    pub status: StepStatus,
}

impl StepReport {
    /// Whether the step succeeded.
    pub fn is_success(&self) -> bool {
        matches!(self.status, StepStatus::Succeeded(_))
    }
}

/// All steps of one workflow run, in execution order.
#[derive(Debug)]
pub struct WorkflowReport {
    /// Workflow name
    pub workflow: String,
    /// Step outcomes in the order they ran
    pub steps: Vec<StepReport>,
}

impl WorkflowReport {
    /// Starts an empty report.
    pub fn new(workflow: impl Into<String>) -> Self {
        Self {
            workflow: workflow.into(),
            steps: Vec::new(),
        }
    }

    /// Records the result of a step and logs it.
    pub fn record(&mut self, name: impl Into<String>, result: Result<String, DialError>) {
        let name = name.into();
        let status = match result {
            Ok(summary) => {
                info!(workflow = %self.workflow, step = %name, "{}", summary);
                StepStatus::Succeeded(summary)
            }
            Err(err) => {
                warn!(workflow = %self.workflow, step = %name, error = %err, "step failed");
                StepStatus::Failed(err)
            }
        };
        self.steps.push(StepReport { name, status });
    }

    /// Records a step that was not attempted.
    pub fn skip(&mut self, name: impl Into<String>, reason: impl Into<String>) {
        let name = name.into();
        let reason = reason.into();
        warn!(workflow = %self.workflow, step = %name, %reason, "step skipped");
        self.steps.push(StepReport {
            name,
            status: StepStatus::Skipped(reason),
        });
    }

    /// Looks up a step by name.
    pub fn step(&self, name: &str) -> Option<&StepReport> {
        self.steps.iter().find(|step| step.name == name)
    }

    /// Steps that succeeded.
    pub fn succeeded(&self) -> impl Iterator<Item = &StepReport> {
        self.steps.iter().filter(|step| step.is_success())
    }

    /// Steps that failed or were skipped.
    pub fn failed(&self) -> impl Iterator<Item = &StepReport> {
        self.steps.iter().filter(|step| !step.is_success())
    }

    /// Whether every step succeeded.
    pub fn is_success(&self) -> bool {
        self.steps.iter().all(StepReport::is_success)
    }
}

impl fmt::Display for WorkflowReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.workflow)?;
        writeln!(f, "{}", "=".repeat(80))?;
        for step in &self.steps {
            match &step.status {
                StepStatus::Succeeded(summary) => writeln!(f, "✅ {}: {}", step.name, summary)?,
                StepStatus::Failed(err) => writeln!(f, "❌ {}: {}", step.name, err)?,
                StepStatus::Skipped(reason) => {
                    writeln!(f, "⚠️  {}: skipped ({})", step.name, reason)?
                }
            }
        }
        write!(
            f,
            "{} of {} steps succeeded",
            self.succeeded().count(),
            self.steps.len()
        )
    }
}
