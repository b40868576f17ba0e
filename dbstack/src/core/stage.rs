//! Stage reports aggregated across one run.
//!
//! Every stage returns an explicit result instead of signalling through
//! process exit codes; the orchestrator collects them into a [`RunReport`]
//! that decides the final exit status in one place.

use crate::exit_codes;

/// Pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Preflight,
    Materialize,
    Provision,
    Ready,
    Seed,
    Verify,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Preflight => "preflight",
            Stage::Materialize => "materialize",
            Stage::Provision => "provision",
            Stage::Ready => "ready",
            Stage::Seed => "seed",
            Stage::Verify => "verify",
        }
    }
}

/// Soft-fail classification for a completed stage.
///
/// Hard failures never produce a report: they abort the run as errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageStatus {
    Passed,
    Degraded,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageReport {
    pub stage: Stage,
    pub status: StageStatus,
    pub notes: Vec<String>,
}

impl StageReport {
    pub fn passed(stage: Stage) -> Self {
        Self {
            stage,
            status: StageStatus::Passed,
            notes: Vec::new(),
        }
    }

    /// Record an informational note without changing the status.
    pub fn note(&mut self, note: impl Into<String>) {
        self.notes.push(note.into());
    }

    /// Record a failure note and downgrade the stage to `Degraded`.
    pub fn soft_fail(&mut self, note: impl Into<String>) {
        self.notes.push(note.into());
        self.status = StageStatus::Degraded;
    }
}

/// All stage reports for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub stages: Vec<StageReport>,
}

impl RunReport {
    pub fn push(&mut self, report: StageReport) {
        self.stages.push(report);
    }

    pub fn degraded_stages(&self) -> Vec<Stage> {
        self.stages
            .iter()
            .filter(|report| report.status == StageStatus::Degraded)
            .map(|report| report.stage)
            .collect()
    }

    pub fn is_degraded(&self) -> bool {
        !self.degraded_stages().is_empty()
    }

    pub fn exit_code(&self) -> i32 {
        if self.is_degraded() {
            exit_codes::DEGRADED
        } else {
            exit_codes::OK
        }
    }
}
