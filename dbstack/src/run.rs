//! End-to-end orchestration.
//!
//! Sequences the stages and owns the failure policy in one place: preflight
//! and container start abort the run (`Err`), everything later lands on the
//! returned [`RunReport`] as a soft failure and the final summary always
//! prints. The resulting state machine:
//!
//! ```text
//! Start → Preflight → (fail: Abort) | Provisioning → Polling → Seeding → Verifying → Done
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use crate::core::config::StackConfig;
use crate::core::poll::Sleeper;
use crate::core::stage::{RunReport, Stage, StageReport};
use crate::io::env_file::{self, MaterializeOutcome};
use crate::io::process::CommandRunner;
use crate::preflight::run_preflight;
use crate::provision::run_provision;
use crate::ready::run_ready;
use crate::report::{Reporter, next_steps};
use crate::seed::run_seed;
use crate::verify::run_verify;

/// Execute every stage in order against one stack configuration.
pub fn run_stack(
    root: &Path,
    cfg: &StackConfig,
    runner: &dyn CommandRunner,
    sleeper: &mut dyn Sleeper,
    reporter: &mut dyn Reporter,
) -> Result<RunReport> {
    let mut run = RunReport::default();

    reporter.info("checking prerequisites");
    run_preflight(root, cfg, runner, reporter).context("preflight")?;
    run.push(StageReport::passed(Stage::Preflight));

    reporter.info("materializing configuration files");
    run.push(materialize_stage(root, cfg, reporter));

    reporter.info("starting containers");
    run_provision(cfg, runner, reporter).context("start containers")?;
    run.push(StageReport::passed(Stage::Provision));

    reporter.info("waiting for services");
    run.push(run_ready(cfg, runner, sleeper, reporter));

    reporter.info("seeding datastores");
    run.push(run_seed(root, cfg, runner, reporter));

    reporter.info("verifying");
    run.push(run_verify(cfg, runner, reporter));

    print_summary(cfg, &run, reporter);
    info!(degraded = run.is_degraded(), "run finished");
    Ok(run)
}

fn materialize_stage(root: &Path, cfg: &StackConfig, reporter: &mut dyn Reporter) -> StageReport {
    let mut report = StageReport::passed(Stage::Materialize);
    for spec in env_file::file_specs(root, cfg) {
        match env_file::materialize(&spec) {
            Ok(MaterializeOutcome::Created) => {
                reporter.success(&format!("created {}", spec.path.display()));
                report.note(format!("created {}", spec.path.display()));
            }
            Ok(MaterializeOutcome::AlreadyExists) => {
                reporter.info(&format!(
                    "{} already exists, left untouched",
                    spec.path.display()
                ));
            }
            Err(err) => {
                reporter.error(&format!("could not write {}: {err:#}", spec.path.display()));
                report.soft_fail(format!("write failed for {}", spec.path.display()));
            }
        }
    }
    report
}

fn print_summary(cfg: &StackConfig, run: &RunReport, reporter: &mut dyn Reporter) {
    for line in next_steps(cfg).lines() {
        reporter.info(line);
    }
    if run.is_degraded() {
        let stages: Vec<&str> = run
            .degraded_stages()
            .iter()
            .map(|stage| stage.as_str())
            .collect();
        reporter.warn(&format!(
            "setup completed with failures in: {}",
            stages.join(", ")
        ));
    } else {
        reporter.success("stack is ready");
    }
}
