//! Verification stage: one re-probe per service plus row/document counts.
//!
//! This is the authoritative "did setup succeed" signal. Failures are
//! reported, never retried or remediated.

use std::time::Duration;

use anyhow::{Result, anyhow};

use crate::core::config::{ServiceConfig, StackConfig};
use crate::core::stage::{Stage, StageReport};
use crate::io::docker::Docker;
use crate::io::process::CommandRunner;
use crate::report::Reporter;

const COUNT_TIMEOUT: Duration = Duration::from_secs(15);

pub fn run_verify(
    cfg: &StackConfig,
    runner: &dyn CommandRunner,
    reporter: &mut dyn Reporter,
) -> StageReport {
    let mut report = StageReport::passed(Stage::Verify);
    let docker = Docker::new(runner, &cfg.compose_file);

    for service in &cfg.services {
        let probe = service.engine.probe_argv();
        let responsive = docker
            .exec(&service.container, &probe, None, service.probe.timeout())
            .map(|out| out.success)
            .unwrap_or(false);
        if !responsive {
            reporter.error(&format!("{}: not responding", service.name));
            report.soft_fail(format!("{} unreachable", service.name));
            continue;
        }

        let mut all_counted = true;
        for target in service.engine.count_targets() {
            match count(&docker, service, &target) {
                Ok(count) => {
                    reporter.info(&format!("{}: {target} = {count}", service.name));
                    report.note(format!("{}.{target} = {count}", service.name));
                }
                Err(err) => {
                    all_counted = false;
                    reporter.warn(&format!(
                        "{}: count for {target} failed: {err:#}",
                        service.name
                    ));
                    report.soft_fail(format!("{} count failed for {target}", service.name));
                }
            }
        }
        if all_counted {
            reporter.success(&format!("{} verified", service.name));
        }
    }
    report
}

fn count(docker: &Docker<'_>, service: &ServiceConfig, target: &str) -> Result<i64> {
    let argv = service.engine.count_argv(target);
    let out = docker.exec(&service.container, &argv, None, COUNT_TIMEOUT)?;
    if !out.success {
        return Err(anyhow!("query failed: {}", out.stderr_text().trim()));
    }
    let text = out.stdout_text();
    let trimmed = text.trim();
    trimmed
        .parse()
        .map_err(|_| anyhow!("unexpected count output {trimmed:?}"))
}
