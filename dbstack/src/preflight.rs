//! Prerequisite checks: required tools and sibling directories.
//!
//! Read-only. Nothing is written or started before this stage passes, and a
//! failure aborts the run.

use std::path::Path;
use std::time::Duration;

use anyhow::{Result, anyhow};
use tracing::debug;

use crate::core::config::StackConfig;
use crate::io::process::{CommandRunner, CommandSpec};
use crate::report::Reporter;

const TOOL_CHECK_TIMEOUT: Duration = Duration::from_secs(10);

/// Verify every configured tool responds and every required directory exists.
///
/// All failures are collected first so the operator sees the complete list in
/// one error instead of fixing dependencies one at a time.
pub fn run_preflight(
    root: &Path,
    cfg: &StackConfig,
    runner: &dyn CommandRunner,
    reporter: &mut dyn Reporter,
) -> Result<()> {
    let mut missing: Vec<String> = Vec::new();

    for tool in &cfg.tools {
        let Some(program) = tool.command.first() else {
            continue;
        };
        let label = tool.command.join(" ");
        let spec = CommandSpec::new(program, TOOL_CHECK_TIMEOUT)
            .args(tool.command.iter().skip(1).cloned());
        match runner.run(&spec) {
            Ok(out) if out.success => {
                debug!(tool = %label, "tool check passed");
                reporter.info(&format!("found: {label}"));
            }
            Ok(_) => missing.push(format!("tool check failed: {label}")),
            Err(_) => missing.push(format!("missing tool: {program}")),
        }
    }

    for dir in cfg.required_dirs() {
        let path = root.join(dir);
        if path.is_dir() {
            reporter.info(&format!("found: {}", path.display()));
        } else {
            missing.push(format!("missing directory: {}", path.display()));
        }
    }

    if missing.is_empty() {
        reporter.success("preflight passed");
        return Ok(());
    }
    for item in &missing {
        reporter.error(item);
    }
    Err(anyhow!("preflight failed:\n- {}", missing.join("\n- ")))
}
