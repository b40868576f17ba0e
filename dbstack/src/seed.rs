//! Seeding stage: idempotent script execution with a single-shot fallback.
//!
//! A datastore that already holds data is skipped. Otherwise the external
//! seed script is piped into the engine CLI; for engines that declare a
//! fallback, a failed script triggers exactly one embedded insert so the
//! environment stays minimally usable. All failures here are soft.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use tracing::debug;

use crate::core::config::{SeedPlan, ServiceConfig, StackConfig};
use crate::core::stage::{Stage, StageReport};
use crate::io::docker::Docker;
use crate::io::process::CommandRunner;
use crate::report::Reporter;

const SEED_TIMEOUT: Duration = Duration::from_secs(120);
const COUNT_TIMEOUT: Duration = Duration::from_secs(15);

pub fn run_seed(
    root: &Path,
    cfg: &StackConfig,
    runner: &dyn CommandRunner,
    reporter: &mut dyn Reporter,
) -> StageReport {
    let mut report = StageReport::passed(Stage::Seed);
    let docker = Docker::new(runner, &cfg.compose_file);

    for service in &cfg.services {
        seed_service(root, cfg, &docker, service, reporter, &mut report);
    }
    report
}

fn seed_service(
    root: &Path,
    cfg: &StackConfig,
    docker: &Docker<'_>,
    service: &ServiceConfig,
    reporter: &mut dyn Reporter,
    report: &mut StageReport,
) {
    let Some(plan) = service.engine.seed_plan() else {
        reporter.info(&format!("{}: no seed step", service.name));
        return;
    };

    if let Some(count) = seeded_count(docker, service)
        && count > 0
    {
        reporter.info(&format!(
            "{}: already seeded ({count} rows/documents), skipping",
            service.name
        ));
        report.note(format!("{} already seeded", service.name));
        return;
    }

    let script_path = root.join(&cfg.scripts_dir).join(&plan.script);
    match run_script(docker, service, &plan, &script_path) {
        Ok(()) => {
            reporter.success(&format!(
                "{} seeded from {}",
                service.name,
                plan.script.display()
            ));
            report.note(format!("{} seeded", service.name));
            return;
        }
        Err(err) => {
            reporter.warn(&format!("{}: seed script failed: {err:#}", service.name));
        }
    }

    // One fallback attempt, never retried.
    match &plan.fallback {
        Some(fallback) => {
            let outcome = docker.exec(
                &service.container,
                &fallback.argv,
                Some(fallback.script.clone().into_bytes()),
                SEED_TIMEOUT,
            );
            match outcome {
                Ok(out) if out.success => {
                    reporter.warn(&format!(
                        "{}: seeded from embedded fallback data",
                        service.name
                    ));
                    report.note(format!("{} seeded via fallback", service.name));
                }
                Ok(out) => {
                    reporter.error(&format!(
                        "{}: fallback seeding failed: {}",
                        service.name,
                        out.stderr_text().trim()
                    ));
                    report.soft_fail(format!("{} seeding failed", service.name));
                }
                Err(err) => {
                    reporter.error(&format!(
                        "{}: fallback seeding failed: {err:#}",
                        service.name
                    ));
                    report.soft_fail(format!("{} seeding failed", service.name));
                }
            }
        }
        None => report.soft_fail(format!("{} seeding failed", service.name)),
    }
}

/// Count in the first expected table/collection, or `None` when the query
/// cannot run (missing schema counts as unseeded).
fn seeded_count(docker: &Docker<'_>, service: &ServiceConfig) -> Option<i64> {
    let target = service.engine.count_targets().into_iter().next()?;
    let argv = service.engine.count_argv(&target);
    let out = docker
        .exec(&service.container, &argv, None, COUNT_TIMEOUT)
        .ok()?;
    if !out.success {
        debug!(service = %service.name, target, "seed check query failed, treating as unseeded");
        return None;
    }
    out.stdout_text().trim().parse().ok()
}

fn run_script(
    docker: &Docker<'_>,
    service: &ServiceConfig,
    plan: &SeedPlan,
    script_path: &Path,
) -> Result<()> {
    let contents = fs::read(script_path)
        .with_context(|| format!("read seed script {}", script_path.display()))?;
    let out = docker.exec(&service.container, &plan.argv, Some(contents), SEED_TIMEOUT)?;
    if !out.success {
        return Err(anyhow!(
            "exit {:?}: {}",
            out.exit_code,
            out.stderr_text().trim()
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::stage::StageStatus;
    use crate::test_support::{RecordingReporter, ScriptedRunner, fast_config};

    fn write_scripts(root: &Path) {
        fs::create_dir_all(root.join("db-scripts/postgres")).expect("mkdir");
        fs::create_dir_all(root.join("db-scripts/mongo")).expect("mkdir");
        fs::write(
            root.join("db-scripts/postgres/init.sql"),
            "CREATE TABLE users (id serial);\n",
        )
        .expect("sql");
        fs::write(
            root.join("db-scripts/mongo/init.js"),
            "db.users.insertOne({name: 'ada'});\n",
        )
        .expect("js");
    }

    #[test]
    fn positive_count_skips_seeding_entirely() {
        let temp = tempfile::tempdir().expect("tempdir");
        write_scripts(temp.path());
        let cfg = fast_config();
        let runner = ScriptedRunner::new()
            .ok_on("SELECT count(*)", "5")
            .ok_on("countDocuments", "3");
        let mut reporter = RecordingReporter::default();

        let report = run_seed(temp.path(), &cfg, &runner, &mut reporter);

        assert_eq!(report.status, StageStatus::Passed);
        // skip path: zero seed invocations
        assert_eq!(runner.calls_matching("ON_ERROR_STOP"), 0);
        let mongo_shells =
            runner.calls_matching("mongosh") - runner.calls_matching("countDocuments");
        assert_eq!(mongo_shells, 0);
        assert!(reporter.contains("already seeded"));
    }

    #[test]
    fn unseeded_postgres_runs_the_script_once() {
        let temp = tempfile::tempdir().expect("tempdir");
        write_scripts(temp.path());
        let cfg = fast_config();
        // empty count output parses as nothing -> unseeded
        let runner = ScriptedRunner::new().ok_on("countDocuments", "1");
        let mut reporter = RecordingReporter::default();

        let report = run_seed(temp.path(), &cfg, &runner, &mut reporter);

        assert_eq!(report.status, StageStatus::Passed);
        assert_eq!(runner.calls_matching("ON_ERROR_STOP"), 1);
        assert!(reporter.contains("postgres seeded from"));
    }

    #[test]
    fn missing_mongo_script_falls_back_exactly_once() {
        let temp = tempfile::tempdir().expect("tempdir");
        // no scripts dir at all: primary tier fails before any exec
        let cfg = fast_config();
        let runner = ScriptedRunner::new()
            .ok_on("SELECT count(*)", "5")
            .ok_on("countDocuments", "0");
        let mut reporter = RecordingReporter::default();

        let report = run_seed(temp.path(), &cfg, &runner, &mut reporter);

        // fallback succeeded, so the stage stays passed with a note
        assert_eq!(report.status, StageStatus::Passed);
        let fallback_calls =
            runner.calls_matching("mongosh") - runner.calls_matching("countDocuments");
        assert_eq!(fallback_calls, 1);
        assert!(reporter.contains("embedded fallback data"));
    }

    #[test]
    fn failing_mongo_script_gets_one_fallback_then_soft_fails() {
        let temp = tempfile::tempdir().expect("tempdir");
        write_scripts(temp.path());
        let mut cfg = fast_config();
        cfg.services.retain(|service| service.name == "mongo");
        // every mongo shell invocation fails: primary tier and the single fallback
        let runner = ScriptedRunner::new()
            .ok_on("countDocuments", "0")
            .fail_on("mongosh", "auth failed");
        let mut reporter = RecordingReporter::default();

        let report = run_seed(temp.path(), &cfg, &runner, &mut reporter);

        assert_eq!(report.status, StageStatus::Degraded);
        let shell_calls =
            runner.calls_matching("mongosh") - runner.calls_matching("countDocuments");
        // primary + exactly one fallback, never more
        assert_eq!(shell_calls, 2);
    }

    #[test]
    fn failed_postgres_seed_is_soft_with_no_fallback() {
        let temp = tempfile::tempdir().expect("tempdir");
        write_scripts(temp.path());
        let mut cfg = fast_config();
        cfg.services.retain(|service| service.name == "postgres");
        let runner = ScriptedRunner::new().fail_on("ON_ERROR_STOP", "syntax error");
        let mut reporter = RecordingReporter::default();

        let report = run_seed(temp.path(), &cfg, &runner, &mut reporter);

        assert_eq!(report.status, StageStatus::Degraded);
        assert_eq!(runner.calls_matching("ON_ERROR_STOP"), 1);
    }

    #[test]
    fn redis_has_no_seed_step() {
        let temp = tempfile::tempdir().expect("tempdir");
        let mut cfg = fast_config();
        cfg.services.retain(|service| service.name == "redis");
        let runner = ScriptedRunner::new();
        let mut reporter = RecordingReporter::default();

        let report = run_seed(temp.path(), &cfg, &runner, &mut reporter);

        assert_eq!(report.status, StageStatus::Passed);
        assert_eq!(runner.calls_matching("redis-cli"), 0);
        assert!(reporter.contains("no seed step"));
    }
}
