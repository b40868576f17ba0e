//! Readiness stage: per-service bounded polling.
//!
//! A service that never becomes ready is a soft failure: the timeout is
//! recorded and the run continues, so the verify stage can still produce a
//! full status report.

use tracing::warn;

use crate::core::config::StackConfig;
use crate::core::poll::{PollPolicy, Sleeper, poll_until_ready};
use crate::core::stage::{Stage, StageReport};
use crate::io::docker::Docker;
use crate::io::process::CommandRunner;
use crate::report::Reporter;

pub fn run_ready(
    cfg: &StackConfig,
    runner: &dyn CommandRunner,
    sleeper: &mut dyn Sleeper,
    reporter: &mut dyn Reporter,
) -> StageReport {
    let mut report = StageReport::passed(Stage::Ready);
    let docker = Docker::new(runner, &cfg.compose_file);

    for service in &cfg.services {
        let policy = PollPolicy {
            attempts: service.probe.attempts,
            interval: service.probe.interval(),
        };
        let argv = service.engine.probe_argv();

        let outcome = poll_until_ready(policy, sleeper, |attempt| {
            match docker.exec(&service.container, &argv, None, service.probe.timeout()) {
                Ok(out) => out.success,
                Err(err) => {
                    warn!(service = %service.name, attempt, err = %format!("{err:#}"), "probe error");
                    false
                }
            }
        });

        if outcome.ready {
            reporter.success(&format!(
                "{} ready after {} attempt(s)",
                service.name, outcome.attempts
            ));
            report.note(format!("{} ready", service.name));
        } else {
            reporter.error(&format!(
                "{} not ready after {} attempts, continuing",
                service.name, outcome.attempts
            ));
            report.soft_fail(format!("{} readiness timed out", service.name));
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::stage::StageStatus;
    use crate::test_support::{RecordingReporter, RecordingSleeper, ScriptedRunner, fast_config};
    use std::time::Duration;

    #[test]
    fn healthy_services_pass_on_the_first_attempt() {
        let cfg = fast_config();
        let runner = ScriptedRunner::new();
        let mut sleeper = RecordingSleeper::default();
        let mut reporter = RecordingReporter::default();

        let report = run_ready(&cfg, &runner, &mut sleeper, &mut reporter);

        assert_eq!(report.status, StageStatus::Passed);
        assert!(sleeper.sleeps.is_empty());
        assert_eq!(runner.calls_matching("pg_isready"), 1);
        assert_eq!(runner.calls_matching("redis-cli ping"), 1);
    }

    #[test]
    fn timeout_is_soft_and_polling_continues_to_other_services() {
        let cfg = fast_config();
        let runner = ScriptedRunner::new().fail_on("pg_isready", "no response");
        let mut sleeper = RecordingSleeper::default();
        let mut reporter = RecordingReporter::default();

        let report = run_ready(&cfg, &runner, &mut sleeper, &mut reporter);

        assert_eq!(report.status, StageStatus::Degraded);
        assert!(report.notes.iter().any(|note| note.contains("postgres")));
        // full budget consumed for the failing service only
        assert_eq!(
            runner.calls_matching("pg_isready"),
            cfg.services[0].probe.attempts as usize
        );
        // the other services were still polled
        assert_eq!(runner.calls_matching("redis-cli ping"), 1);
        assert!(reporter.contains("not ready after 2 attempts"));
    }

    #[test]
    fn sleeps_use_the_configured_interval() {
        let mut cfg = fast_config();
        cfg.services.truncate(1);
        cfg.services[0].probe.attempts = 3;
        cfg.services[0].probe.interval_ms = 250;
        let runner = ScriptedRunner::new().fail_on("pg_isready", "starting");
        let mut sleeper = RecordingSleeper::default();
        let mut reporter = RecordingReporter::default();

        run_ready(&cfg, &runner, &mut sleeper, &mut reporter);
        assert_eq!(sleeper.sleeps, vec![Duration::from_millis(250); 2]);
    }

    #[test]
    fn probe_spawn_errors_count_as_not_ready() {
        let mut cfg = fast_config();
        cfg.services.truncate(1);
        let runner = ScriptedRunner::new().error_on("exec dev-postgres");
        let mut sleeper = RecordingSleeper::default();
        let mut reporter = RecordingReporter::default();

        let report = run_ready(&cfg, &runner, &mut sleeper, &mut reporter);
        assert_eq!(report.status, StageStatus::Degraded);
    }
}
