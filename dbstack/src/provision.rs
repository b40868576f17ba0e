//! Container lifecycle: clear stale containers, then start the stack.
//!
//! There is no rollback. A compose failure aborts the run with the
//! orchestrator's error.

use anyhow::Result;
use tracing::info;

use crate::core::config::StackConfig;
use crate::io::docker::Docker;
use crate::io::process::CommandRunner;
use crate::report::Reporter;

pub fn run_provision(
    cfg: &StackConfig,
    runner: &dyn CommandRunner,
    reporter: &mut dyn Reporter,
) -> Result<()> {
    let docker = Docker::new(runner, &cfg.compose_file);

    for service in &cfg.services {
        docker.remove_container(&service.container)?;
        reporter.info(&format!("cleared stale container {}", service.container));
    }

    let names: Vec<&str> = cfg
        .services
        .iter()
        .map(|service| service.service.as_str())
        .collect();
    docker.compose_up(&names)?;
    info!(services = names.len(), "containers started");
    reporter.success("containers started");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{RecordingReporter, ScriptedRunner, fast_config};

    #[test]
    fn removes_stale_containers_before_compose_up() {
        let cfg = fast_config();
        let runner = ScriptedRunner::new();
        let mut reporter = RecordingReporter::default();

        run_provision(&cfg, &runner, &mut reporter).expect("provision");

        let calls = runner.calls();
        let first_up = calls
            .iter()
            .position(|line| line.contains("compose"))
            .expect("compose invoked");
        let last_rm = calls
            .iter()
            .rposition(|line| line.contains("rm -f"))
            .expect("rm invoked");
        assert!(last_rm < first_up);
        assert_eq!(runner.calls_matching("rm -f"), cfg.services.len());
        assert!(reporter.contains("containers started"));
    }

    #[test]
    fn compose_failure_is_fatal() {
        let cfg = fast_config();
        let runner = ScriptedRunner::new().fail_on("compose", "no such file: docker-compose.yml");
        let mut reporter = RecordingReporter::default();

        let err = run_provision(&cfg, &runner, &mut reporter).unwrap_err();
        assert!(format!("{err:#}").contains("no such file"));
    }

    #[test]
    fn compose_up_names_every_service() {
        let cfg = fast_config();
        let runner = ScriptedRunner::new();
        let mut reporter = RecordingReporter::default();

        run_provision(&cfg, &runner, &mut reporter).expect("provision");
        assert_eq!(runner.calls_matching("up -d postgres mongo redis"), 1);
    }
}
