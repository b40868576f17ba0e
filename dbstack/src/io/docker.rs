//! Docker CLI adapter.
//!
//! The stack assumes exclusive control of a fixed set of container names, so
//! we keep a small, explicit wrapper around `docker` subprocess calls instead
//! of scattering argv strings through the stages.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use tracing::{debug, instrument};

use super::process::{CommandOutput, CommandRunner, CommandSpec};

/// Budget for container lifecycle operations (rm, compose up).
const LIFECYCLE_TIMEOUT: Duration = Duration::from_secs(180);

/// Wrapper for executing docker commands against one compose file.
pub struct Docker<'a> {
    runner: &'a dyn CommandRunner,
    compose_file: &'a Path,
}

impl<'a> Docker<'a> {
    pub fn new(runner: &'a dyn CommandRunner, compose_file: &'a Path) -> Self {
        Self {
            runner,
            compose_file,
        }
    }

    /// Force-remove a container. "No such container" is not an error.
    #[instrument(skip_all, fields(container))]
    pub fn remove_container(&self, container: &str) -> Result<()> {
        let spec =
            CommandSpec::new("docker", LIFECYCLE_TIMEOUT).args(["rm", "-f", container]);
        let out = self.runner.run(&spec).context("docker rm")?;
        if !out.success {
            debug!(container, stderr = %out.stderr_text().trim(), "nothing to remove");
        }
        Ok(())
    }

    /// `docker compose up -d` for the named services. Failure is fatal to the
    /// run and carries the orchestrator's stderr.
    #[instrument(skip_all)]
    pub fn compose_up(&self, services: &[&str]) -> Result<()> {
        let spec = CommandSpec::new("docker", LIFECYCLE_TIMEOUT)
            .args(["compose", "-f"])
            .arg(self.compose_file.display().to_string())
            .args(["up", "-d"])
            .args(services.iter().copied());
        let out = self.runner.run(&spec).context("docker compose up")?;
        if !out.success {
            return Err(anyhow!(
                "docker compose up failed: {}",
                out.stderr_text().trim()
            ));
        }
        debug!(services = services.len(), "compose up finished");
        Ok(())
    }

    /// Run a command inside a container, optionally piping `stdin`.
    pub fn exec(
        &self,
        container: &str,
        argv: &[String],
        stdin: Option<Vec<u8>>,
        timeout: Duration,
    ) -> Result<CommandOutput> {
        let mut spec = CommandSpec::new("docker", timeout);
        spec = if stdin.is_some() {
            spec.args(["exec", "-i", container])
        } else {
            spec.args(["exec", container])
        };
        spec = spec.args(argv.iter().cloned());
        if let Some(input) = stdin {
            spec = spec.with_stdin(input);
        }
        self.runner
            .run(&spec)
            .with_context(|| format!("docker exec {container}"))
    }
}
