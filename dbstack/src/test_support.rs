//! Test-only fakes for the process, clock, and reporter seams.

use std::cell::RefCell;
use std::time::Duration;

use anyhow::{Result, anyhow};

use crate::core::config::StackConfig;
use crate::core::poll::Sleeper;
use crate::io::process::{CommandOutput, CommandRunner, CommandSpec};
use crate::report::{Level, Reporter};

/// Successful output carrying the given stdout.
pub fn ok_output(stdout: &str) -> CommandOutput {
    CommandOutput {
        success: true,
        exit_code: Some(0),
        stdout: stdout.as_bytes().to_vec(),
        stderr: Vec::new(),
        stdout_truncated: 0,
        stderr_truncated: 0,
        timed_out: false,
    }
}

/// Failed output (exit 1) carrying the given stderr.
pub fn failed_output(stderr: &str) -> CommandOutput {
    CommandOutput {
        success: false,
        exit_code: Some(1),
        stdout: Vec::new(),
        stderr: stderr.as_bytes().to_vec(),
        stdout_truncated: 0,
        stderr_truncated: 0,
        timed_out: false,
    }
}

enum Response {
    Output(CommandOutput),
    SpawnError,
}

struct Rule {
    needle: String,
    response: Response,
}

/// Scripted command runner.
///
/// Each invocation is matched against rules by substring of the rendered
/// command line; the first match wins, unmatched commands succeed with empty
/// output. Every command line is recorded for call-count assertions.
#[derive(Default)]
pub struct ScriptedRunner {
    rules: Vec<Rule>,
    calls: RefCell<Vec<String>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(mut self, needle: &str, output: CommandOutput) -> Self {
        self.rules.push(Rule {
            needle: needle.to_string(),
            response: Response::Output(output),
        });
        self
    }

    pub fn ok_on(self, needle: &str, stdout: &str) -> Self {
        self.respond(needle, ok_output(stdout))
    }

    pub fn fail_on(self, needle: &str, stderr: &str) -> Self {
        self.respond(needle, failed_output(stderr))
    }

    /// Matching commands fail to spawn, as a missing binary would.
    pub fn error_on(mut self, needle: &str) -> Self {
        self.rules.push(Rule {
            needle: needle.to_string(),
            response: Response::SpawnError,
        });
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    pub fn calls_matching(&self, needle: &str) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|line| line.contains(needle))
            .count()
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(&self, spec: &CommandSpec) -> Result<CommandOutput> {
        let line = spec.display();
        self.calls.borrow_mut().push(line.clone());
        for rule in &self.rules {
            if line.contains(&rule.needle) {
                return match &rule.response {
                    Response::Output(output) => Ok(output.clone()),
                    Response::SpawnError => Err(anyhow!("spawn failed: {line}")),
                };
            }
        }
        Ok(ok_output(""))
    }
}

/// Records requested sleeps instead of blocking.
#[derive(Debug, Default)]
pub struct RecordingSleeper {
    pub sleeps: Vec<Duration>,
}

impl Sleeper for RecordingSleeper {
    fn sleep(&mut self, interval: Duration) {
        self.sleeps.push(interval);
    }
}

/// Captures report lines for assertions.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    pub lines: Vec<(Level, String)>,
}

impl RecordingReporter {
    pub fn contains(&self, needle: &str) -> bool {
        self.lines.iter().any(|(_, message)| message.contains(needle))
    }

    pub fn contains_at(&self, level: Level, needle: &str) -> bool {
        self.lines
            .iter()
            .any(|(line_level, message)| *line_level == level && message.contains(needle))
    }
}

impl Reporter for RecordingReporter {
    fn line(&mut self, level: Level, message: &str) {
        self.lines.push((level, message.to_string()));
    }
}

/// Default stack shrunk to test-friendly budgets: 10 ms probe intervals, two
/// attempts, and a scripts dir inside the project root.
pub fn fast_config() -> StackConfig {
    let mut cfg = StackConfig::default();
    cfg.scripts_dir = "db-scripts".into();
    for service in &mut cfg.services {
        service.probe.interval_ms = 10;
        service.probe.attempts = 2;
        service.probe.timeout_secs = 1;
    }
    cfg
}
