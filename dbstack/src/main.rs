//! Bootstrap a local database stack.
//!
//! One pass: preflight checks, generated configuration files, Docker Compose
//! container start, readiness polling, seeding, verification, and a final
//! next-steps summary.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use dbstack::core::config::load_config;
use dbstack::core::poll::ThreadSleeper;
use dbstack::exit_codes;
use dbstack::io::process::SystemRunner;
use dbstack::logging;
use dbstack::report::ConsoleReporter;
use dbstack::run::run_stack;

#[derive(Parser)]
#[command(
    name = "dbstack",
    version,
    about = "Bootstrap local PostgreSQL, MongoDB and Redis containers"
)]
struct Cli {
    /// Alternate stack configuration (default: ./dbstack.toml, built-in
    /// defaults when the file is missing).
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() {
    logging::init();
    install_interrupt_hint();
    let code = match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{err:#}");
            exit_codes::FATAL
        }
    };
    std::process::exit(code);
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    let root = std::env::current_dir().context("resolve working directory")?;
    let config_path = cli.config.unwrap_or_else(|| root.join("dbstack.toml"));
    let cfg = load_config(&config_path)?;

    let runner = SystemRunner::default();
    let mut sleeper = ThreadSleeper;
    let mut reporter = ConsoleReporter;
    let run = run_stack(&root, &cfg, &runner, &mut sleeper, &mut reporter)?;
    Ok(run.exit_code())
}

fn install_interrupt_hint() {
    // No partial-state rollback: containers keep whatever state they reached.
    let handler = || {
        eprintln!("interrupted; containers may still be starting. re-run `dbstack` to resume.");
        std::process::exit(exit_codes::FATAL);
    };
    if let Err(err) = ctrlc::set_handler(handler) {
        tracing::warn!(err = %err, "could not install interrupt handler");
    }
}
