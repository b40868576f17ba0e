//! Local database stack bootstrapper.
//!
//! This crate drives a strictly sequential setup pipeline for a development
//! database stack (PostgreSQL, MongoDB, Redis) managed through Docker Compose:
//! preflight checks, generated configuration files, container start, readiness
//! polling, seeding, and verification. The architecture enforces a strict
//! separation:
//!
//! - **[`core`]**: Pure, deterministic logic (configuration, retry policy,
//!   stage reports). No I/O, fully testable in isolation.
//! - **[`io`]**: Side-effecting operations (child processes, docker,
//!   generated files). Isolated behind trait seams to enable fakes in tests.
//!
//! Stage modules ([`preflight`], [`provision`], [`ready`], [`seed`],
//! [`verify`]) coordinate core logic with I/O; [`run`] sequences them and
//! owns the soft-fail/hard-fail policy.

pub mod core;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod preflight;
pub mod provision;
pub mod ready;
pub mod report;
pub mod run;
pub mod seed;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
pub mod verify;
