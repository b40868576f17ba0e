//! Stable exit codes for the dbstack CLI.

/// Every stage completed without failures.
pub const OK: i32 = 0;
/// Preflight or container start failed, the run was interrupted, or an
/// internal error occurred before the final report.
pub const FATAL: i32 = 1;
/// The run reached the final report but at least one stage soft-failed.
pub const DEGRADED: i32 = 2;
