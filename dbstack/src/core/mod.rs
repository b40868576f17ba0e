//! Pure, deterministic logic shared by the stages.
//!
//! Core modules must be free of I/O side effects. They operate on in-memory
//! data structures and return deterministic outputs suitable for tests.

pub mod config;
pub mod poll;
pub mod stage;
