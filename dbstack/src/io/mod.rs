//! Side-effecting adapters used by the stages.

pub mod docker;
pub mod env_file;
pub mod process;
