//! Shared utilities

pub mod config;
pub mod context;
pub mod fs;
pub mod process;
pub mod shell;

pub use config::Config;
pub use context::RunContext;
pub use process::{CommandRunner, ProcessBuilder, SystemRunner};
pub use shell::Shell;
