//! Test doubles for rocpack unit tests.
//!
//! [`MockRunner`] stands in for `debuild`, `rpmbuild` and the rpath tool.
//! It records every command it is asked to run, answers with canned
//! outputs, and can drop files on disk to simulate a packager producing its
//! output.
//!
//! # Example
//!
//! ```rust,ignore
//! let runner = MockRunner::new();
//! runner.expect(
//!     CommandPattern::Tool("debuild".into()),
//!     MockProcessOutput::success("").creating(deb_root.join("hip7.1.0_amd64.deb")),
//! );
//! ```

pub mod fixtures;

use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{bail, Result};

use crate::util::process::{CommandOutput, CommandRunner, ProcessBuilder};

pub use fixtures::{PackagingFixture, FIXTURE_CATALOG};

/// Canned output of a mocked command.
#[derive(Debug, Clone)]
pub struct MockProcessOutput {
    /// Exit status code (0 = success).
    pub status: i32,
    /// Standard output.
    pub stdout: String,
    /// Standard error.
    pub stderr: String,
    /// Files written when the command "runs".
    pub creates: Vec<PathBuf>,
}

impl MockProcessOutput {
    /// Create a successful output with the given stdout.
    pub fn success(stdout: impl Into<String>) -> Self {
        MockProcessOutput {
            status: 0,
            stdout: stdout.into(),
            stderr: String::new(),
            creates: Vec::new(),
        }
    }

    /// Create a failure output with the given stderr and status code.
    pub fn failure(status: i32, stderr: impl Into<String>) -> Self {
        MockProcessOutput {
            status,
            stdout: String::new(),
            stderr: stderr.into(),
            creates: Vec::new(),
        }
    }

    /// Write an (empty) file at `path` when the command runs.
    pub fn creating(mut self, path: impl Into<PathBuf>) -> Self {
        self.creates.push(path.into());
        self
    }
}

/// Pattern for matching commands in [`MockRunner`].
#[derive(Debug, Clone)]
pub enum CommandPattern {
    /// Match if the tool name (program file name) equals this.
    Tool(String),
    /// Match any command.
    Any,
}

impl CommandPattern {
    /// Check if this pattern matches the given command.
    pub fn matches(&self, cmd: &ProcessBuilder) -> bool {
        match self {
            CommandPattern::Tool(tool) => cmd.tool_name() == *tool,
            CommandPattern::Any => true,
        }
    }
}

/// A command the mock was asked to run.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    /// Full command line.
    pub command: String,
    /// Working directory, if one was set.
    pub cwd: Option<PathBuf>,
}

/// Mock command runner.
#[derive(Debug, Default)]
pub struct MockRunner {
    expectations: Mutex<Vec<(CommandPattern, MockProcessOutput)>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockRunner {
    /// Create a new mock runner with no expectations.
    pub fn new() -> Self {
        MockRunner::default()
    }

    /// A runner that answers every command successfully.
    pub fn succeeding() -> Self {
        let runner = MockRunner::new();
        runner.expect(CommandPattern::Any, MockProcessOutput::success(""));
        runner
    }

    /// Answer commands matching `pattern` with `output`.
    ///
    /// Expectations are checked in the order they were added.
    pub fn expect(&self, pattern: CommandPattern, output: MockProcessOutput) -> &Self {
        if let Ok(mut expectations) = self.expectations.lock() {
            expectations.push((pattern, output));
        }
        self
    }

    /// Get all commands that were run.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Get the command lines that were run.
    pub fn commands(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.command).collect()
    }
}

impl CommandRunner for MockRunner {
    fn run(&self, cmd: &ProcessBuilder) -> Result<CommandOutput> {
        let command = cmd.display_command();
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(RecordedCall {
                command: command.clone(),
                cwd: cmd.get_cwd().map(|p| p.to_path_buf()),
            });
        }

        let matched = self.expectations.lock().ok().and_then(|expectations| {
            expectations
                .iter()
                .find(|(pattern, _)| pattern.matches(cmd))
                .map(|(_, output)| output.clone())
        });

        let Some(output) = matched else {
            bail!("unexpected command: {}", command);
        };

        for path in &output.creates {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, b"")?;
        }

        Ok(CommandOutput {
            code: Some(output.status),
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_runner() {
        let runner = MockRunner::new();
        runner
            .expect(
                CommandPattern::Tool("rpmbuild".into()),
                MockProcessOutput::failure(1, "bad spec"),
            )
            .expect(CommandPattern::Any, MockProcessOutput::success("ok"));

        let out = runner
            .run(&ProcessBuilder::new("/usr/bin/rpmbuild").arg("-ba"))
            .unwrap();
        assert_eq!(out.code, Some(1));
        assert_eq!(out.stderr, "bad spec");

        let out = runner.run(&ProcessBuilder::new("debuild")).unwrap();
        assert!(out.success());

        assert_eq!(runner.commands(), ["/usr/bin/rpmbuild -ba", "debuild"]);
    }

    #[test]
    fn test_unexpected_command() {
        let runner = MockRunner::new();
        assert!(runner.run(&ProcessBuilder::new("debuild")).is_err());
        assert_eq!(runner.calls().len(), 1);
    }
}
