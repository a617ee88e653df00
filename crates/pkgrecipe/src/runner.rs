// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0

//! Execution of external tools (git, cmake).

use std::future::Future;
use std::path::PathBuf;
use std::process::Stdio;

#[cfg(test)]
#[path = "./runner_test.rs"]
mod runner_test;

/// Environment variable naming the git executable.
pub const GIT_ENV: &str = "PKGRECIPE_GIT";

/// Environment variable naming the cmake executable.
pub const CMAKE_ENV: &str = "PKGRECIPE_CMAKE";

/// How much of a failing tool's stderr is kept in error messages.
const STDERR_TAIL_LINES: usize = 20;

/// One external command to run to completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub current_dir: Option<PathBuf>,
}

impl Invocation {
    pub fn new<S: Into<String>>(program: S) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            current_dir: None,
        }
    }

    pub fn arg<S: Into<String>>(mut self, arg: S) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.current_dir = Some(dir.into());
        self
    }
}

impl std::fmt::Display for Invocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Captured result of a finished command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOutput {
    pub success: bool,
    pub status: String,
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    /// The last lines of stderr, for error reporting.
    pub fn stderr_tail(&self) -> String {
        let lines: Vec<&str> = self.stderr.trim_end().lines().collect();
        let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
        lines[start..].join("\n")
    }
}

/// Runs external tools on behalf of the acquirer and driver.
///
/// An `Err` means the tool could not be started at all; a tool that ran and
/// failed is reported through [`ToolOutput::success`].
pub trait ToolRunner {
    fn run(
        &self,
        invocation: &Invocation,
    ) -> impl Future<Output = std::io::Result<ToolOutput>> + Send;
}

/// Runs tools as child processes and waits for each one to exit.
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner;

impl ToolRunner for ProcessRunner {
    async fn run(&self, invocation: &Invocation) -> std::io::Result<ToolOutput> {
        tracing::debug!(command = %invocation, "running");
        let mut cmd = tokio::process::Command::new(&invocation.program);
        cmd.args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = &invocation.current_dir {
            cmd.current_dir(dir);
        }

        let output = cmd.output().await?;
        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        for line in stdout.lines() {
            tracing::trace!(program = %invocation.program, "{line}");
        }

        Ok(ToolOutput {
            success: output.status.success(),
            status: output.status.to_string(),
            stdout,
            stderr,
        })
    }
}

/// The git program, honoring [`GIT_ENV`].
pub fn git_program() -> String {
    std::env::var(GIT_ENV).unwrap_or_else(|_| "git".to_string())
}

/// The cmake program, honoring [`CMAKE_ENV`].
pub fn cmake_program() -> String {
    std::env::var(CMAKE_ENV).unwrap_or_else(|_| "cmake".to_string())
}
