// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0

//! A tool runner that records invocations instead of spawning processes.

use std::collections::HashSet;
use std::sync::Mutex;

use crate::runner::{Invocation, ToolOutput, ToolRunner};

#[derive(Debug, Default)]
pub struct RecordingRunner {
    calls: Mutex<Vec<Invocation>>,
    failing: HashSet<String>,
    unspawnable: HashSet<String>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make invocations whose first argument is `first_arg` exit non-zero.
    pub fn fail_on(mut self, first_arg: &str) -> Self {
        self.failing.insert(first_arg.to_string());
        self
    }

    /// Make `program` fail to start.
    pub fn missing_program(mut self, program: &str) -> Self {
        self.unspawnable.insert(program.to_string());
        self
    }

    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.lock().unwrap().clone()
    }

    /// First arguments of every recorded call, in order.
    pub fn steps(&self) -> Vec<String> {
        self.calls()
            .iter()
            .map(|c| c.args.first().cloned().unwrap_or_default())
            .collect()
    }
}

impl ToolRunner for RecordingRunner {
    async fn run(&self, invocation: &Invocation) -> std::io::Result<ToolOutput> {
        self.calls.lock().unwrap().push(invocation.clone());
        if self.unspawnable.contains(&invocation.program) {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{} not found", invocation.program),
            ));
        }
        let first = invocation.args.first().cloned().unwrap_or_default();
        if self.failing.contains(&first) {
            return Ok(ToolOutput {
                success: false,
                status: "exit status: 1".to_string(),
                stdout: String::new(),
                stderr: format!("error: {first} failed"),
            });
        }
        Ok(ToolOutput {
            success: true,
            status: "exit status: 0".to_string(),
            ..Default::default()
        })
    }
}
