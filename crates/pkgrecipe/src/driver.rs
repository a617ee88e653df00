// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0

//! Configure, build and install through the underlying build system.

use std::path::{Path, PathBuf};

use crate::plan::BuildPlan;
use crate::runner::{cmake_program, Invocation, ToolRunner};
use crate::Error;

#[cfg(test)]
#[path = "./driver_test.rs"]
mod driver_test;

/// One step of a build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Configure,
    Build,
    Install,
}

impl Phase {
    pub const ORDER: [Phase; 3] = [Phase::Configure, Phase::Build, Phase::Install];
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Configure => f.write_str("configure"),
            Phase::Build => f.write_str("build"),
            Phase::Install => f.write_str("install"),
        }
    }
}

/// Absolute directories for one driver run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverPaths {
    pub source_dir: PathBuf,
    pub build_dir: PathBuf,
    pub toolchain_file: PathBuf,
    pub package_dir: PathBuf,
}

impl DriverPaths {
    /// Resolve the plan's layout against `root`, usually a [`WorkTree`] root.
    ///
    /// [`WorkTree`]: crate::WorkTree
    pub fn new(plan: &BuildPlan, source_dir: &Path, root: &Path) -> Self {
        Self {
            source_dir: source_dir.to_path_buf(),
            build_dir: root.join(&plan.layout.build_dir),
            toolchain_file: root.join(plan.layout.toolchain_file()),
            package_dir: root.join(&plan.layout.package_dir),
        }
    }
}

/// Executes a [`BuildPlan`] with cmake.
#[derive(Debug, Clone)]
pub struct BuildDriver {
    cmake: String,
}

impl Default for BuildDriver {
    fn default() -> Self {
        Self::new(cmake_program())
    }
}

impl BuildDriver {
    pub fn new<S: Into<String>>(cmake: S) -> Self {
        Self {
            cmake: cmake.into(),
        }
    }

    /// The command for `phase`.
    pub fn invocation(&self, phase: Phase, plan: &BuildPlan, paths: &DriverPaths) -> Invocation {
        let config = plan
            .variables
            .get(crate::plan::BUILD_TYPE)
            .map(|v| v.render());
        let cmd = Invocation::new(&self.cmake);
        let cmd = match phase {
            Phase::Configure => cmd
                .arg("-S")
                .arg(paths.source_dir.display().to_string())
                .arg("-B")
                .arg(paths.build_dir.display().to_string())
                .arg(format!(
                    "-DCMAKE_TOOLCHAIN_FILE={}",
                    paths.toolchain_file.display()
                ))
                .arg(format!(
                    "-DCMAKE_INSTALL_PREFIX={}",
                    paths.package_dir.display()
                ))
                .args(plan.define_args()),
            Phase::Build => cmd
                .arg("--build")
                .arg(paths.build_dir.display().to_string())
                .args(config.into_iter().flat_map(|c| ["--config".to_string(), c])),
            Phase::Install => cmd
                .arg("--install")
                .arg(paths.build_dir.display().to_string())
                .args(config.into_iter().flat_map(|c| ["--config".to_string(), c]))
                .arg("--prefix")
                .arg(paths.package_dir.display().to_string()),
        };
        cmd.current_dir(&paths.source_dir)
    }

    /// Run configure, build and install in order, stopping at the first failure.
    pub async fn run<R: ToolRunner>(
        &self,
        plan: &BuildPlan,
        paths: &DriverPaths,
        runner: &R,
    ) -> crate::Result<()> {
        write_toolchain(plan, &paths.toolchain_file)?;

        for phase in Phase::ORDER {
            tracing::info!(%phase, "running build phase");
            let invocation = self.invocation(phase, plan, paths);
            let output = runner
                .run(&invocation)
                .await
                .map_err(|e| Error::PhaseFailed {
                    phase,
                    status: "not started".to_string(),
                    stderr: format!("failed to run {}: {e}", self.cmake),
                })?;
            if !output.success {
                return Err(Error::PhaseFailed {
                    phase,
                    status: output.status.clone(),
                    stderr: output.stderr_tail(),
                });
            }
        }
        Ok(())
    }
}

fn write_toolchain(plan: &BuildPlan, path: &Path) -> crate::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| Error::WriteFailed {
            path: parent.to_path_buf(),
            error: e,
        })?;
    }
    std::fs::write(path, plan.toolchain_script()).map_err(|e| Error::WriteFailed {
        path: path.to_path_buf(),
        error: e,
    })
}
