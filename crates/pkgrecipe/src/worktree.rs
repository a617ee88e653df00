// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0

//! Exclusively held working tree for one evaluation.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use fs4::fs_std::FileExt;

use crate::Error;

#[cfg(test)]
#[path = "./worktree_test.rs"]
mod worktree_test;

const LOCK_FILENAME: &str = ".lock";
const SOURCE_DIRNAME: &str = "src";

/// A working tree locked against concurrent evaluations.
///
/// The lock is released when the value is dropped.
#[derive(Debug)]
pub struct WorkTree {
    root: PathBuf,
    _lock: File,
}

impl WorkTree {
    /// Lock the working tree for `name`/`version` under `output_root`.
    pub fn acquire(output_root: &Path, name: &str, version: &str) -> crate::Result<Self> {
        Self::acquire_at(Self::root_for(output_root, name, version))
    }

    /// Where the working tree for `name`/`version` lives under `output_root`.
    ///
    /// Sources, build trees and packages of one version all live below it.
    pub fn root_for(output_root: &Path, name: &str, version: &str) -> PathBuf {
        output_root
            .join("work")
            .join(format!("{}-{}", sanitize(name), sanitize(version)))
    }

    /// Lock the working tree rooted at `root`.
    pub fn acquire_at<P: Into<PathBuf>>(root: P) -> crate::Result<Self> {
        let root = root.into();
        let acquisition_error = |e: std::io::Error| Error::AcquisitionFailed {
            location: root.display().to_string(),
            message: format!("cannot prepare working tree: {e}"),
        };

        std::fs::create_dir_all(&root).map_err(acquisition_error)?;
        let lock = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(root.join(LOCK_FILENAME))
            .map_err(acquisition_error)?;

        match lock.try_lock_exclusive() {
            Ok(true) => {
                tracing::debug!(path = %root.display(), "working tree locked");
                Ok(Self { root, _lock: lock })
            }
            Ok(false) => Err(Error::WorkTreeBusy(root)),
            Err(e) => Err(acquisition_error(e)),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Where acquired sources live.
    pub fn source_dir(&self) -> PathBuf {
        self.root.join(SOURCE_DIRNAME)
    }

    /// Remove sources left by a previous evaluation.
    pub fn clear_sources(&self) -> crate::Result<()> {
        let src = self.source_dir();
        if src.exists() {
            tracing::debug!(path = %src.display(), "removing stale sources");
            std::fs::remove_dir_all(&src).map_err(|e| Error::AcquisitionFailed {
                location: src.display().to_string(),
                message: format!("cannot remove stale sources: {e}"),
            })?;
        }
        Ok(())
    }
}

fn sanitize(component: &str) -> String {
    component
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect()
}
