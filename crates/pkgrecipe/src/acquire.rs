// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0

//! Source acquisition: exported recipe files or a clone at a checkout reference.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use glob::{MatchOptions, Pattern};
use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use crate::recipe::RecipeSpec;
use crate::runner::{git_program, Invocation, ToolRunner};
use crate::version::VersionData;
use crate::worktree::WorkTree;
use crate::Error;

#[cfg(test)]
#[path = "./acquire_test.rs"]
mod acquire_test;

const EXPORT_MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

/// When sources are fetched instead of taken from the recipe directory.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum SourcePolicy {
    /// Latest uses exported files, pinned versions are cloned.
    #[default]
    ByVersion,
    /// Always use exported files, even for pinned versions.
    Exported,
}

impl FromStr for SourcePolicy {
    type Err = Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s {
            "by-version" => Ok(Self::ByVersion),
            "exported" => Ok(Self::Exported),
            other => Err(Error::ValidationFailed(format!(
                "Unknown source policy '{other}' (expected by-version or exported)"
            ))),
        }
    }
}

impl std::fmt::Display for SourcePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ByVersion => f.write_str("by-version"),
            Self::Exported => f.write_str("exported"),
        }
    }
}

/// Where the build will find its sources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcquiredSources {
    /// The recipe directory is used in place.
    RecipeDir { source_dir: PathBuf },
    /// Exported files were copied into the working tree.
    Exported { source_dir: PathBuf, files: usize },
    /// A repository was cloned and checked out.
    Cloned {
        source_dir: PathBuf,
        url: String,
        reference: String,
    },
}

impl AcquiredSources {
    pub fn source_dir(&self) -> &Path {
        match self {
            Self::RecipeDir { source_dir }
            | Self::Exported { source_dir, .. }
            | Self::Cloned { source_dir, .. } => source_dir,
        }
    }
}

/// Whether this version and policy call for a remote fetch.
pub fn should_fetch(version: &VersionData, policy: SourcePolicy) -> bool {
    match policy {
        SourcePolicy::ByVersion => !version.is_latest,
        SourcePolicy::Exported => false,
    }
}

/// Make the sources for `version` available in the working tree.
///
/// `exclude` is skipped while exporting so output directories that live
/// under the recipe directory are never copied into themselves.
pub async fn acquire_sources<R: ToolRunner>(
    recipe: &RecipeSpec,
    version: &VersionData,
    policy: SourcePolicy,
    work_tree: &WorkTree,
    exclude: &Path,
    runner: &R,
) -> crate::Result<AcquiredSources> {
    version.validate()?;

    if should_fetch(version, policy) {
        let url = version.source_url.as_deref().unwrap_or_default();
        let reference = version.checkout_target.as_deref().unwrap_or_default();
        return clone_and_checkout(url, reference, work_tree, runner).await;
    }

    let recipe_dir = recipe.recipe_dir()?;
    if recipe.exports_sources.is_empty() {
        tracing::info!(path = %recipe_dir.display(), "using recipe directory as sources");
        return Ok(AcquiredSources::RecipeDir {
            source_dir: recipe_dir.to_path_buf(),
        });
    }

    work_tree.clear_sources()?;
    let source_dir = work_tree.source_dir();
    let files = export_sources(recipe_dir, &recipe.exports_sources, &source_dir, &[exclude])?;
    tracing::info!(files, path = %source_dir.display(), "exported recipe sources");
    Ok(AcquiredSources::Exported { source_dir, files })
}

/// Clone `url` into the working tree and check out `reference`.
pub async fn clone_and_checkout<R: ToolRunner>(
    url: &str,
    reference: &str,
    work_tree: &WorkTree,
    runner: &R,
) -> crate::Result<AcquiredSources> {
    if reference.starts_with('-') {
        return Err(Error::InvalidReference {
            reference: reference.to_string(),
            message: "references may not begin with '-'".to_string(),
        });
    }

    work_tree.clear_sources()?;
    let source_dir = work_tree.source_dir();

    tracing::info!(%url, "cloning sources");
    let clone = Invocation::new(git_program())
        .args(["clone", "--", url])
        .arg(source_dir.display().to_string())
        .current_dir(work_tree.root());
    let output = runner
        .run(&clone)
        .await
        .map_err(|e| Error::AcquisitionFailed {
            location: url.to_string(),
            message: format!("failed to run git: {e}"),
        })?;
    if !output.success {
        return Err(Error::AcquisitionFailed {
            location: url.to_string(),
            message: format!("git clone exited with {}: {}", output.status, output.stderr_tail()),
        });
    }

    tracing::info!(%reference, "checking out");
    let checkout = Invocation::new(git_program())
        .args(["checkout", reference, "--"])
        .current_dir(&source_dir);
    let output = runner
        .run(&checkout)
        .await
        .map_err(|e| Error::InvalidReference {
            reference: reference.to_string(),
            message: format!("failed to run git: {e}"),
        })?;
    if !output.success {
        return Err(Error::InvalidReference {
            reference: reference.to_string(),
            message: output.stderr_tail(),
        });
    }

    Ok(AcquiredSources::Cloned {
        source_dir,
        url: url.to_string(),
        reference: reference.to_string(),
    })
}

/// Copy files under `recipe_dir` matching `patterns` into `dest`.
///
/// Returns the number of files copied. Relative paths are preserved.
pub fn export_sources(
    recipe_dir: &Path,
    patterns: &[String],
    dest: &Path,
    exclude: &[&Path],
) -> crate::Result<usize> {
    let compiled = patterns
        .iter()
        .map(|p| {
            Pattern::new(p).map_err(|e| {
                Error::ValidationFailed(format!("Invalid exports_sources pattern '{p}': {e}"))
            })
        })
        .collect::<crate::Result<Vec<_>>>()?;
    let mut matched = vec![false; compiled.len()];
    let mut files = 0;

    let walker = WalkDir::new(recipe_dir)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            let path = entry.path();
            entry.file_name() != ".git" && !exclude.iter().any(|ex| path.starts_with(ex))
        });

    for entry in walker {
        let entry = entry.map_err(|e| export_error(recipe_dir, e.to_string()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(recipe_dir) else {
            continue;
        };
        let relative_str = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        let mut hit = false;
        for (i, pattern) in compiled.iter().enumerate() {
            if pattern.matches_with(&relative_str, EXPORT_MATCH_OPTIONS) {
                matched[i] = true;
                hit = true;
            }
        }
        if !hit {
            continue;
        }

        let target = dest.join(relative);
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| export_error(parent, e.to_string()))?;
        }
        std::fs::copy(entry.path(), &target)
            .map_err(|e| export_error(entry.path(), e.to_string()))?;
        files += 1;
    }

    for (pattern, hit) in patterns.iter().zip(matched) {
        if !hit {
            tracing::warn!(%pattern, "exports_sources pattern matched no files");
        }
    }

    Ok(files)
}

fn export_error(path: &Path, message: String) -> Error {
    Error::AcquisitionFailed {
        location: path.display().to_string(),
        message,
    }
}
