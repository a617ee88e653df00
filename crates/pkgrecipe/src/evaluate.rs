// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0

//! The evaluation pipeline, from version resolution to published package info.

use std::path::{Path, PathBuf};

use crate::acquire::{acquire_sources, AcquiredSources, SourcePolicy};
use crate::driver::{BuildDriver, DriverPaths};
use crate::options::OptionMatrix;
use crate::plan::{generate_plan, BuildPlan};
use crate::publish::{publish, write_package_info, PackageInfo};
use crate::recipe::{RecipeMetadata, RecipeSpec};
use crate::record::{package_id, EvaluationRecord};
use crate::runner::ToolRunner;
use crate::settings::Settings;
use crate::version::{resolve_version, VersionData, VersionMetadata};
use crate::worktree::WorkTree;
use crate::{Error, DEFAULT_OUTPUT_DIRNAME, PACKAGE_INFO_FILENAME, RECORD_FILENAME};

#[cfg(test)]
#[path = "./evaluate_test.rs"]
mod evaluate_test;

/// Everything the invoking environment decides for one evaluation.
///
/// Built once before the pipeline starts and only read afterwards.
#[derive(Debug, Clone)]
pub struct EvaluationConfig {
    pub settings: Settings,
    /// `name=value` option overrides, applied in order.
    pub option_overrides: Vec<(String, bool)>,
    pub requested_version: Option<String>,
    /// Overrides the recipe's `source.policy` when set.
    pub source_policy: Option<SourcePolicy>,
    /// Root for working trees, build trees and packages.
    /// Defaults to a directory next to the recipe.
    pub output_root: Option<PathBuf>,
}

impl EvaluationConfig {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            option_overrides: Vec::new(),
            requested_version: None,
            source_policy: None,
            output_root: None,
        }
    }

    pub fn effective_policy(&self, recipe: &RecipeSpec) -> SourcePolicy {
        self.source_policy.unwrap_or(recipe.source.policy)
    }

    pub fn output_root_for(&self, recipe: &RecipeSpec) -> crate::Result<PathBuf> {
        match &self.output_root {
            Some(root) => Ok(root.clone()),
            None => Ok(recipe.recipe_dir()?.join(DEFAULT_OUTPUT_DIRNAME)),
        }
    }

    /// Where an evaluation with this config publishes `preview`'s package.
    pub fn package_dir_for(
        &self,
        recipe: &RecipeSpec,
        preview: &EvaluationPreview,
    ) -> crate::Result<PathBuf> {
        let root = WorkTree::root_for(
            &self.output_root_for(recipe)?,
            &recipe.name,
            &preview.version.version,
        );
        Ok(root.join(&preview.plan.layout.package_dir))
    }

    /// Apply the overrides to the recipe's declared options.
    pub fn raw_options(&self, recipe: &RecipeSpec) -> crate::Result<OptionMatrix> {
        recipe.declared_options()?.with_overrides(
            self.option_overrides
                .iter()
                .map(|(name, value)| (name.as_str(), *value)),
        )
    }
}

/// The side-effect free part of an evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluationPreview {
    pub metadata: RecipeMetadata,
    pub version: VersionData,
    pub source_policy: SourcePolicy,
    pub options: OptionMatrix,
    pub plan: BuildPlan,
    pub package_id: String,
    pub package_info: PackageInfo,
}

impl EvaluationPreview {
    /// Whether evaluating would clone instead of using exported files.
    pub fn fetches_sources(&self) -> bool {
        crate::acquire::should_fetch(&self.version, self.source_policy)
    }
}

/// Compute what an evaluation would do, without touching the filesystem.
pub fn preview(
    recipe: &RecipeSpec,
    versions: &VersionMetadata,
    config: &EvaluationConfig,
) -> crate::Result<EvaluationPreview> {
    config.settings.validate()?;
    let raw_options = config.raw_options(recipe)?;
    let version = resolve_version(versions, config.requested_version.as_deref())?;
    let options = raw_options.prune(config.settings.os);
    let plan = generate_plan(&config.settings, &options);
    Ok(EvaluationPreview {
        metadata: recipe.metadata(),
        version,
        source_policy: config.effective_policy(recipe),
        package_id: package_id(&config.settings, &options),
        package_info: publish(&recipe.publish, &options),
        options,
        plan,
    })
}

/// The result of a successful evaluation.
#[derive(Debug, Clone)]
pub struct EvaluationOutcome {
    pub version: VersionData,
    pub sources: AcquiredSources,
    pub options: OptionMatrix,
    pub plan: BuildPlan,
    pub package_dir: PathBuf,
    pub package_id: String,
    pub package_info: PackageInfo,
    pub record_path: PathBuf,
}

/// Run a full evaluation.
///
/// Stages run strictly in order and the first failure ends the evaluation,
/// so package info is only published after install succeeds.
pub async fn evaluate<R: ToolRunner>(
    recipe: &RecipeSpec,
    versions: &VersionMetadata,
    config: &EvaluationConfig,
    driver: &BuildDriver,
    runner: &R,
) -> crate::Result<EvaluationOutcome> {
    config.settings.validate()?;
    let recipe_path = recipe.source_path.clone().ok_or_else(|| {
        Error::ValidationFailed("Cannot evaluate a recipe without source_path".to_string())
    })?;
    let raw_options = config.raw_options(recipe)?;
    tracing::info!(recipe = %recipe.name, "evaluating recipe");

    let version = resolve_version(versions, config.requested_version.as_deref())?;
    tracing::info!(version = %version.version, latest = version.is_latest, "resolved version");

    let output_root = prepare_output_root(&config.output_root_for(recipe)?)?;
    let work_tree = WorkTree::acquire(&output_root, &recipe.name, &version.version)?;
    let sources = acquire_sources(
        recipe,
        &version,
        config.effective_policy(recipe),
        &work_tree,
        &output_root,
        runner,
    )
    .await?;

    let options = raw_options.prune(config.settings.os);
    tracing::info!(
        options = ?options.to_map(),
        os = %config.settings.os,
        "effective options"
    );

    let plan = generate_plan(&config.settings, &options);
    let paths = DriverPaths::new(&plan, sources.source_dir(), work_tree.root());
    clear_published(&paths.package_dir)?;
    driver.run(&plan, &paths, runner).await?;

    let package_info = publish(&recipe.publish, &options);
    write_package_info(&package_info, &paths.package_dir)?;
    let record = EvaluationRecord::new(
        &recipe_path,
        &version.version,
        &config.settings,
        &options,
        &plan.layout,
        &package_info,
    )?;
    let record_path = record.write(&paths.package_dir)?;
    tracing::info!(
        package = %paths.package_dir.display(),
        alias = %package_info.build_system_alias,
        "published package info"
    );

    Ok(EvaluationOutcome {
        version,
        sources,
        options,
        package_id: record.package_id,
        plan,
        package_dir: paths.package_dir,
        package_info,
        record_path,
    })
}

/// Remove package info and records left by an earlier evaluation.
fn clear_published(package_dir: &Path) -> crate::Result<()> {
    for name in [PACKAGE_INFO_FILENAME, RECORD_FILENAME] {
        let path = package_dir.join(name);
        match std::fs::remove_file(&path) {
            Ok(()) => tracing::debug!(path = %path.display(), "removed stale package file"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(error) => return Err(Error::WriteFailed { path, error }),
        }
    }
    Ok(())
}

fn prepare_output_root(root: &Path) -> crate::Result<PathBuf> {
    let unusable = |e: std::io::Error| Error::AcquisitionFailed {
        location: root.display().to_string(),
        message: format!("cannot prepare output directory: {e}"),
    };
    std::fs::create_dir_all(root).map_err(unusable)?;
    dunce::canonicalize(root).map_err(unusable)
}
