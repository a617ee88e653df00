// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0

//! pkgrecipe - Package Recipe Evaluator
//!
//! This crate provides the core library for evaluating declarative package
//! recipes (`recipe.yaml`) into a CMake build plan and the package info that
//! consuming recipes link against.
//!
//! # Overview
//!
//! An evaluation runs a fixed sequence of stages: the version is resolved
//! from `versions.yaml`, sources are exported from the recipe directory or
//! cloned at a checkout reference, the declared options are pruned for the
//! target os, a build plan is generated and executed with cmake, and finally
//! the package info for the selected linkage is published.
//!
//! # Example
//!
//! ```yaml
//! # recipe.yaml
//! api: recipe/v0
//! name: tauutils
//! license: MIT
//! url: https://github.com/hyfloac/TauUtils
//!
//! options:
//!   shared: true
//!   fPIC: true
//!   genTest: false
//!
//! exports_sources:
//!   - CMakeLists.txt
//!   - TauUtilsDynamic/*
//!
//! publish:
//!   shared:
//!     libs: [tauutils-dynamic-shared]
//!     alias: tauutils::TauUtilsDynamicShared
//!   static:
//!     libs: [tauutils-dynamic-static]
//!     alias: tauutils::TauUtilsDynamicStatic
//! ```

pub mod acquire;
pub mod driver;
pub mod error;
pub mod evaluate;
pub mod options;
pub mod plan;
pub mod profile;
pub mod publish;
pub mod recipe;
pub mod record;
pub mod runner;
pub mod settings;
#[cfg(test)]
mod test_runner;
pub mod version;
pub mod worktree;

pub use acquire::{acquire_sources, AcquiredSources, SourcePolicy};
pub use driver::{BuildDriver, DriverPaths, Phase};
pub use error::{Error, ErrorKind, Result};
pub use evaluate::{evaluate, preview, EvaluationConfig, EvaluationOutcome, EvaluationPreview};
pub use options::{Linkage, OptionMatrix, OptionName};
pub use plan::{generate_plan, BuildPlan, Layout, PlanValue};
pub use profile::Profile;
pub use publish::{publish, PackageInfo, PublishTable};
pub use recipe::{locate_recipe, RecipeMetadata, RecipeSpec};
pub use record::{package_id, verify_record, EvaluationRecord, RecordChange, RecordChangeKind};
pub use runner::{Invocation, ProcessRunner, ToolOutput, ToolRunner};
pub use settings::{BuildType, Os, Settings};
pub use version::{resolve_version, VersionData, VersionMetadata};
pub use worktree::WorkTree;

/// Well-known filename for recipes.
pub const RECIPE_FILENAME: &str = "recipe.yaml";

/// Well-known filename for version metadata, next to the recipe.
pub const VERSIONS_FILENAME: &str = "versions.yaml";

/// Well-known filename for published package info.
pub const PACKAGE_INFO_FILENAME: &str = "package-info.yaml";

/// Well-known filename for evaluation records.
pub const RECORD_FILENAME: &str = "evaluation.yaml";

/// Output directory created next to the recipe when none is given.
pub const DEFAULT_OUTPUT_DIRNAME: &str = ".pkgrecipe";
