// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0

//! Evaluation records written next to a built package.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::options::{OptionMatrix, OptionName};
use crate::plan::Layout;
use crate::publish::PackageInfo;
use crate::settings::Settings;
use crate::{Error, RECORD_FILENAME};

#[cfg(test)]
#[path = "./record_test.rs"]
mod record_test;

/// Record file API version.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub enum RecordApiVersion {
    #[serde(rename = "recipe/v0/record")]
    V0,
}

/// Metadata about when and where the record was generated.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct GenerationMetadata {
    pub timestamp: DateTime<Utc>,
    pub pkgrecipe_version: String,
    pub hostname: String,
}

/// The recipe file an evaluation was made from.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct RecipeFile {
    pub path: PathBuf,
    pub sha256: String,
}

/// Inputs and outputs of one successful evaluation.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct EvaluationRecord {
    pub api: RecordApiVersion,
    pub generated: GenerationMetadata,
    pub recipe: RecipeFile,
    pub version: String,
    pub settings: Settings,
    pub options: BTreeMap<OptionName, bool>,
    pub package_id: String,
    pub layout: Layout,
    pub package_info: PackageInfo,
}

/// Identity of one binary configuration: settings plus effective options.
pub fn package_id(settings: &Settings, options: &OptionMatrix) -> String {
    let mut canonical = String::new();
    canonical.push_str("[settings]\n");
    canonical.push_str(&format!("arch={}\n", settings.arch));
    canonical.push_str(&format!("build_type={}\n", settings.build_type));
    canonical.push_str(&format!("compiler={}\n", settings.compiler));
    canonical.push_str(&format!("os={}\n", settings.os));
    canonical.push_str("[options]\n");
    for (name, value) in options.iter() {
        canonical.push_str(&format!("{name}={value}\n"));
    }
    format!("{:x}", Sha256::digest(canonical.as_bytes()))
}

/// Hash a file's contents.
pub fn hash_file(path: &Path) -> crate::Result<String> {
    let content = std::fs::read(path).map_err(|e| Error::ReadFailed {
        path: path.to_path_buf(),
        error: e,
    })?;
    Ok(format!("{:x}", Sha256::digest(&content)))
}

impl EvaluationRecord {
    /// Build a record stamped with the current time and host.
    pub fn new(
        recipe_path: &Path,
        version: &str,
        settings: &Settings,
        options: &OptionMatrix,
        layout: &Layout,
        package_info: &PackageInfo,
    ) -> crate::Result<Self> {
        Ok(Self {
            api: RecordApiVersion::V0,
            generated: GenerationMetadata {
                timestamp: Utc::now(),
                pkgrecipe_version: env!("CARGO_PKG_VERSION").to_string(),
                hostname: hostname::get()
                    .ok()
                    .and_then(|h| h.into_string().ok())
                    .unwrap_or_else(|| "unknown".to_string()),
            },
            recipe: RecipeFile {
                path: recipe_path.to_path_buf(),
                sha256: hash_file(recipe_path)?,
            },
            version: version.to_string(),
            settings: settings.clone(),
            options: options.to_map(),
            package_id: package_id(settings, options),
            layout: layout.clone(),
            package_info: package_info.clone(),
        })
    }

    /// Write the record into `package_dir`.
    pub fn write(&self, package_dir: &Path) -> crate::Result<PathBuf> {
        let path = package_dir.join(RECORD_FILENAME);
        let yaml = serde_yaml::to_string(self).map_err(|e| Error::WriteFailed {
            path: path.clone(),
            error: std::io::Error::other(e),
        })?;
        std::fs::write(&path, yaml).map_err(|e| Error::WriteFailed {
            path: path.clone(),
            error: e,
        })?;
        Ok(path)
    }

    /// Load a record previously written into `package_dir`.
    pub fn load(package_dir: &Path) -> crate::Result<Self> {
        let path = package_dir.join(RECORD_FILENAME);
        if !path.is_file() {
            return Err(Error::NotFoundAtPath {
                what: "Evaluation record",
                path,
            });
        }
        let yaml = std::fs::read_to_string(&path).map_err(|e| Error::ReadFailed {
            path: path.clone(),
            error: e,
        })?;
        serde_yaml::from_str(&yaml).map_err(|e| Error::InvalidYaml {
            what: "evaluation record",
            error: e,
            yaml_content: yaml,
        })
    }
}

/// The current inputs a record is compared against.
#[derive(Debug, Clone)]
pub struct CurrentState<'a> {
    pub recipe_path: &'a Path,
    pub version: &'a str,
    pub settings: &'a Settings,
    pub options: &'a OptionMatrix,
    pub package_info: &'a PackageInfo,
}

/// Compare a record with the current inputs.
pub fn verify_record(
    record: &EvaluationRecord,
    current: &CurrentState<'_>,
) -> crate::Result<Vec<RecordChange>> {
    let mut changes = Vec::new();

    let actual_hash = hash_file(current.recipe_path)?;
    if actual_hash != record.recipe.sha256 {
        changes.push(RecordChange {
            kind: RecordChangeKind::RecipeChanged,
            reference: current.recipe_path.display().to_string(),
            expected: Some(record.recipe.sha256.clone()),
            actual: Some(actual_hash),
        });
    }

    if current.version != record.version {
        changes.push(RecordChange {
            kind: RecordChangeKind::VersionChanged,
            reference: "version".to_string(),
            expected: Some(record.version.clone()),
            actual: Some(current.version.to_string()),
        });
    }

    let actual_id = package_id(current.settings, current.options);
    if actual_id != record.package_id {
        changes.push(RecordChange {
            kind: RecordChangeKind::PackageIdChanged,
            reference: "package_id".to_string(),
            expected: Some(record.package_id.clone()),
            actual: Some(actual_id),
        });
    }

    if current.package_info != &record.package_info {
        changes.push(RecordChange {
            kind: RecordChangeKind::PackageInfoChanged,
            reference: "package_info".to_string(),
            expected: Some(describe_package_info(&record.package_info)),
            actual: Some(describe_package_info(current.package_info)),
        });
    }

    Ok(changes)
}

fn describe_package_info(info: &PackageInfo) -> String {
    format!("{} [{}]", info.build_system_alias, info.library_names.join(", "))
}

/// A single detected change between a record and the current inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordChange {
    pub kind: RecordChangeKind,
    pub reference: String,
    pub expected: Option<String>,
    pub actual: Option<String>,
}

/// Types of record mismatches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordChangeKind {
    RecipeChanged,
    VersionChanged,
    PackageIdChanged,
    PackageInfoChanged,
}
