// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0

//! Recipe file parsing and data types for recipe.yaml files.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::acquire::SourcePolicy;
use crate::options::{OptionMatrix, OptionName};
use crate::publish::PublishTable;
use crate::version::VersionMetadata;
use crate::{Error, VERSIONS_FILENAME};

#[cfg(test)]
#[path = "./recipe_test.rs"]
mod recipe_test;

/// API version for recipe files.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub enum ApiVersion {
    #[default]
    #[serde(rename = "recipe/v0")]
    V0,
}

/// Helper for two-stage deserialization to determine API version first.
#[derive(Deserialize)]
struct ApiVersionMapping {
    #[serde(default)]
    api: ApiVersion,
}

/// Descriptive metadata, fixed once the recipe is loaded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RecipeMetadata {
    pub name: String,
    pub license: String,
    pub author: String,
    pub url: String,
    pub description: String,
}

/// Source acquisition settings for the recipe.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct SourceSection {
    #[serde(default)]
    pub policy: SourcePolicy,
}

/// Main recipe specification from a recipe.yaml file.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RecipeSpec {
    /// API version identifier.
    pub api: ApiVersion,

    pub name: String,

    #[serde(default)]
    pub license: String,

    #[serde(default)]
    pub author: String,

    #[serde(default)]
    pub url: String,

    #[serde(default)]
    pub description: String,

    /// Declared options and their defaults.
    #[serde(default)]
    pub options: BTreeMap<OptionName, bool>,

    /// Glob patterns, relative to the recipe, of files that ship with it.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exports_sources: Vec<String>,

    #[serde(default)]
    pub source: SourceSection,

    /// Published names per linkage mode.
    pub publish: PublishTable,

    /// Path to the file this was loaded from (not serialized).
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl RecipeSpec {
    /// Parse recipe from YAML string.
    pub fn from_yaml<S: Into<String>>(yaml: S) -> crate::Result<Self> {
        let yaml = yaml.into();
        let invalid = |e, yaml: &str| Error::InvalidYaml {
            what: "recipe.yaml file",
            error: e,
            yaml_content: yaml.to_string(),
        };

        // Stage 1: Parse to get API version
        let value: serde_yaml::Value = serde_yaml::from_str(&yaml).map_err(|e| invalid(e, &yaml))?;
        let with_version: ApiVersionMapping =
            serde_yaml::from_value(value.clone()).map_err(|e| invalid(e, &yaml))?;

        // Stage 2: Deserialize based on version
        let spec: Self = match with_version.api {
            ApiVersion::V0 => serde_yaml::from_value(value).map_err(|e| invalid(e, &yaml))?,
        };
        spec.validate()?;
        Ok(spec)
    }

    /// Load recipe from file path.
    pub fn load<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(Error::NotFoundAtPath {
                what: "recipe.yaml",
                path: path.to_path_buf(),
            });
        }
        let yaml = std::fs::read_to_string(path).map_err(|e| Error::ReadFailed {
            path: path.to_path_buf(),
            error: e,
        })?;

        let mut spec = Self::from_yaml(yaml)?;
        spec.source_path = Some(dunce::canonicalize(path).map_err(|e| Error::ReadFailed {
            path: path.to_path_buf(),
            error: e,
        })?);
        Ok(spec)
    }

    /// Validate recipe after parsing.
    pub fn validate(&self) -> crate::Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::ValidationFailed(
                "Recipe name must not be empty".to_string(),
            ));
        }
        if !self
            .name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        {
            return Err(Error::ValidationFailed(format!(
                "Recipe name '{}' may only contain letters, digits, '-', '_' and '.'",
                self.name
            )));
        }
        OptionMatrix::from_declared(&self.options)?;
        self.publish.validate()?;
        for pattern in &self.exports_sources {
            glob::Pattern::new(pattern).map_err(|e| {
                Error::ValidationFailed(format!("Invalid exports_sources pattern '{pattern}': {e}"))
            })?;
            if Path::new(pattern).is_absolute() || pattern.split('/').any(|part| part == "..") {
                return Err(Error::ValidationFailed(format!(
                    "exports_sources pattern '{pattern}' must stay inside the recipe directory"
                )));
            }
        }
        Ok(())
    }

    pub fn metadata(&self) -> RecipeMetadata {
        RecipeMetadata {
            name: self.name.clone(),
            license: self.license.clone(),
            author: self.author.clone(),
            url: self.url.clone(),
            description: self.description.clone(),
        }
    }

    /// The raw option matrix holding the declared defaults.
    pub fn declared_options(&self) -> crate::Result<OptionMatrix> {
        OptionMatrix::from_declared(&self.options)
    }

    /// Directory containing the recipe file.
    pub fn recipe_dir(&self) -> crate::Result<&Path> {
        self.source_path
            .as_ref()
            .and_then(|p| p.parent())
            .ok_or_else(|| {
                Error::ValidationFailed(
                    "Cannot locate recipe directory without source_path".to_string(),
                )
            })
    }

    /// Load the version metadata that sits next to the recipe.
    pub fn load_versions(&self) -> crate::Result<VersionMetadata> {
        VersionMetadata::load(self.recipe_dir()?.join(VERSIONS_FILENAME))
    }
}

/// Find the recipe file for a path that is either the file or its directory.
pub fn locate_recipe<P: AsRef<Path>>(path: P) -> crate::Result<PathBuf> {
    let path = path.as_ref();
    let candidate = if path.is_dir() {
        path.join(crate::RECIPE_FILENAME)
    } else {
        path.to_path_buf()
    };
    if candidate.is_file() {
        Ok(candidate)
    } else {
        Err(Error::NotFoundAtPath {
            what: "recipe.yaml",
            path: candidate,
        })
    }
}
