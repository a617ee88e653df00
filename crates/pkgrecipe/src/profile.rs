// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0

//! Profiles: named settings and option overrides.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::settings::{BuildType, Os, Settings};
use crate::Error;

#[cfg(test)]
#[path = "./profile_test.rs"]
mod profile_test;

/// Environment variable selecting the default profile.
pub const PROFILE_ENV: &str = "PKGRECIPE_PROFILE";

/// API version for profile files.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub enum ProfileApiVersion {
    #[default]
    #[serde(rename = "profile/v0")]
    V0,
}

/// Settings a profile pins; anything unset keeps its base value.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ProfileSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os: Option<Os>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compiler: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_type: Option<BuildType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arch: Option<String>,
}

/// A profile file.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Profile {
    #[serde(default)]
    pub api: ProfileApiVersion,

    #[serde(default)]
    pub settings: ProfileSettings,

    /// Option overrides applied over recipe defaults.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub options: BTreeMap<String, bool>,
}

impl Profile {
    /// Parse profile from YAML string.
    pub fn from_yaml<S: Into<String>>(yaml: S) -> crate::Result<Self> {
        let yaml = yaml.into();
        serde_yaml::from_str(&yaml).map_err(|e| Error::InvalidYaml {
            what: "profile",
            error: e,
            yaml_content: yaml.clone(),
        })
    }

    /// Load profile from file path.
    pub fn load<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(Error::NotFoundAtPath {
                what: "Profile",
                path: path.to_path_buf(),
            });
        }
        let yaml = std::fs::read_to_string(path).map_err(|e| Error::ReadFailed {
            path: path.to_path_buf(),
            error: e,
        })?;
        Self::from_yaml(yaml)
    }

    /// Overlay this profile's settings on `base`.
    pub fn apply_to(&self, base: &Settings) -> crate::Result<Settings> {
        let mut settings = base.clone();
        if let Some(os) = self.settings.os {
            settings.os = os;
        }
        if let Some(build_type) = self.settings.build_type {
            settings.build_type = build_type;
        }
        if let Some(compiler) = &self.settings.compiler {
            settings.compiler = compiler.clone();
        }
        if let Some(arch) = &self.settings.arch {
            settings.arch = arch.clone();
        }
        settings.validate()?;
        Ok(settings)
    }
}

/// Directory holding named profiles.
pub fn profiles_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("pkgrecipe").join("profiles"))
}

/// Resolve a profile reference to a file path.
///
/// A reference containing a path separator or ending in `.yaml` is a path
/// (`~/` is expanded); anything else names a file in [`profiles_dir`].
pub fn resolve_profile_path(reference: &str) -> crate::Result<PathBuf> {
    if let Some(rest) = reference.strip_prefix("~/") {
        let home = dirs::home_dir().ok_or_else(|| {
            Error::ValidationFailed("Cannot resolve ~ without HOME".to_string())
        })?;
        return Ok(home.join(rest));
    }
    let is_path = reference.contains(std::path::MAIN_SEPARATOR)
        || reference.contains('/')
        || reference.ends_with(".yaml");
    if is_path {
        return Ok(PathBuf::from(reference));
    }
    let dir = profiles_dir().ok_or_else(|| {
        Error::ValidationFailed("Cannot locate the profiles directory".to_string())
    })?;
    Ok(dir.join(format!("{reference}.yaml")))
}
