// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0

//! Version metadata loading and version resolution.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::Error;

#[cfg(test)]
#[path = "./version_test.rs"]
mod version_test;

/// The request string that always selects the latest version.
pub const LATEST_MARKER: &str = "latest";

/// Where a pinned version's sources live.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct SourceLocation {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub checkout: String,
}

/// External version metadata from a `versions.yaml` file.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct VersionMetadata {
    /// The version provided by files exported alongside the recipe.
    #[serde(default)]
    pub latest: Option<String>,

    /// Pinned versions fetched from a remote repository.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub sources: BTreeMap<String, SourceLocation>,
}

impl VersionMetadata {
    /// Parse version metadata from YAML string.
    pub fn from_yaml<S: Into<String>>(yaml: S) -> crate::Result<Self> {
        let yaml = yaml.into();
        let metadata: Self = serde_yaml::from_str(&yaml).map_err(|e| Error::InvalidYaml {
            what: "version metadata",
            error: e,
            yaml_content: yaml.clone(),
        })?;
        metadata.latest()?;
        Ok(metadata)
    }

    /// Load version metadata from file path.
    pub fn load<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(Error::NotFoundAtPath {
                what: "Version metadata",
                path: path.to_path_buf(),
            });
        }
        let yaml = std::fs::read_to_string(path).map_err(|e| Error::ReadFailed {
            path: path.to_path_buf(),
            error: e,
        })?;
        Self::from_yaml(yaml)
    }

    /// The non-empty latest version.
    pub fn latest(&self) -> crate::Result<&str> {
        match self.latest.as_deref().map(str::trim) {
            Some(latest) if !latest.is_empty() => Ok(latest),
            _ => Err(Error::MissingLatest),
        }
    }

    /// Every version this metadata can resolve.
    pub fn known_versions(&self) -> Vec<String> {
        let mut known: Vec<String> = self.sources.keys().cloned().collect();
        if let Ok(latest) = self.latest() {
            if !self.sources.contains_key(latest) {
                known.push(latest.to_string());
            }
        }
        known
    }
}

/// A concrete version and how its sources are obtained.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct VersionData {
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checkout_target: Option<String>,
    pub is_latest: bool,
}

impl VersionData {
    /// A version provided by files exported with the recipe.
    pub fn local<S: Into<String>>(version: S) -> Self {
        Self {
            version: version.into(),
            source_url: None,
            checkout_target: None,
            is_latest: true,
        }
    }

    /// A version fetched from `url` at `checkout`.
    pub fn pinned<V, U, C>(version: V, url: U, checkout: C) -> Self
    where
        V: Into<String>,
        U: Into<String>,
        C: Into<String>,
    {
        Self {
            version: version.into(),
            source_url: Some(url.into()),
            checkout_target: Some(checkout.into()),
            is_latest: false,
        }
    }

    /// Check that exactly one of local files or remote fetch applies.
    pub fn validate(&self) -> crate::Result<()> {
        if self.version.trim().is_empty() {
            return Err(Error::ValidationFailed(
                "Resolved version must not be empty".to_string(),
            ));
        }
        if self.is_latest {
            return Ok(());
        }
        let non_empty =
            |value: &Option<String>| value.as_deref().is_some_and(|v| !v.trim().is_empty());
        if !non_empty(&self.source_url) {
            return Err(Error::IncompleteSource {
                version: self.version.clone(),
                field: "url",
            });
        }
        if !non_empty(&self.checkout_target) {
            return Err(Error::IncompleteSource {
                version: self.version.clone(),
                field: "checkout",
            });
        }
        Ok(())
    }
}

/// Resolve the version to build from metadata and an optional request.
pub fn resolve_version(
    metadata: &VersionMetadata,
    requested: Option<&str>,
) -> crate::Result<VersionData> {
    let latest = metadata.latest()?;
    let requested = match requested.map(str::trim) {
        None | Some(LATEST_MARKER) | Some("") => {
            tracing::debug!(version = %latest, "using latest version");
            let data = VersionData::local(latest);
            data.validate()?;
            return Ok(data);
        }
        Some(requested) => requested,
    };

    let data = match metadata.sources.get(requested) {
        Some(location) => VersionData::pinned(requested, &location.url, &location.checkout),
        None if requested == latest => VersionData::local(latest),
        None => {
            return Err(Error::UnknownVersion {
                version: requested.to_string(),
                known: metadata.known_versions(),
            });
        }
    };
    data.validate()?;
    tracing::debug!(version = %data.version, is_latest = data.is_latest, "resolved version");
    Ok(data)
}
