// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0

//! Package info published for consuming recipes.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::options::{Linkage, OptionMatrix};
use crate::{Error, PACKAGE_INFO_FILENAME};

#[cfg(test)]
#[path = "./publish_test.rs"]
mod publish_test;

/// What a consumer links against.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct PackageInfo {
    /// Artifact names, in link order.
    #[serde(rename = "libs")]
    pub library_names: Vec<String>,

    /// Imported target name, e.g. `pkg::Target`.
    #[serde(rename = "alias")]
    pub build_system_alias: String,
}

impl PackageInfo {
    fn validate(&self, linkage: Linkage) -> crate::Result<()> {
        if self.library_names.is_empty() {
            return Err(Error::ValidationFailed(format!(
                "publish.{linkage} must list at least one library"
            )));
        }
        if self.library_names.iter().any(|lib| lib.trim().is_empty()) {
            return Err(Error::ValidationFailed(format!(
                "publish.{linkage} contains an empty library name"
            )));
        }
        if self.build_system_alias.trim().is_empty() {
            return Err(Error::ValidationFailed(format!(
                "publish.{linkage} must set an alias"
            )));
        }
        Ok(())
    }
}

/// Published names for each linkage mode.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct PublishTable {
    pub shared: PackageInfo,
    #[serde(rename = "static")]
    pub static_: PackageInfo,
}

impl PublishTable {
    /// Reject entries that would publish nothing.
    pub fn validate(&self) -> crate::Result<()> {
        self.shared.validate(Linkage::Shared)?;
        self.static_.validate(Linkage::Static)
    }

    pub fn entry(&self, linkage: Linkage) -> &PackageInfo {
        match linkage {
            Linkage::Shared => &self.shared,
            Linkage::Static => &self.static_,
        }
    }
}

/// Select the package info for the effective option matrix.
pub fn publish(table: &PublishTable, options: &OptionMatrix) -> PackageInfo {
    let info = table.entry(options.linkage()).clone();
    tracing::debug!(
        linkage = %options.linkage(),
        alias = %info.build_system_alias,
        "selected package info"
    );
    info
}

/// Write package info into a package directory for consumers to read.
pub fn write_package_info(info: &PackageInfo, package_dir: &Path) -> crate::Result<PathBuf> {
    let path = package_dir.join(PACKAGE_INFO_FILENAME);
    let yaml = serde_yaml::to_string(info).map_err(|e| Error::WriteFailed {
        path: path.clone(),
        error: std::io::Error::other(e),
    })?;
    std::fs::create_dir_all(package_dir).map_err(|e| Error::WriteFailed {
        path: package_dir.to_path_buf(),
        error: e,
    })?;
    std::fs::write(&path, yaml).map_err(|e| Error::WriteFailed {
        path: path.clone(),
        error: e,
    })?;
    Ok(path)
}

/// Read package info previously written by [`write_package_info`].
pub fn read_package_info(package_dir: &Path) -> crate::Result<PackageInfo> {
    let path = package_dir.join(PACKAGE_INFO_FILENAME);
    let yaml = std::fs::read_to_string(&path).map_err(|e| Error::ReadFailed {
        path: path.clone(),
        error: e,
    })?;
    serde_yaml::from_str(&yaml).map_err(|e| Error::InvalidYaml {
        what: "package info",
        error: e,
        yaml_content: yaml,
    })
}
