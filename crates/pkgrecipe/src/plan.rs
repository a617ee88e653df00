// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0

//! Translation of settings and options into a build system plan.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::options::{OptionMatrix, OptionName};
use crate::settings::Settings;

#[cfg(test)]
#[path = "./plan_test.rs"]
mod plan_test;

pub const BUILD_SHARED_LIBS: &str = "BUILD_SHARED_LIBS";
pub const GEN_TEST: &str = "GEN_TEST";
pub const POSITION_INDEPENDENT_CODE: &str = "CMAKE_POSITION_INDEPENDENT_CODE";
pub const BUILD_TYPE: &str = "CMAKE_BUILD_TYPE";

/// Name of the toolchain file written into the generators directory.
pub const TOOLCHAIN_FILENAME: &str = "toolchain.cmake";

/// A value handed to the build system.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum PlanValue {
    Bool(bool),
    String(String),
}

impl PlanValue {
    /// CMake cache type of this value.
    pub fn cache_type(&self) -> &'static str {
        match self {
            PlanValue::Bool(_) => "BOOL",
            PlanValue::String(_) => "STRING",
        }
    }

    /// The value as CMake spells it.
    pub fn render(&self) -> String {
        match self {
            PlanValue::Bool(true) => "ON".to_string(),
            PlanValue::Bool(false) => "OFF".to_string(),
            PlanValue::String(s) => s.clone(),
        }
    }
}

impl std::fmt::Display for PlanValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.render())
    }
}

/// Directory scheme for build and install artifacts, relative to an output root.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct Layout {
    pub build_dir: PathBuf,
    pub generators_dir: PathBuf,
    pub package_dir: PathBuf,
}

impl Layout {
    /// Derive the layout from settings alone.
    pub fn from_settings(settings: &Settings) -> Self {
        let prefix = format!("{}-{}-{}", settings.os, settings.arch, settings.compiler)
            .to_ascii_lowercase();
        let build_dir = PathBuf::from("build")
            .join(&prefix)
            .join(settings.build_type.as_str());
        let generators_dir = build_dir.join("generators");
        let package_dir = PathBuf::from("package").join(format!(
            "{prefix}-{}",
            settings.build_type.as_str().to_ascii_lowercase()
        ));
        Self {
            build_dir,
            generators_dir,
            package_dir,
        }
    }

    pub fn toolchain_file(&self) -> PathBuf {
        self.generators_dir.join(TOOLCHAIN_FILENAME)
    }
}

/// Everything the build system needs for one invocation.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct BuildPlan {
    pub variables: BTreeMap<String, PlanValue>,
    pub layout: Layout,
}

impl BuildPlan {
    /// Render the cache variables as a CMake toolchain fragment.
    pub fn toolchain_script(&self) -> String {
        let mut script = String::from("# Generated by pkgrecipe. Do not edit.\n");
        for (name, value) in &self.variables {
            let rendered = match value {
                PlanValue::Bool(_) => value.render(),
                PlanValue::String(s) => format!("\"{}\"", escape_cmake(s)),
            };
            script.push_str(&format!(
                "set({name} {rendered} CACHE {} \"\" FORCE)\n",
                value.cache_type()
            ));
        }
        script
    }

    /// `-D` arguments for a configure invocation.
    pub fn define_args(&self) -> Vec<String> {
        self.variables
            .iter()
            .map(|(name, value)| format!("-D{name}:{}={}", value.cache_type(), value.render()))
            .collect()
    }
}

/// Build the plan for one invocation.
///
/// The options are expected to be pruned already; whatever they still hold
/// is mapped onto its build system variable.
pub fn generate_plan(settings: &Settings, options: &OptionMatrix) -> BuildPlan {
    let mut variables = BTreeMap::new();
    for (name, value) in options.iter() {
        let variable = match name {
            OptionName::Shared => BUILD_SHARED_LIBS,
            OptionName::GenTest => GEN_TEST,
            OptionName::Fpic => POSITION_INDEPENDENT_CODE,
        };
        variables.insert(variable.to_string(), PlanValue::Bool(value));
    }
    variables.insert(
        BUILD_TYPE.to_string(),
        PlanValue::String(settings.build_type.to_string()),
    );

    BuildPlan {
        variables,
        layout: Layout::from_settings(settings),
    }
}

fn escape_cmake(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
