// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0

//! The build settings tuple supplied by the invoking environment.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Error;

#[cfg(test)]
#[path = "./settings_test.rs"]
mod settings_test;

/// Target operating system family.
///
/// Deserialized with [`FromStr`], so names match case-insensitively.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Os {
    Windows,
    Linux,
    Macos,
    #[serde(rename = "FreeBSD")]
    FreeBsd,
    Android,
    #[serde(rename = "iOS")]
    Ios,
}

impl Os {
    pub const ALL: [Os; 6] = [
        Os::Windows,
        Os::Linux,
        Os::Macos,
        Os::FreeBsd,
        Os::Android,
        Os::Ios,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Os::Windows => "Windows",
            Os::Linux => "Linux",
            Os::Macos => "Macos",
            Os::FreeBsd => "FreeBSD",
            Os::Android => "Android",
            Os::Ios => "iOS",
        }
    }

    /// The os family of the running host, if it is one we know.
    pub fn host() -> Option<Self> {
        match std::env::consts::OS {
            "windows" => Some(Os::Windows),
            "linux" => Some(Os::Linux),
            "macos" => Some(Os::Macos),
            "freebsd" => Some(Os::FreeBsd),
            "android" => Some(Os::Android),
            "ios" => Some(Os::Ios),
            _ => None,
        }
    }
}

impl std::fmt::Display for Os {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Os {
    type Err = Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        Os::ALL
            .into_iter()
            .find(|os| os.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                Error::ValidationFailed(format!(
                    "Unknown os '{s}' (expected one of: {})",
                    Os::ALL.map(|os| os.as_str()).join(", ")
                ))
            })
    }
}

impl<'de> Deserialize<'de> for Os {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}

/// CMake build configuration.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BuildType {
    Debug,
    Release,
    RelWithDebInfo,
    MinSizeRel,
}

impl BuildType {
    pub const ALL: [BuildType; 4] = [
        BuildType::Debug,
        BuildType::Release,
        BuildType::RelWithDebInfo,
        BuildType::MinSizeRel,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BuildType::Debug => "Debug",
            BuildType::Release => "Release",
            BuildType::RelWithDebInfo => "RelWithDebInfo",
            BuildType::MinSizeRel => "MinSizeRel",
        }
    }
}

impl std::fmt::Display for BuildType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BuildType {
    type Err = Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        BuildType::ALL
            .into_iter()
            .find(|bt| bt.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                Error::ValidationFailed(format!(
                    "Unknown build_type '{s}' (expected one of: {})",
                    BuildType::ALL.map(|bt| bt.as_str()).join(", ")
                ))
            })
    }
}

impl<'de> Deserialize<'de> for BuildType {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}

/// Immutable settings for one build invocation.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq, Hash)]
pub struct Settings {
    pub os: Os,
    pub compiler: String,
    pub build_type: BuildType,
    pub arch: String,
}

impl Settings {
    /// Settings describing the running host with a Release build.
    pub fn detect() -> crate::Result<Self> {
        let os = Os::host().ok_or_else(|| {
            Error::ValidationFailed(format!(
                "Cannot detect settings for host os '{}'",
                std::env::consts::OS
            ))
        })?;
        let compiler = match os {
            Os::Windows => "msvc",
            Os::Macos | Os::Ios => "apple-clang",
            Os::FreeBsd | Os::Android => "clang",
            Os::Linux => "gcc",
        };
        Ok(Self {
            os,
            compiler: compiler.to_string(),
            build_type: BuildType::Release,
            arch: std::env::consts::ARCH.to_string(),
        })
    }

    /// Return a copy with one `key=value` setting replaced.
    pub fn with_override(&self, key: &str, value: &str) -> crate::Result<Self> {
        let mut settings = self.clone();
        match key {
            "os" => settings.os = value.parse()?,
            "build_type" => settings.build_type = value.parse()?,
            "compiler" => settings.compiler = value.to_string(),
            "arch" => settings.arch = value.to_string(),
            other => {
                return Err(Error::ValidationFailed(format!(
                    "Unknown setting '{other}' (expected os, compiler, build_type or arch)"
                )));
            }
        }
        settings.validate()?;
        Ok(settings)
    }

    /// Validate free-form settings values.
    pub fn validate(&self) -> crate::Result<()> {
        for (name, value) in [("compiler", &self.compiler), ("arch", &self.arch)] {
            if value.trim().is_empty() {
                return Err(Error::ValidationFailed(format!(
                    "Setting '{name}' must not be empty"
                )));
            }
            if value.contains(['/', '\\']) {
                return Err(Error::ValidationFailed(format!(
                    "Setting '{name}' must not contain path separators: {value}"
                )));
            }
        }
        Ok(())
    }
}
