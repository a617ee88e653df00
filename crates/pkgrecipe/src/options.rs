// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0

//! The option matrix: declared build toggles and their platform pruning.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::settings::Os;
use crate::Error;

#[cfg(test)]
#[path = "./options_test.rs"]
mod options_test;

/// Every option a recipe may declare.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OptionName {
    #[serde(rename = "shared")]
    Shared,
    #[serde(rename = "fPIC")]
    Fpic,
    #[serde(rename = "genTest")]
    GenTest,
}

impl OptionName {
    pub const ALL: [OptionName; 3] = [OptionName::Shared, OptionName::Fpic, OptionName::GenTest];

    pub fn as_str(&self) -> &'static str {
        match self {
            OptionName::Shared => "shared",
            OptionName::Fpic => "fPIC",
            OptionName::GenTest => "genTest",
        }
    }
}

impl std::fmt::Display for OptionName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OptionName {
    type Err = Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        OptionName::ALL
            .into_iter()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| Error::UnrecognizedOption {
                name: s.to_string(),
                declared: OptionName::ALL.iter().map(|n| n.to_string()).collect(),
            })
    }
}

/// Linkage mode selected by the `shared` option.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Linkage {
    Shared,
    Static,
}

impl From<bool> for Linkage {
    fn from(shared: bool) -> Self {
        if shared {
            Linkage::Shared
        } else {
            Linkage::Static
        }
    }
}

impl std::fmt::Display for Linkage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Linkage::Shared => f.write_str("shared"),
            Linkage::Static => f.write_str("static"),
        }
    }
}

/// Option values over the static schema.
///
/// `shared` is always present. `fPIC` and `genTest` are present only when the
/// recipe declares them and pruning has not removed them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OptionMatrix {
    shared: bool,
    fpic: Option<bool>,
    gen_test: Option<bool>,
}

impl OptionMatrix {
    /// Build the raw matrix from a recipe's declared defaults.
    pub fn from_declared(declared: &BTreeMap<OptionName, bool>) -> crate::Result<Self> {
        let shared = declared.get(&OptionName::Shared).copied().ok_or_else(|| {
            Error::ValidationFailed("Recipes must declare the 'shared' option".to_string())
        })?;
        Ok(Self {
            shared,
            fpic: declared.get(&OptionName::Fpic).copied(),
            gen_test: declared.get(&OptionName::GenTest).copied(),
        })
    }

    /// Apply `name=value` overrides in order.
    ///
    /// Overriding an option the matrix does not hold is rejected.
    pub fn with_overrides<'a, I>(&self, overrides: I) -> crate::Result<Self>
    where
        I: IntoIterator<Item = (&'a str, bool)>,
    {
        let mut matrix = *self;
        for (name, value) in overrides {
            let option = name.parse::<OptionName>().map_err(|_| self.unrecognized(name))?;
            match option {
                OptionName::Shared => matrix.shared = value,
                OptionName::Fpic => {
                    let slot = matrix.fpic.as_mut().ok_or_else(|| self.unrecognized(name))?;
                    *slot = value;
                }
                OptionName::GenTest => {
                    let slot = matrix
                        .gen_test
                        .as_mut()
                        .ok_or_else(|| self.unrecognized(name))?;
                    *slot = value;
                }
            }
        }
        Ok(matrix)
    }

    /// Remove options that have no meaning for this os and linkage.
    pub fn prune(&self, os: Os) -> Self {
        let mut pruned = *self;
        if os == Os::Windows || !pruned.shared {
            pruned.fpic = None;
        }
        pruned
    }

    pub fn shared(&self) -> bool {
        self.shared
    }

    pub fn linkage(&self) -> Linkage {
        Linkage::from(self.shared)
    }

    pub fn get(&self, name: OptionName) -> Option<bool> {
        match name {
            OptionName::Shared => Some(self.shared),
            OptionName::Fpic => self.fpic,
            OptionName::GenTest => self.gen_test,
        }
    }

    pub fn contains(&self, name: OptionName) -> bool {
        self.get(name).is_some()
    }

    /// Present options in schema order.
    pub fn iter(&self) -> impl Iterator<Item = (OptionName, bool)> + '_ {
        OptionName::ALL
            .into_iter()
            .filter_map(|name| self.get(name).map(|value| (name, value)))
    }

    pub fn to_map(&self) -> BTreeMap<OptionName, bool> {
        self.iter().collect()
    }

    fn unrecognized(&self, name: &str) -> Error {
        Error::UnrecognizedOption {
            name: name.to_string(),
            declared: self.iter().map(|(n, _)| n.to_string()).collect(),
        }
    }
}

/// Parse a boolean option value as written on a command line or in a profile.
pub fn parse_option_value(value: &str) -> crate::Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(Error::ValidationFailed(format!(
            "Invalid option value '{value}' (expected true or false)"
        ))),
    }
}

/// Split a `key=value` assignment.
pub fn parse_assignment(assignment: &str) -> crate::Result<(String, String)> {
    match assignment.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(Error::ValidationFailed(format!(
            "Expected key=value, got '{assignment}'"
        ))),
    }
}
