// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0

//! Error types for recipe evaluation.

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

#[cfg(test)]
#[path = "./error_test.rs"]
mod error_test;

/// Convenience Result type with pkgrecipe Error.
pub type Result<T> = std::result::Result<T, Error>;

/// The four failure categories an evaluation can report to its caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Acquisition,
    Reference,
    Build,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Configuration => "ConfigurationError",
            Self::Acquisition => "AcquisitionError",
            Self::Reference => "ReferenceError",
            Self::Build => "BuildError",
        };
        f.write_str(name)
    }
}

/// Errors that can occur while evaluating a recipe.
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    /// A required input file does not exist
    #[error("{what} not found at {path:?}")]
    #[diagnostic(
        code(pkgrecipe::not_found_at_path),
        help("Create one with 'pkgrecipe init' or point to it with -f")
    )]
    NotFoundAtPath { what: &'static str, path: PathBuf },

    /// Invalid YAML in a recipe, version metadata or profile file
    #[error("Invalid {what}: {error}")]
    #[diagnostic(
        code(pkgrecipe::invalid_yaml),
        help("Check YAML syntax and ensure the 'api' field is correct")
    )]
    InvalidYaml {
        what: &'static str,
        #[source]
        error: serde_yaml::Error,
        yaml_content: String,
    },

    /// Failed to read file
    #[error("Failed to read file: {path:?}")]
    #[diagnostic(code(pkgrecipe::read_failed))]
    ReadFailed {
        path: PathBuf,
        #[source]
        error: std::io::Error,
    },

    /// Version metadata has no usable `latest` entry
    #[error("Version metadata has no 'latest' entry")]
    #[diagnostic(
        code(pkgrecipe::missing_latest),
        help("Add 'latest: <version>' to versions.yaml")
    )]
    MissingLatest,

    /// Requested version is neither latest nor listed in sources
    #[error("Unknown version requested: {version}")]
    #[diagnostic(
        code(pkgrecipe::unknown_version),
        help("{}", known_versions_message(known))
    )]
    UnknownVersion { version: String, known: Vec<String> },

    /// Pinned version is missing its url or checkout reference
    #[error("Version {version} is pinned but has an empty {field}")]
    #[diagnostic(
        code(pkgrecipe::incomplete_source),
        help("Pinned versions need both 'url' and 'checkout' under sources")
    )]
    IncompleteSource { version: String, field: &'static str },

    /// Option not declared by the recipe
    #[error("Unrecognized option: {name}")]
    #[diagnostic(
        code(pkgrecipe::unrecognized_option),
        help("{}", declared_options_message(declared))
    )]
    UnrecognizedOption { name: String, declared: Vec<String> },

    /// Validation error
    #[error("Validation failed: {0}")]
    #[diagnostic(code(pkgrecipe::validation_failed))]
    ValidationFailed(String),

    /// Fetching or exporting sources failed
    #[error("Failed to acquire sources from {location}: {message}")]
    #[diagnostic(
        code(pkgrecipe::acquisition_failed),
        help("The evaluation is not retried; re-run once the source is reachable")
    )]
    AcquisitionFailed { location: String, message: String },

    /// Working tree is held by another evaluation
    #[error("Working tree {0:?} is in use by another evaluation")]
    #[diagnostic(code(pkgrecipe::work_tree_busy))]
    WorkTreeBusy(PathBuf),

    /// Checkout reference could not be resolved
    #[error("Invalid checkout reference '{reference}': {message}")]
    #[diagnostic(
        code(pkgrecipe::invalid_reference),
        help("Check that the branch, tag or commit exists in the source repository")
    )]
    InvalidReference { reference: String, message: String },

    /// Build system phase failed
    #[error("{phase} phase failed ({status}): {stderr}")]
    #[diagnostic(code(pkgrecipe::build_failed))]
    PhaseFailed {
        phase: crate::driver::Phase,
        status: String,
        stderr: String,
    },

    /// Failed to write a published file
    #[error("Failed to write {path:?}")]
    #[diagnostic(code(pkgrecipe::write_failed))]
    WriteFailed {
        path: PathBuf,
        #[source]
        error: std::io::Error,
    },
}

impl Error {
    /// The failure category this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFoundAtPath { .. }
            | Self::InvalidYaml { .. }
            | Self::ReadFailed { .. }
            | Self::MissingLatest
            | Self::UnknownVersion { .. }
            | Self::IncompleteSource { .. }
            | Self::UnrecognizedOption { .. }
            | Self::ValidationFailed(_) => ErrorKind::Configuration,
            Self::AcquisitionFailed { .. } | Self::WorkTreeBusy(_) => ErrorKind::Acquisition,
            Self::InvalidReference { .. } => ErrorKind::Reference,
            Self::PhaseFailed { .. } | Self::WriteFailed { .. } => ErrorKind::Build,
        }
    }
}

fn known_versions_message(known: &[String]) -> String {
    if known.is_empty() {
        "No versions are listed in versions.yaml".to_string()
    } else {
        format!("Known versions: {}", known.join(", "))
    }
}

fn declared_options_message(declared: &[String]) -> String {
    if declared.is_empty() {
        "This recipe declares no options".to_string()
    } else {
        format!("Declared options: {}", declared.join(", "))
    }
}
