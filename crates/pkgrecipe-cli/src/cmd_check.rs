// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0

//! Verify that a built package still matches its recipe and settings.

use std::path::PathBuf;

use clap::Args;
use colored::Colorize;
use miette::Result;
use pkgrecipe::record::CurrentState;
use pkgrecipe::{EvaluationRecord, RecordChangeKind};

/// Verify a built package against the current inputs
#[derive(Debug, Args)]
pub struct CmdCheck {
    /// Recipe file or the directory containing it
    #[clap(short = 'f', long, default_value = ".")]
    file: PathBuf,

    /// Exit with error on mismatch
    #[clap(long)]
    strict: bool,

    #[clap(flatten)]
    eval: crate::EvalFlags,
}

impl CmdCheck {
    pub async fn run(&mut self) -> Result<i32> {
        let (recipe, versions) = crate::load_recipe(&self.file)?;
        let config = self.eval.config()?;
        let preview = pkgrecipe::preview(&recipe, &versions, &config)?;

        let package_dir = config.package_dir_for(&recipe, &preview)?;
        let record_path = package_dir.join(pkgrecipe::RECORD_FILENAME);
        if !record_path.exists() {
            if self.strict {
                return Err(miette::miette!(
                    "No evaluation record found at {}",
                    record_path.display()
                ));
            }
            println!("Warning: No evaluation record found, run 'pkgrecipe create' first");
            return Ok(2);
        }

        let record = EvaluationRecord::load(&package_dir)?;
        let recipe_path = recipe
            .source_path
            .as_deref()
            .ok_or_else(|| miette::miette!("Recipe was not loaded from a file"))?;
        let changes = pkgrecipe::verify_record(
            &record,
            &CurrentState {
                recipe_path,
                version: &preview.version.version,
                settings: &config.settings,
                options: &preview.options,
                package_info: &preview.package_info,
            },
        )?;

        if changes.is_empty() {
            println!("{} Package matches its evaluation record", "✓".green());
            return Ok(0);
        }

        if self.strict {
            eprintln!("Error: Package differs from its evaluation record:");
        } else {
            println!("Warning: Package differs from its evaluation record:");
        }

        for change in &changes {
            match &change.kind {
                RecordChangeKind::RecipeChanged => {
                    println!("  - Recipe '{}' was modified", change.reference);
                }
                RecordChangeKind::VersionChanged => {
                    println!("  - Version changed");
                }
                RecordChangeKind::PackageIdChanged => {
                    println!("  - Settings or options changed");
                }
                RecordChangeKind::PackageInfoChanged => {
                    println!("  - Published package info changed");
                }
            }
            if let (Some(exp), Some(act)) = (&change.expected, &change.actual) {
                println!("    Expected: {}", exp);
                println!("    Actual:   {}", act);
            }
        }

        if self.strict {
            return Err(miette::miette!(
                "{} change(s) since the last evaluation",
                changes.len()
            ));
        }

        println!("\nRun 'pkgrecipe create' to rebuild the package");
        Ok(1)
    }
}
