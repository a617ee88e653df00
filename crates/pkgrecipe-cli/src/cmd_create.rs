// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0

//! Implementation of the `pkgrecipe create` command.

use std::path::PathBuf;

use clap::Args;
use colored::Colorize;
use miette::Result;
use pkgrecipe::runner::CMAKE_ENV;
use pkgrecipe::{AcquiredSources, BuildDriver, ProcessRunner};

/// Evaluate a recipe: fetch sources, build and publish
#[derive(Debug, Args)]
pub struct CmdCreate {
    /// Recipe file or the directory containing it
    #[clap(short = 'f', long, default_value = ".")]
    file: PathBuf,

    /// cmake executable to drive the build with
    #[clap(long, env = CMAKE_ENV, value_name = "PROGRAM")]
    cmake: Option<String>,

    #[clap(flatten)]
    eval: crate::EvalFlags,
}

impl CmdCreate {
    pub async fn run(&mut self) -> Result<i32> {
        let (recipe, versions) = crate::load_recipe(&self.file)?;
        let config = self.eval.config()?;
        let driver = match &self.cmake {
            Some(program) => BuildDriver::new(program.as_str()),
            None => BuildDriver::default(),
        };

        let outcome = pkgrecipe::evaluate(
            &recipe,
            &versions,
            &config,
            &driver,
            &ProcessRunner,
        )
        .await?;

        let sources = match &outcome.sources {
            AcquiredSources::RecipeDir { .. } => "recipe directory".to_string(),
            AcquiredSources::Exported { files, .. } => format!("{files} exported file(s)"),
            AcquiredSources::Cloned { reference, .. } => format!("checkout {reference}"),
        };

        println!(
            "{} {} {}",
            "✓".green(),
            recipe.name.bold(),
            outcome.version.version.cyan()
        );
        println!("  sources:    {sources}");
        println!("  package:    {}", outcome.package_dir.display());
        println!("  package id: {}", outcome.package_id.dimmed());
        println!(
            "  alias:      {}",
            outcome.package_info.build_system_alias.green()
        );
        println!(
            "  libs:       {}",
            outcome.package_info.library_names.join(", ")
        );
        Ok(0)
    }
}
