// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0

//! Implementation of the `pkgrecipe plan` command.

use std::collections::BTreeMap;
use std::path::PathBuf;

use clap::Args;
use colored::Colorize;
use miette::Result;
use pkgrecipe::{
    BuildPlan, EvaluationConfig, EvaluationPreview, OptionName, PackageInfo, RecipeMetadata,
    Settings, SourcePolicy,
};
use serde::Serialize;

/// Show the build plan and package info without building
#[derive(Debug, Args)]
pub struct CmdPlan {
    /// Recipe file or the directory containing it
    #[clap(short = 'f', long, default_value = ".")]
    file: PathBuf,

    /// Output format: table, yaml
    #[clap(long, default_value = "table")]
    format: String,

    #[clap(flatten)]
    pub(crate) eval: crate::EvalFlags,
}

/// Machine readable form of a preview.
#[derive(Serialize)]
struct PlanReport<'a> {
    recipe: &'a RecipeMetadata,
    version: &'a str,
    latest: bool,
    source_policy: SourcePolicy,
    fetches_sources: bool,
    settings: &'a Settings,
    options: BTreeMap<OptionName, bool>,
    package_id: &'a str,
    plan: &'a BuildPlan,
    package_info: &'a PackageInfo,
}

impl CmdPlan {
    pub async fn run(&mut self) -> Result<i32> {
        let (recipe, versions) = crate::load_recipe(&self.file)?;
        let config = self.eval.config()?;
        let preview = pkgrecipe::preview(&recipe, &versions, &config)?;

        match self.format.as_str() {
            "yaml" => self.show_yaml(&preview, &config)?,
            "table" => self.show_table(&preview, &config),
            other => {
                return Err(miette::miette!(
                    "Unknown format '{other}' (expected table or yaml)"
                ));
            }
        }
        Ok(0)
    }

    fn show_table(&self, preview: &EvaluationPreview, config: &EvaluationConfig) {
        let settings = &config.settings;
        let source = if preview.fetches_sources() {
            "cloned".yellow()
        } else {
            "exported".green()
        };

        println!(
            "{} {}",
            preview.metadata.name.bold(),
            preview.version.version.cyan()
        );
        if preview.version.is_latest {
            println!("  {}", "latest".dimmed());
        }
        println!("  sources: {source} ({})", preview.source_policy);
        println!(
            "  settings: {} {} {} {}",
            settings.os, settings.arch, settings.compiler, settings.build_type
        );
        println!("  package id: {}", preview.package_id.dimmed());
        println!();

        println!("{}", "Options:".bold());
        for (name, value) in preview.options.iter() {
            println!("  {name} = {value}");
        }
        println!();

        println!("{}", "Build Variables:".bold());
        for (name, value) in &preview.plan.variables {
            println!(
                "  {}:{} = {}",
                name.cyan(),
                value.cache_type(),
                value.render().green()
            );
        }
        println!();

        println!("{}", "Layout:".bold());
        println!("  build:      {}", preview.plan.layout.build_dir.display());
        println!("  generators: {}", preview.plan.layout.generators_dir.display());
        println!("  package:    {}", preview.plan.layout.package_dir.display());
        println!();

        println!("{}", "Package Info:".bold());
        println!(
            "  alias: {}",
            preview.package_info.build_system_alias.green()
        );
        println!("  libs:  {}", preview.package_info.library_names.join(", "));
    }

    fn show_yaml(&self, preview: &EvaluationPreview, config: &EvaluationConfig) -> Result<()> {
        let report = PlanReport {
            recipe: &preview.metadata,
            version: &preview.version.version,
            latest: preview.version.is_latest,
            source_policy: preview.source_policy,
            fetches_sources: preview.fetches_sources(),
            settings: &config.settings,
            options: preview.options.to_map(),
            package_id: &preview.package_id,
            plan: &preview.plan,
            package_info: &preview.package_info,
        };
        let yaml = serde_yaml::to_string(&report)
            .map_err(|e| miette::miette!("Failed to serialize plan: {e}"))?;
        print!("{yaml}");
        Ok(())
    }
}
