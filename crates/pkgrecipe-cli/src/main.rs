// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0

//! pkgrecipe - Package Recipe Evaluator CLI

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use miette::Result;
use pkgrecipe::options::parse_assignment;
use pkgrecipe::profile::PROFILE_ENV;
use pkgrecipe::{EvaluationConfig, Profile, RecipeSpec, Settings, SourcePolicy, VersionMetadata};

mod cmd_check;
mod cmd_create;
mod cmd_init;
mod cmd_plan;

use cmd_check::CmdCheck;
use cmd_create::CmdCreate;
use cmd_init::CmdInit;
use cmd_plan::CmdPlan;


#[derive(Parser)]
#[clap(
    name = "pkgrecipe",
    about = "Package Recipe Evaluator",
    version,
    long_about = "Evaluate declarative package recipes into cmake builds and published package info"
)]
struct Opt {
    #[clap(flatten)]
    logging: Logging,

    #[clap(subcommand)]
    cmd: Command,
}

#[derive(Parser)]
struct Logging {
    /// Increase verbosity (-v, -vv, -vvv)
    #[clap(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[clap(short, long, global = true)]
    quiet: bool,
}

/// Flags that shape one evaluation.
#[derive(Parser, Clone, Debug, Default)]
pub struct EvalFlags {
    /// Profile name or path to a profile file
    #[clap(long, env = PROFILE_ENV)]
    pub profile: Option<String>,

    /// Override a setting (os, compiler, build_type, arch)
    #[clap(short = 's', long = "setting", value_name = "KEY=VALUE")]
    pub settings: Vec<String>,

    /// Override a recipe option (shared, fPIC, genTest)
    #[clap(short = 'o', long = "option", value_name = "NAME=VALUE")]
    pub options: Vec<String>,

    /// Version to evaluate, defaults to latest
    #[clap(long = "version", value_name = "VERSION")]
    pub version: Option<String>,

    /// Where sources come from: by-version or exported
    #[clap(long)]
    pub source_policy: Option<SourcePolicy>,

    /// Root directory for working trees, builds and packages
    #[clap(long, value_name = "DIR")]
    pub output: Option<PathBuf>,
}

impl EvalFlags {
    /// Build the evaluation config: host settings, then the profile, then
    /// command line overrides.
    pub fn config(&self) -> Result<EvaluationConfig> {
        let mut settings = Settings::detect()?;
        let mut option_overrides = Vec::new();

        if let Some(reference) = &self.profile {
            let path = pkgrecipe::profile::resolve_profile_path(reference)?;
            let profile = Profile::load(&path)?;
            tracing::debug!(path = %path.display(), "loaded profile");
            settings = profile.apply_to(&settings)?;
            option_overrides.extend(profile.options.into_iter());
        }

        for assignment in &self.settings {
            let (key, value) = parse_assignment(assignment)?;
            settings = settings.with_override(&key, &value)?;
        }
        for assignment in &self.options {
            let (name, value) = parse_assignment(assignment)?;
            let value = pkgrecipe::options::parse_option_value(&value)?;
            option_overrides.push((name, value));
        }

        Ok(EvaluationConfig {
            settings,
            option_overrides,
            requested_version: self.version.clone(),
            source_policy: self.source_policy,
            output_root: self.output.clone(),
        })
    }
}

/// Load the recipe at or under `file`, together with its version metadata.
pub fn load_recipe(file: &Path) -> Result<(RecipeSpec, VersionMetadata)> {
    let path = pkgrecipe::locate_recipe(file)?;
    let recipe = RecipeSpec::load(&path)?;
    let versions = recipe.load_versions()?;
    Ok((recipe, versions))
}

#[derive(Subcommand)]
enum Command {
    /// Create a new recipe.yaml and versions.yaml
    Init(CmdInit),

    /// Show the build plan and package info without building
    Plan(CmdPlan),

    /// Evaluate a recipe: fetch sources, build and publish
    Create(CmdCreate),

    /// Verify a built package against the current inputs
    Check(CmdCheck),
}

impl Opt {
    async fn run(self) -> Result<i32> {
        let log_level = match (self.logging.quiet, self.logging.verbose) {
            (true, _) => tracing::Level::ERROR,
            (false, 0) => tracing::Level::WARN,
            (false, 1) => tracing::Level::INFO,
            (false, 2) => tracing::Level::DEBUG,
            (false, _) => tracing::Level::TRACE,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_writer(std::io::stderr)
            .init();

        match self.cmd {
            Command::Init(mut cmd) => cmd.run().await,
            Command::Plan(mut cmd) => cmd.run().await,
            Command::Create(mut cmd) => cmd.run().await,
            Command::Check(mut cmd) => cmd.run().await,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let opt = Opt::parse();
    let code = opt.run().await?;
    std::process::exit(code);
}
