// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0

//! Implementation of the `pkgrecipe init` command.

use std::path::PathBuf;

use clap::Args;
use miette::Result;

#[cfg(test)]
#[path = "./cmd_init_test.rs"]
mod cmd_init_test;

/// Create a new recipe.yaml and versions.yaml
#[derive(Debug, Args)]
pub struct CmdInit {
    /// Directory to create the recipe in
    #[clap(default_value = ".")]
    path: PathBuf,

    /// Package name, defaults to the directory name
    #[clap(long)]
    name: Option<String>,

    /// Version exported alongside the recipe
    #[clap(long = "latest", default_value = "0.1.0")]
    latest: String,

    /// Template to use: minimal, standard
    #[clap(long, default_value = "standard")]
    template: String,
}

impl CmdInit {
    pub async fn run(&mut self) -> Result<i32> {
        let recipe_path = self.path.join(pkgrecipe::RECIPE_FILENAME);
        let versions_path = self.path.join(pkgrecipe::VERSIONS_FILENAME);

        for path in [&recipe_path, &versions_path] {
            if path.exists() {
                return Err(miette::miette!("{} already exists", path.display()));
            }
        }

        let name = self.package_name()?;
        let recipe = match self.template.as_str() {
            "minimal" => minimal_template(&name),
            "standard" => standard_template(&name),
            other => {
                return Err(miette::miette!(
                    "Unknown template '{other}' (expected minimal or standard)"
                ));
            }
        };

        std::fs::create_dir_all(&self.path)
            .map_err(|e| miette::miette!("Failed to create {}: {e}", self.path.display()))?;
        std::fs::write(&recipe_path, recipe)
            .map_err(|e| miette::miette!("Failed to write recipe.yaml: {e}"))?;
        std::fs::write(&versions_path, versions_template(&self.latest))
            .map_err(|e| miette::miette!("Failed to write versions.yaml: {e}"))?;

        println!("Created {}", recipe_path.display());
        println!("Created {}", versions_path.display());
        println!();
        println!("Next steps:");
        println!("  1. List your sources under exports_sources");
        println!("  2. Run 'pkgrecipe plan' to preview the build");
        println!("  3. Run 'pkgrecipe create' to build and publish");

        Ok(0)
    }

    fn package_name(&self) -> Result<String> {
        if let Some(name) = &self.name {
            return Ok(name.clone());
        }
        let dir = absolute_path(&self.path)?;
        dir.file_name()
            .map(|n| n.to_string_lossy().to_ascii_lowercase())
            .ok_or_else(|| miette::miette!("Cannot derive a package name, pass --name"))
    }
}

fn absolute_path(path: &std::path::Path) -> Result<PathBuf> {
    std::path::absolute(path)
        .map_err(|e| miette::miette!("Failed to resolve {}: {e}", path.display()))
}

pub(crate) fn minimal_template(name: &str) -> String {
    format!(
        "api: recipe/v0\n\
        name: {name}\n\
        \n\
        options:\n\
        \x20 shared: true\n\
        \n\
        publish:\n\
        \x20 shared:\n\
        \x20   libs: [{name}-shared]\n\
        \x20   alias: {name}::{name}\n\
        \x20 static:\n\
        \x20   libs: [{name}-static]\n\
        \x20   alias: {name}::{name}\n"
    )
}

pub(crate) fn standard_template(name: &str) -> String {
    format!(
        "# pkgrecipe recipe\n\
        \n\
        api: recipe/v0\n\
        name: {name}\n\
        # license: MIT\n\
        # author: \"Your Name <you@example.com>\"\n\
        # url: https://example.com/{name}\n\
        # description: \"\"\n\
        \n\
        # Build toggles with their defaults. shared is required.\n\
        # fPIC is dropped on Windows and for static builds.\n\
        options:\n\
        \x20 shared: true\n\
        \x20 fPIC: true\n\
        \x20 genTest: false\n\
        \n\
        # Files copied into the working tree for the latest version\n\
        exports_sources:\n\
        \x20 - CMakeLists.txt\n\
        \x20 - src/*\n\
        \x20 - include/*\n\
        \n\
        # by-version: pinned versions are cloned from versions.yaml\n\
        # exported: always build from exports_sources\n\
        source:\n\
        \x20 policy: by-version\n\
        \n\
        # What consumers link against, per linkage\n\
        publish:\n\
        \x20 shared:\n\
        \x20   libs: [{name}-shared]\n\
        \x20   alias: {name}::{name}Shared\n\
        \x20 static:\n\
        \x20   libs: [{name}-static]\n\
        \x20   alias: {name}::{name}Static\n"
    )
}

pub(crate) fn versions_template(latest: &str) -> String {
    format!(
        "# Version exported alongside the recipe\n\
        latest: \"{latest}\"\n\
        \n\
        # Pinned versions cloned from a repository\n\
        # sources:\n\
        #   \"0.0.1\":\n\
        #     url: https://example.com/repo.git\n\
        #     checkout: v0.0.1\n"
    )
}
