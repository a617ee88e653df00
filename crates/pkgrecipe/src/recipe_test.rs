// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0

use rstest::rstest;
use tempfile::TempDir;

use super::*;

const TAUUTILS_RECIPE: &str = r#"
api: recipe/v0
name: tauutils
license: MIT
author: Hyfloac <mail@hyfloac.com>
url: https://github.com/hyfloac/TauUtils
description: ""
options:
  shared: true
  fPIC: true
  genTest: false
exports_sources:
  - CMakeLists.txt
  - TauUtilsDynamic/*
  - cmake/*
publish:
  shared:
    libs: [tauutils-dynamic-shared]
    alias: tauutils::TauUtilsDynamicShared
  static:
    libs: [tauutils-dynamic-static]
    alias: tauutils::TauUtilsDynamicStatic
"#;

#[rstest]
fn test_parse_full_recipe() {
    let spec = RecipeSpec::from_yaml(TAUUTILS_RECIPE).expect("Should parse recipe");
    assert_eq!(spec.api, ApiVersion::V0);
    assert_eq!(spec.name, "tauutils");
    assert_eq!(spec.options.len(), 3);
    assert_eq!(spec.exports_sources.len(), 3);
    assert_eq!(spec.source.policy, SourcePolicy::ByVersion);
    assert_eq!(
        spec.publish.shared.build_system_alias,
        "tauutils::TauUtilsDynamicShared"
    );
    assert!(spec.source_path.is_none());

    let metadata = spec.metadata();
    assert_eq!(metadata.license, "MIT");
    assert_eq!(metadata.author, "Hyfloac <mail@hyfloac.com>");
}

#[rstest]
fn test_declared_defaults() {
    let spec = RecipeSpec::from_yaml(TAUUTILS_RECIPE).unwrap();
    let options = spec.declared_options().unwrap();
    assert!(options.shared());
    assert_eq!(options.get(OptionName::Fpic), Some(true));
    assert_eq!(options.get(OptionName::GenTest), Some(false));
}

#[rstest]
fn test_parse_exported_policy() {
    let yaml = TAUUTILS_RECIPE.replace("exports_sources:", "source:\n  policy: exported\nexports_sources:");
    let spec = RecipeSpec::from_yaml(yaml).unwrap();
    assert_eq!(spec.source.policy, SourcePolicy::Exported);
}

#[rstest]
#[case::unknown_option("  genTest: false\n", "  genTest: false\n  lto: true\n")]
#[case::unknown_field("description: \"\"\n", "description: \"\"\nsettings: [os]\n")]
#[case::missing_shared("  shared: true\n", "")]
#[case::empty_alias("alias: tauutils::TauUtilsDynamicStatic", "alias: \"\"")]
#[case::empty_libs("libs: [tauutils-dynamic-shared]", "libs: []")]
#[case::bad_name("name: tauutils", "name: tau utils")]
#[case::escaping_export("  - cmake/*", "  - ../cmake/*")]
#[case::bad_api("api: recipe/v0", "api: recipe/v9")]
fn test_invalid_recipes(#[case] from: &str, #[case] to: &str) {
    let yaml = TAUUTILS_RECIPE.replace(from, to);
    assert_ne!(yaml, TAUUTILS_RECIPE);
    let err = RecipeSpec::from_yaml(yaml).expect_err("Should reject recipe");
    assert_eq!(err.kind(), crate::ErrorKind::Configuration);
}

#[rstest]
fn test_load_sets_source_path() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join(crate::RECIPE_FILENAME);
    std::fs::write(&path, TAUUTILS_RECIPE).unwrap();

    let spec = RecipeSpec::load(&path).unwrap();
    let expected = dunce::canonicalize(&path).unwrap();
    assert_eq!(spec.source_path.as_deref(), Some(expected.as_path()));
    assert_eq!(spec.recipe_dir().unwrap(), expected.parent().unwrap());
}

#[rstest]
fn test_load_missing_recipe() {
    let tmp = TempDir::new().unwrap();
    let err = RecipeSpec::load(tmp.path().join(crate::RECIPE_FILENAME)).unwrap_err();
    assert!(matches!(err, Error::NotFoundAtPath { .. }));
}

#[rstest]
fn test_load_versions_next_to_recipe() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join(crate::RECIPE_FILENAME);
    std::fs::write(&path, TAUUTILS_RECIPE).unwrap();
    std::fs::write(tmp.path().join(VERSIONS_FILENAME), "latest: \"0.3.0\"\n").unwrap();

    let spec = RecipeSpec::load(&path).unwrap();
    let versions = spec.load_versions().unwrap();
    assert_eq!(versions.latest().unwrap(), "0.3.0");
}

#[rstest]
fn test_locate_recipe() {
    let tmp = TempDir::new().unwrap();
    assert!(locate_recipe(tmp.path()).is_err());

    let path = tmp.path().join(crate::RECIPE_FILENAME);
    std::fs::write(&path, TAUUTILS_RECIPE).unwrap();
    assert_eq!(locate_recipe(tmp.path()).unwrap(), path);
    assert_eq!(locate_recipe(&path).unwrap(), path);
}
