// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0

use rstest::{fixture, rstest};
use tempfile::TempDir;

use super::*;

#[fixture]
fn base() -> Settings {
    Settings {
        os: Os::Linux,
        compiler: "gcc".to_string(),
        build_type: BuildType::Release,
        arch: "x86_64".to_string(),
    }
}

#[rstest]
fn test_parse_profile() {
    let profile = Profile::from_yaml(
        r#"
api: profile/v0
settings:
  os: Windows
  compiler: msvc
options:
  shared: false
"#,
    )
    .unwrap();
    assert_eq!(profile.settings.os, Some(Os::Windows));
    assert_eq!(profile.settings.compiler.as_deref(), Some("msvc"));
    assert_eq!(profile.settings.build_type, None);
    assert_eq!(profile.options.get("shared"), Some(&false));
}

#[rstest]
fn test_empty_profile_is_default() {
    let profile = Profile::from_yaml("{}").unwrap();
    assert_eq!(profile, Profile::default());
}

#[rstest]
#[case("settings:\n  target: arm\n")]
#[case("settings:\n  os: Plan9\n")]
#[case("api: profile/v9\n")]
#[case("extra: true\n")]
fn test_invalid_profile(#[case] yaml: &str) {
    let err = Profile::from_yaml(yaml).unwrap_err();
    assert!(matches!(err, Error::InvalidYaml { what: "profile", .. }));
}

#[rstest]
fn test_apply_keeps_unset_fields(base: Settings) {
    let profile = Profile::from_yaml("settings:\n  build_type: Debug\n  arch: armv8\n").unwrap();
    let applied = profile.apply_to(&base).unwrap();
    assert_eq!(applied.os, Os::Linux);
    assert_eq!(applied.compiler, "gcc");
    assert_eq!(applied.build_type, BuildType::Debug);
    assert_eq!(applied.arch, "armv8");
}

#[rstest]
fn test_lowercase_setting_names(base: Settings) {
    let profile = Profile::from_yaml("settings:\n  os: linux\n  build_type: debug\n").unwrap();
    assert_eq!(profile.settings.os, Some(Os::Linux));
    assert_eq!(profile.settings.build_type, Some(BuildType::Debug));
    let applied = profile.apply_to(&base).unwrap();
    assert_eq!(applied.build_type, BuildType::Debug);
}

#[rstest]
fn test_apply_validates(base: Settings) {
    let profile = Profile::from_yaml("settings:\n  compiler: \"\"\n").unwrap();
    assert!(profile.apply_to(&base).is_err());
}

#[rstest]
fn test_load() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("windows.yaml");
    std::fs::write(&path, "settings:\n  os: Windows\n").unwrap();

    let profile = Profile::load(&path).unwrap();
    assert_eq!(profile.settings.os, Some(Os::Windows));

    let err = Profile::load(tmp.path().join("missing.yaml")).unwrap_err();
    assert!(matches!(err, Error::NotFoundAtPath { what: "Profile", .. }));
}

#[rstest]
#[case("./profiles/ci.yaml")]
#[case("ci.yaml")]
#[case("/etc/pkgrecipe/ci")]
fn test_resolve_path_reference(#[case] reference: &str) {
    assert_eq!(resolve_profile_path(reference).unwrap(), PathBuf::from(reference));
}

#[rstest]
fn test_resolve_named_reference() {
    let Some(dir) = profiles_dir() else {
        return;
    };
    assert_eq!(resolve_profile_path("windows").unwrap(), dir.join("windows.yaml"));
}
