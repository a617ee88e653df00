// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0

use rstest::{fixture, rstest};

use super::*;

#[fixture]
fn metadata() -> VersionMetadata {
    VersionMetadata::from_yaml(
        r#"
latest: "1.2.0"
sources:
  "1.0.0":
    url: https://github.com/hyfloac/TauUtils.git
    checkout: v1.0.0
  "1.1.0":
    url: https://github.com/hyfloac/TauUtils.git
    checkout: 3f2a9c1
"#,
    )
    .expect("Should parse version metadata")
}

#[rstest]
#[case(None)]
#[case(Some("latest"))]
#[case(Some("1.2.0"))]
fn test_resolve_latest(metadata: VersionMetadata, #[case] requested: Option<&str>) {
    let data = resolve_version(&metadata, requested).unwrap();
    assert_eq!(data, VersionData::local("1.2.0"));
    assert!(data.source_url.is_none());
}

#[rstest]
fn test_resolve_pinned(metadata: VersionMetadata) {
    let data = resolve_version(&metadata, Some("1.1.0")).unwrap();
    assert!(!data.is_latest);
    assert_eq!(data.version, "1.1.0");
    assert_eq!(
        data.source_url.as_deref(),
        Some("https://github.com/hyfloac/TauUtils.git")
    );
    assert_eq!(data.checkout_target.as_deref(), Some("3f2a9c1"));
}

#[rstest]
fn test_resolve_unknown_version(metadata: VersionMetadata) {
    match resolve_version(&metadata, Some("9.9.9")).unwrap_err() {
        Error::UnknownVersion { version, known } => {
            assert_eq!(version, "9.9.9");
            assert_eq!(known, vec!["1.0.0", "1.1.0", "1.2.0"]);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[rstest]
fn test_missing_latest_is_configuration_error() {
    let err = VersionMetadata::from_yaml("sources: {}\n").unwrap_err();
    assert!(matches!(err, Error::MissingLatest));
    assert_eq!(err.kind(), crate::ErrorKind::Configuration);
}

#[rstest]
fn test_empty_latest_is_rejected() {
    assert!(matches!(
        VersionMetadata::from_yaml("latest: \"  \"\n").unwrap_err(),
        Error::MissingLatest
    ));
}

#[rstest]
fn test_malformed_metadata() {
    let err = VersionMetadata::from_yaml("latest: [1.0\n").unwrap_err();
    assert!(matches!(err, Error::InvalidYaml { .. }));
}

#[rstest]
fn test_load_missing_file() {
    let tmp = tempfile::TempDir::new().unwrap();
    let err = VersionMetadata::load(tmp.path().join("versions.yaml")).unwrap_err();
    assert!(matches!(err, Error::NotFoundAtPath { .. }));
    assert_eq!(err.kind(), crate::ErrorKind::Configuration);
}

#[rstest]
#[case("", "v1.0", "url")]
#[case("https://example.com/repo.git", " ", "checkout")]
fn test_pinned_requires_url_and_checkout(
    #[case] url: &str,
    #[case] checkout: &str,
    #[case] missing: &str,
) {
    let data = VersionData::pinned("1.0", url, checkout);
    match data.validate().unwrap_err() {
        Error::IncompleteSource { field, .. } => assert_eq!(field, missing),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[rstest]
fn test_resolve_incomplete_source_entry() {
    let metadata = VersionMetadata::from_yaml(
        r#"
latest: "2.0"
sources:
  "1.0":
    checkout: v1.0
"#,
    )
    .unwrap();
    let err = resolve_version(&metadata, Some("1.0")).unwrap_err();
    assert!(matches!(err, Error::IncompleteSource { field: "url", .. }));
}

#[rstest]
fn test_latest_listed_in_sources_is_pinned() {
    let metadata = VersionMetadata::from_yaml(
        r#"
latest: "2.0"
sources:
  "2.0":
    url: https://example.com/repo.git
    checkout: v2.0
"#,
    )
    .unwrap();
    // An explicit request follows the sources entry, the bare request does not.
    assert!(!resolve_version(&metadata, Some("2.0")).unwrap().is_latest);
    assert!(resolve_version(&metadata, None).unwrap().is_latest);
}
