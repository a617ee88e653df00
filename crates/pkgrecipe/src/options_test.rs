// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0

use rstest::rstest;

use super::*;

fn declared(shared: bool, fpic: Option<bool>, gen_test: Option<bool>) -> OptionMatrix {
    let mut map = BTreeMap::new();
    map.insert(OptionName::Shared, shared);
    if let Some(fpic) = fpic {
        map.insert(OptionName::Fpic, fpic);
    }
    if let Some(gen_test) = gen_test {
        map.insert(OptionName::GenTest, gen_test);
    }
    OptionMatrix::from_declared(&map).expect("shared is declared")
}

fn all_matrices() -> Vec<OptionMatrix> {
    let mut matrices = Vec::new();
    for shared in [true, false] {
        for fpic in [None, Some(true), Some(false)] {
            for gen_test in [None, Some(true), Some(false)] {
                matrices.push(declared(shared, fpic, gen_test));
            }
        }
    }
    matrices
}

#[rstest]
fn test_from_declared_requires_shared() {
    let mut map = BTreeMap::new();
    map.insert(OptionName::GenTest, false);
    let err = OptionMatrix::from_declared(&map).unwrap_err();
    assert_eq!(err.kind(), crate::ErrorKind::Configuration);
}

#[rstest]
fn test_windows_never_has_fpic() {
    for matrix in all_matrices() {
        let pruned = matrix.prune(Os::Windows);
        assert!(!pruned.contains(OptionName::Fpic), "{matrix:?}");
    }
}

#[rstest]
fn test_static_never_has_fpic() {
    for os in Os::ALL {
        for matrix in all_matrices().into_iter().filter(|m| !m.shared()) {
            assert!(!matrix.prune(os).contains(OptionName::Fpic));
        }
    }
}

#[rstest]
fn test_prune_is_idempotent() {
    for os in Os::ALL {
        for matrix in all_matrices() {
            let once = matrix.prune(os);
            assert_eq!(once.prune(os), once);
        }
    }
}

#[rstest]
fn test_shared_linux_keeps_fpic() {
    let pruned = declared(true, Some(true), Some(false)).prune(Os::Linux);
    assert_eq!(pruned.get(OptionName::Fpic), Some(true));
    assert_eq!(pruned.get(OptionName::GenTest), Some(false));
    assert_eq!(pruned.linkage(), Linkage::Shared);
}

#[rstest]
fn test_prune_keeps_other_options() {
    let pruned = declared(false, Some(true), Some(true)).prune(Os::Windows);
    assert_eq!(
        pruned.iter().collect::<Vec<_>>(),
        vec![(OptionName::Shared, false), (OptionName::GenTest, true)]
    );
}

#[rstest]
fn test_overrides_apply_in_order() {
    let matrix = declared(true, Some(true), Some(false))
        .with_overrides([("shared", false), ("genTest", true), ("shared", true)])
        .unwrap();
    assert!(matrix.shared());
    assert_eq!(matrix.get(OptionName::GenTest), Some(true));
}

#[rstest]
#[case("lto")]
#[case("Shared")]
#[case("genTest")]
fn test_override_unrecognized_option(#[case] name: &str) {
    // genTest is a known option but this matrix does not declare it
    let err = declared(true, Some(true), None)
        .with_overrides([(name, true)])
        .unwrap_err();
    match err {
        Error::UnrecognizedOption { name: reported, declared } => {
            assert_eq!(reported, name);
            assert_eq!(declared, vec!["shared", "fPIC"]);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[rstest]
fn test_option_names_in_yaml() {
    let map: BTreeMap<OptionName, bool> =
        serde_yaml::from_str("shared: false\nfPIC: true\ngenTest: true\n").unwrap();
    assert_eq!(map.len(), 3);
    assert!(serde_yaml::from_str::<BTreeMap<OptionName, bool>>("fpic: true\n").is_err());
}

#[rstest]
#[case("true", true)]
#[case("False", false)]
#[case("1", true)]
#[case("off", false)]
fn test_parse_option_value(#[case] input: &str, #[case] expected: bool) {
    assert_eq!(parse_option_value(input).unwrap(), expected);
}

#[rstest]
fn test_parse_option_value_rejects_garbage() {
    assert!(parse_option_value("maybe").is_err());
}

#[rstest]
fn test_parse_assignment() {
    assert_eq!(
        parse_assignment("shared = False").unwrap(),
        ("shared".to_string(), "False".to_string())
    );
    assert!(parse_assignment("shared").is_err());
    assert!(parse_assignment("=true").is_err());
}

#[rstest]
#[case(true, Linkage::Shared)]
#[case(false, Linkage::Static)]
fn test_linkage_from_shared(#[case] shared: bool, #[case] expected: Linkage) {
    assert_eq!(Linkage::from(shared), expected);
}
