// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0

use std::collections::BTreeMap;

use rstest::{fixture, rstest};
use tempfile::TempDir;

use super::*;
use crate::options::{OptionMatrix, OptionName};
use crate::plan::generate_plan;
use crate::settings::{BuildType, Os, Settings};
use crate::test_runner::RecordingRunner;

#[fixture]
fn plan() -> BuildPlan {
    let settings = Settings {
        os: Os::Linux,
        compiler: "gcc".to_string(),
        build_type: BuildType::Debug,
        arch: "x86_64".to_string(),
    };
    let declared = BTreeMap::from([(OptionName::Shared, true), (OptionName::Fpic, true)]);
    let options = OptionMatrix::from_declared(&declared).unwrap().prune(settings.os);
    generate_plan(&settings, &options)
}

fn paths(plan: &BuildPlan, tmp: &TempDir) -> DriverPaths {
    DriverPaths::new(plan, &tmp.path().join("src"), tmp.path())
}

#[rstest]
fn test_configure_invocation(plan: BuildPlan) {
    let tmp = TempDir::new().unwrap();
    let paths = paths(&plan, &tmp);
    let cmd = BuildDriver::new("cmake").invocation(Phase::Configure, &plan, &paths);

    assert_eq!(cmd.program, "cmake");
    assert_eq!(cmd.args[0], "-S");
    assert_eq!(cmd.args[1], paths.source_dir.display().to_string());
    assert!(cmd.args.contains(&format!(
        "-DCMAKE_TOOLCHAIN_FILE={}",
        paths.toolchain_file.display()
    )));
    assert!(cmd.args.contains(&"-DBUILD_SHARED_LIBS:BOOL=ON".to_string()));
    assert!(cmd.args.contains(&"-DCMAKE_POSITION_INDEPENDENT_CODE:BOOL=ON".to_string()));
    assert_eq!(cmd.current_dir.as_deref(), Some(paths.source_dir.as_path()));
}

#[rstest]
fn test_build_and_install_use_build_type(plan: BuildPlan) {
    let tmp = TempDir::new().unwrap();
    let paths = paths(&plan, &tmp);
    let driver = BuildDriver::new("cmake");

    let build = driver.invocation(Phase::Build, &plan, &paths);
    assert_eq!(
        build.args,
        vec![
            "--build".to_string(),
            paths.build_dir.display().to_string(),
            "--config".to_string(),
            "Debug".to_string(),
        ]
    );

    let install = driver.invocation(Phase::Install, &plan, &paths);
    assert_eq!(install.args[0], "--install");
    assert_eq!(
        install.args.last(),
        Some(&paths.package_dir.display().to_string())
    );
}

#[rstest]
#[tokio::test]
async fn test_phases_run_in_order(plan: BuildPlan) {
    let tmp = TempDir::new().unwrap();
    let paths = paths(&plan, &tmp);
    let runner = RecordingRunner::new();

    BuildDriver::new("cmake")
        .run(&plan, &paths, &runner)
        .await
        .unwrap();

    assert_eq!(runner.steps(), vec!["-S", "--build", "--install"]);
    let toolchain = std::fs::read_to_string(&paths.toolchain_file).unwrap();
    assert_eq!(toolchain, plan.toolchain_script());
}

#[rstest]
#[case("-S", Phase::Configure, vec!["-S"])]
#[case("--build", Phase::Build, vec!["-S", "--build"])]
#[case("--install", Phase::Install, vec!["-S", "--build", "--install"])]
#[tokio::test]
async fn test_failure_stops_later_phases(
    plan: BuildPlan,
    #[case] failing: &str,
    #[case] expected_phase: Phase,
    #[case] expected_steps: Vec<&str>,
) {
    let tmp = TempDir::new().unwrap();
    let paths = paths(&plan, &tmp);
    let runner = RecordingRunner::new().fail_on(failing);

    let err = BuildDriver::new("cmake")
        .run(&plan, &paths, &runner)
        .await
        .unwrap_err();

    match &err {
        Error::PhaseFailed { phase, .. } => assert_eq!(*phase, expected_phase),
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(err.kind(), crate::ErrorKind::Build);
    assert_eq!(runner.steps(), expected_steps);
}

#[rstest]
#[tokio::test]
async fn test_missing_cmake_is_build_error(plan: BuildPlan) {
    let tmp = TempDir::new().unwrap();
    let paths = paths(&plan, &tmp);
    let runner = RecordingRunner::new().missing_program("cmake");

    let err = BuildDriver::new("cmake")
        .run(&plan, &paths, &runner)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::PhaseFailed {
            phase: Phase::Configure,
            ..
        }
    ));
    assert_eq!(runner.steps(), vec!["-S"]);
}

#[rstest]
fn test_phase_names() {
    let names: Vec<String> = Phase::ORDER.iter().map(Phase::to_string).collect();
    assert_eq!(names, vec!["configure", "build", "install"]);
}
