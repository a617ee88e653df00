// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0

use rstest::rstest;

use super::*;

#[rstest]
fn test_invocation_display() {
    let cmd = Invocation::new("git")
        .args(["checkout", "v1.0.0"])
        .arg("--")
        .current_dir("/tmp");
    assert_eq!(cmd.to_string(), "git checkout v1.0.0 --");
    assert_eq!(cmd.current_dir.as_deref(), Some(std::path::Path::new("/tmp")));
}

#[rstest]
#[case("", "")]
#[case("one\ntwo\n", "one\ntwo")]
fn test_stderr_tail_short(#[case] stderr: &str, #[case] expected: &str) {
    let output = ToolOutput {
        stderr: stderr.to_string(),
        ..Default::default()
    };
    assert_eq!(output.stderr_tail(), expected);
}

#[rstest]
fn test_stderr_tail_keeps_last_lines() {
    let stderr: String = (0..50).map(|i| format!("line {i}\n")).collect();
    let output = ToolOutput {
        stderr,
        ..Default::default()
    };
    let tail = output.stderr_tail();
    assert_eq!(tail.lines().count(), STDERR_TAIL_LINES);
    assert!(tail.starts_with("line 30"));
    assert!(tail.ends_with("line 49"));
}

#[tokio::test]
async fn test_missing_program_fails_to_start() {
    let cmd = Invocation::new("pkgrecipe-definitely-not-a-real-tool");
    let err = ProcessRunner.run(&cmd).await.unwrap_err();
    assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
}
