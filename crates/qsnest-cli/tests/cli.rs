//! Run the `qsnest` binary end to end.

use std::process::{Command, Output};

fn qsnest(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_qsnest"))
        .args(args)
        .env_remove("QSNEST_LOG")
        .output()
        .expect("failed to run qsnest")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).trim_end().to_string()
}

#[test]
fn test_parse_nested() {
    let output = qsnest(&["parse", "nested", "a[]=what&a[subkey]=is&a[]=this"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output), r#"{"a":{"":"this","subkey":"is"}}"#);
}

#[test]
fn test_parse_simplistic() {
    let output = qsnest(&["parse", "simplistic", "a=1&a=2&b"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output), r#"[["a","1"],["a","2"],["b",null]]"#);
}

#[test]
fn test_build_nested() {
    let output = qsnest(&["build", "nested", r#"{"colors":["orange","rebeccapurple"]}"#]);
    assert!(output.status.success());
    assert_eq!(stdout(&output), "colors[]=orange&colors[]=rebeccapurple");

    let output = qsnest(&[
        "build",
        "nested",
        r#"{"a":["x","y"]}"#,
        "--sequence-style",
        "index",
    ]);
    assert_eq!(stdout(&output), "a[0]=x&a[1]=y");
}

#[test]
fn test_exit_codes() {
    let output = qsnest(&["build", "nested", "{not json"]);
    assert_eq!(output.status.code(), Some(2));

    let output = qsnest(&["build", "nested", r#"["a"]"#]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("unsupported shape"));

    let output = qsnest(&["parse", "nested", "a[b][c]=1", "--max-depth", "1"]);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_diagnostics_rendered() {
    let output = qsnest(&["parse", "nested", "a=%zz", "--diagnostics"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output), r#"{"a":"%zz"}"#);
    assert!(String::from_utf8_lossy(&output.stderr).contains("malformed percent-encoding"));
}
