//! End-to-end tests for the genschema binary.

use assert_cmd::Command;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn tempdir() -> TempDir {
    tempfile::Builder::new().prefix("genschema").tempdir().unwrap()
}

/// Run genschema in `cwd` with an empty global config.
fn genschema(cwd: &Path) -> Command {
    let mut cmd = Command::cargo_bin("genschema").unwrap();
    cmd.current_dir(cwd)
        .env("XDG_CONFIG_HOME", cwd.join(".config-home"))
        .env_remove("RUST_LOG");
    cmd
}

fn stdout(cmd: &mut Command) -> (String, Option<i32>) {
    let output = cmd.output().expect("failed to execute genschema");
    (
        String::from_utf8_lossy(&output.stdout).to_string(),
        output.status.code(),
    )
}

const SHAPES: &str = r#"package shapes

// Point is a position on the plane.
type Point struct {
	X int32 // X coordinate
	Y int32 // Y coordinate
}

type Line struct {
	A *Point
	B []Point
}

func (l Line) Length() float64 { return 0 }
"#;

#[test]
fn test_current_directory_default() {
    let dir = tempdir();
    fs::write(dir.path().join("shapes.go"), SHAPES).unwrap();
    fs::write(dir.path().join("shapes_test.go"), "package shapes\n\ntype Fixture struct{}\n").unwrap();

    let (out, code) = stdout(genschema(dir.path()).arg("--compact"));
    assert_eq!(code, Some(0));
    insta::assert_snapshot!(out, @r#"
    === Point ===
    {"X":{"type":"integer","description":"X coordinate"},"Y":{"type":"integer","description":"Y coordinate"}}
    === Line ===
    {"A":{"type":"object","properties":{"X":{"type":"integer","description":"X coordinate"},"Y":{"type":"integer","description":"Y coordinate"}},"description":""},"B":{"type":"array","items":{"type":"object","properties":{"X":{"type":"integer","description":"X coordinate"},"Y":{"type":"integer","description":"Y coordinate"}}},"description":""}}
    "#);
}

#[test]
fn test_not_a_directory() {
    let dir = tempdir();
    let file = dir.path().join("shapes.go");
    fs::write(&file, SHAPES).unwrap();

    let output = genschema(dir.path()).arg(&file).output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("genschema: not a directory:"));
}

#[test]
fn test_parse_failure_continues() {
    let dir = tempdir();
    fs::create_dir_all(dir.path().join("good")).unwrap();
    fs::create_dir_all(dir.path().join("bad")).unwrap();
    fs::write(dir.path().join("good/shapes.go"), SHAPES).unwrap();
    fs::write(dir.path().join("bad/broken.go"), "package bad\n\ntype B struct {\n").unwrap();

    let output = genschema(dir.path())
        .args(["bad", "good", "--compact"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("=== Point ===\n"));
    assert!(stdout.contains("=== Line ===\n"));

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("broken.go:"));
}

#[test]
fn test_unresolved_placeholder_and_config() {
    let dir = tempdir();
    fs::write(
        dir.path().join("user.go"),
        "package user\n\ntype User struct {\n\tName string `json:\"name\"`\n\tAddress Address\n\tScore float64\n}\n",
    )
    .unwrap();

    let (out, code) = stdout(genschema(dir.path()).arg("--compact"));
    assert_eq!(code, Some(0));
    assert_eq!(
        out,
        "=== User ===\n{\"name\":{\"type\":\"string\",\"description\":\"\"},\"Address\":{\"description\":\"\"},\"Score\":{\"type\":\"??\",\"description\":\"\"}}\n"
    );

    let (out, _) = stdout(
        genschema(dir.path()).args(["--compact", "--unresolved", "placeholder", "--no-json-tags"]),
    );
    assert!(out.contains(r#""Name":{"type":"string""#));
    assert!(out.contains(r#""Address":{"type":"??","description":""}"#));

    fs::create_dir_all(dir.path().join(".genschema")).unwrap();
    fs::write(
        dir.path().join(".genschema/config.toml"),
        "[render]\npretty = false\nunresolved = \"placeholder\"\n",
    )
    .unwrap();
    let (out, _) = stdout(&mut genschema(dir.path()));
    assert!(out.contains(r#""Address":{"type":"??","description":""}"#));
}

#[test]
fn test_output_file() {
    let dir = tempdir();
    fs::write(dir.path().join("shapes.go"), SHAPES).unwrap();

    let (out, code) = stdout(genschema(dir.path()).args(["-o", "schema.txt"]));
    assert_eq!(code, Some(0));
    assert!(out.is_empty());

    let written = fs::read_to_string(dir.path().join("schema.txt")).unwrap();
    assert!(written.starts_with("=== Point ===\n{\n  \"X\": {\n"));
}

#[test]
fn test_recursive() {
    let dir = tempdir();
    fs::create_dir_all(dir.path().join("api/v1")).unwrap();
    fs::write(
        dir.path().join("api/v1/types.go"),
        "package v1\n\ntype Status struct{ Ok bool }\n",
    )
    .unwrap();

    let (out, _) = stdout(genschema(dir.path()).arg("--compact"));
    assert!(out.is_empty());

    let (out, code) = stdout(genschema(dir.path()).args(["--compact", "--recursive"]));
    assert_eq!(code, Some(0));
    assert_eq!(
        out,
        "=== Status ===\n{\"Ok\":{\"type\":\"boolean\",\"description\":\"\"}}\n"
    );
}
