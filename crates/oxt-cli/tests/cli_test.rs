use assert_cmd::Command;
use assert_cmd::cargo;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

fn oxt() -> Command {
    Command::new(cargo::cargo_bin!("oxt"))
}

const PYPROJECT: &str = r#"
[project]
name = "example-extension"

[tool.oxt.token]
package_name = "pkgA"

[tool.oxt.requirements]
pkgA = ">=1.0.0,<2.0.0"
pkgB = ""
"#;

#[test]
fn test_normalize() {
    oxt()
        .args(["normalize", "^1.0; !=1.5"])
        .assert()
        .success()
        .stdout(">=1.0.0, <2.0.0, !=1.5.0\n");

    oxt().args(["normalize", "*"]).assert().success().stdout("==*\n");
}

#[test]
fn test_normalize_invalid() {
    oxt()
        .args(["normalize", "not a version"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid version string"));
}

#[test]
fn test_satisfies() {
    oxt()
        .args(["satisfies", "^1.2.3", "1.9.0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("satisfies >=1.2.3, <2.0.0"));

    oxt().args(["satisfies", "~1.2", "1.3.0", "-q"]).assert().code(1).stdout("");

    oxt().args(["satisfies", "invalid-garbage", "1.0.0"]).assert().code(2);
}

#[test]
fn test_check_requirements_met() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("pyproject.toml"), PYPROJECT).unwrap();
    fs::write(
        dir.path().join("installed.json"),
        r#"{"pkgA": "1.5.2", "pkgB": "3.0.0"}"#,
    )
    .unwrap();

    oxt()
        .current_dir(dir.path())
        .args(["check", "--installed", "installed.json", "--python-version", "3.11.4"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Requirements are met"));
}

#[test]
fn test_check_requirements_not_met() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("pyproject.toml"), PYPROJECT).unwrap();
    fs::write(dir.path().join("installed.json"), r#"{"pkgA": "2.1.0"}"#).unwrap();

    oxt()
        .current_dir(dir.path())
        .args(["check", "-i", "installed.json", "--python-version", "3.11.4"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Requirements not met: pkgA, pkgB"));
}

#[test]
fn test_check_json_output_with_override() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("pyproject.toml"), PYPROJECT).unwrap();
    fs::write(dir.path().join("installed.json"), r#"{"pkgA": "2.1.0"}"#).unwrap();

    let output = oxt()
        .current_dir(dir.path())
        .args([
            "check",
            "-i",
            "installed.json",
            "--python-version",
            "3.11.4",
            "--package-requirement",
            "^2.0",
            "--allow-absent-unconstrained",
            "--format",
            "json",
        ])
        .output()
        .unwrap();

    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["met"], true);
    assert_eq!(report["packages"][0]["requirement"], ">=2.0.0, <3.0.0");
    assert_eq!(report["packages"][0]["status"], "ok");
    assert_eq!(report["packages"][1]["status"], "ok");
}

#[test]
fn test_check_site_packages() {
    let dir = tempdir().unwrap();
    let site = dir.path().join("site-packages");
    fs::create_dir_all(site.join("pkgA-1.5.2.dist-info")).unwrap();
    fs::create_dir_all(site.join("pkgb-3.0.0.dist-info")).unwrap();
    let manifest = dir.path().join("pyproject.toml");
    fs::write(&manifest, PYPROJECT).unwrap();

    oxt()
        .args(["check", "--python-version", "3.11.4", "-m"])
        .arg(&manifest)
        .arg("--site-packages")
        .arg(&site)
        .assert()
        .success();
}

#[test]
fn test_check_without_installed_source() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("pyproject.toml"), PYPROJECT).unwrap();

    oxt()
        .current_dir(dir.path())
        .args(["check", "--python-version", "3.11.4"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No installed packages given"));
}

#[test]
fn test_check_unknown_format() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("pyproject.toml"), PYPROJECT).unwrap();

    oxt()
        .current_dir(dir.path())
        .args(["check", "-f", "yaml"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Unsupported format"));
}
