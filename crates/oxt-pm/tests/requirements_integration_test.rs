/// Integration tests for requirement checking
///
/// These tests load manifests and installed packages from disk and verify
/// the classification of every declared package.

use oxt_pm::{
    Environment, Manifest, PackageLookup, PackageStatus, PinnedStatus, Platform, RequirementPolicy,
    RequirementSpec, RequirementsCheck, SitePackages,
};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn installed(entries: &[(&str, &str)]) -> HashMap<String, String> {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn write_dist_info(site: &Path, dir_name: &str, metadata: Option<&str>) {
    let dir = site.join(dir_name);
    fs::create_dir_all(&dir).unwrap();
    if let Some(metadata) = metadata {
        fs::write(dir.join("METADATA"), metadata).unwrap();
    }
}

#[test]
fn test_requirements_met() {
    let spec: RequirementSpec = [("pkgA", ">=1.0.0,<2.0.0"), ("pkgB", "")].into_iter().collect();
    let lookup = installed(&[("pkgA", "1.5.2"), ("pkgB", "3.0.0")]);

    let report = RequirementsCheck::new(&spec, &lookup).report();

    assert!(report.met);
    assert_eq!(report.packages[0].status, PackageStatus::Ok);
    assert_eq!(report.packages[1].status, PackageStatus::Ok);
}

#[test]
fn test_requirements_not_met() {
    let spec: RequirementSpec = [("pkgA", ">=1.0.0,<2.0.0"), ("pkgB", "")].into_iter().collect();
    let lookup = installed(&[("pkgA", "2.1.0")]);

    let report = RequirementsCheck::new(&spec, &lookup).report();

    assert!(!report.met);
    assert_eq!(report.packages[0].status, PackageStatus::VersionMismatch);
    assert_eq!(report.packages[0].code, 1);
    assert_eq!(report.packages[1].status, PackageStatus::NotInstalled);
    assert_eq!(report.packages[1].code, 2);
    assert_eq!(report.failures(), vec!["pkgA", "pkgB"]);
}

#[test]
fn test_requirements_not_met_with_absent_allowed() {
    let spec: RequirementSpec = [("pkgA", ">=1.0.0,<2.0.0"), ("pkgB", "")].into_iter().collect();
    let lookup = installed(&[("pkgA", "2.1.0")]);
    let policy = RequirementPolicy {
        allow_absent_unconstrained: true,
    };

    let report = RequirementsCheck::new(&spec, &lookup).with_policy(policy).report();

    assert!(!report.met);
    assert_eq!(report.packages[0].status, PackageStatus::VersionMismatch);
    assert_eq!(report.packages[1].status, PackageStatus::Ok);
}

#[test]
fn test_pinned_packages_respect_environment() {
    let toml = r#"
[tool.oxt.requirements]
verr = ">=1.1.0"

[[tool.oxt.py_packages]]
name = "pywin32"
version = "306"
platforms = ["win"]

[[tool.oxt.py_packages]]
name = "tomli"
version = "2.0"
restriction = "^"
python_versions = ["<3.11"]

[[tool.oxt.py_packages]]
name = "lxml"
version = "5.0"
ignore_platforms = ["flatpak"]
"#;
    let manifest = Manifest::from_pyproject_str(toml).unwrap();
    let lookup = installed(&[("verr", "1.1.2"), ("tomli", "2.0.1")]);

    // Linux, Python 3.10, flatpak: pywin32 and lxml do not apply, tomli must be ^2.0
    let env = Environment::new(Platform::Linux)
        .with_sandbox(Platform::Flatpak)
        .with_python_version("3.10.12");
    let report = RequirementsCheck::new(&manifest.requirements, &lookup)
        .with_py_packages(&manifest.py_packages, env)
        .report();

    let statuses: Vec<PinnedStatus> = report.pinned.iter().map(|p| p.status).collect();
    assert_eq!(
        statuses,
        vec![PinnedStatus::Skipped, PinnedStatus::Ok, PinnedStatus::Skipped]
    );
    assert_eq!(report.pinned[1].requirement, "^2.0");
    assert!(report.met);

    // Plain Linux, Python 3.12: tomli is skipped but lxml is required and missing
    let env = Environment::new(Platform::Linux).with_python_version("3.12.1");
    let report = RequirementsCheck::new(&manifest.requirements, &lookup)
        .with_py_packages(&manifest.py_packages, env)
        .report();

    let statuses: Vec<PinnedStatus> = report.pinned.iter().map(|p| p.status).collect();
    assert_eq!(
        statuses,
        vec![PinnedStatus::Skipped, PinnedStatus::Skipped, PinnedStatus::NotInstalled]
    );
    assert!(!report.met);
    assert_eq!(report.failures(), vec!["lxml"]);
}

#[test]
fn test_pinned_version_mismatch() {
    let json = r#"{"py_packages": [{"name": "numpy", "version": "1.26", "restriction": "~="}]}"#;
    let manifest = Manifest::from_json_str(json).unwrap();
    let lookup = installed(&[("numpy", "2.0.0")]);

    let report = RequirementsCheck::new(&manifest.requirements, &lookup)
        .with_py_packages(&manifest.py_packages, Environment::new(Platform::Linux))
        .report();

    assert_eq!(report.pinned[0].status, PinnedStatus::VersionMismatch);
    assert_eq!(report.pinned[0].installed.as_deref(), Some("2.0.0"));
    assert!(!report.met);
}

#[test]
fn test_manifest_load_searches_upward() {
    let temp_dir = TempDir::new().unwrap();
    let nested = temp_dir.path().join("src").join("pkg");
    fs::create_dir_all(&nested).unwrap();
    fs::write(
        temp_dir.path().join("pyproject.toml"),
        "[tool.oxt.requirements]\nverr = \">=1.1.0\"\n",
    )
    .unwrap();

    let manifest = Manifest::load(&nested).unwrap().unwrap();

    assert_eq!(manifest.requirements.get("verr"), Some(">=1.1.0"));
    assert_eq!(
        manifest.path.as_deref(),
        Some(temp_dir.path().join("pyproject.toml").as_path())
    );
}

#[test]
fn test_manifest_load_without_pyproject() {
    let temp_dir = TempDir::new().unwrap();
    // The temp dir may live under a directory that has a pyproject.toml, so
    // only check that loading does not fail.
    assert!(Manifest::load(temp_dir.path()).is_ok());
}

#[test]
fn test_manifest_from_json_file() {
    let temp_dir = TempDir::new().unwrap();
    let config = temp_dir.path().join("config.json");
    fs::write(&config, r#"{"requirements": {"verr": "^1.1"}, "package_name": "verr"}"#).unwrap();

    let manifest = Manifest::from_path(&config).unwrap();

    assert_eq!(manifest.requirements.get("verr"), Some("^1.1"));
    assert_eq!(manifest.package_name.as_deref(), Some("verr"));
}

#[test]
fn test_site_packages_scan() {
    let temp_dir = TempDir::new().unwrap();
    let user_site = temp_dir.path().join("user");
    let system_site = temp_dir.path().join("system");
    fs::create_dir_all(&user_site).unwrap();
    fs::create_dir_all(&system_site).unwrap();

    write_dist_info(&user_site, "ooo_dev_tools-0.47.1.dist-info", None);
    write_dist_info(&system_site, "ooo_dev_tools-0.40.0.dist-info", None);
    write_dist_info(&system_site, "Verr-1.1.2.dist-info", None);
    fs::create_dir_all(system_site.join("legacy.egg-info")).unwrap();
    fs::write(
        system_site.join("legacy.egg-info").join("PKG-INFO"),
        "Metadata-Version: 1.0\nName: legacy\nVersion: 0.3\n",
    )
    .unwrap();
    fs::write(system_site.join("six-1.16.0-py3.11.egg-info"), "Name: six\n").unwrap();
    fs::write(system_site.join("not_metadata.py"), "").unwrap();

    let site = SitePackages::scan(&[&user_site, &system_site, &temp_dir.path().join("missing")]).unwrap();

    assert_eq!(site.len(), 4);
    assert_eq!(site.installed_version("ooo-dev-tools"), Some("0.47.1".to_string()));
    assert_eq!(site.installed_version("verr"), Some("1.1.2".to_string()));
    assert_eq!(site.installed_version("legacy"), Some("0.3".to_string()));
    assert_eq!(site.installed_version("six"), Some("1.16.0".to_string()));
    assert_eq!(site.installed_version("numpy"), None);

    let spec: RequirementSpec = [("ooo-dev-tools", "^0.47"), ("verr", ">=1.1.0")].into_iter().collect();
    assert!(RequirementsCheck::new(&spec, &site).check_requirements());
}

#[test]
fn test_global_spec_is_set_once() {
    let first: RequirementSpec = [("verr", ">=1.0")].into_iter().collect();
    let second: RequirementSpec = [("other", "")].into_iter().collect();

    assert!(RequirementSpec::set_global(first.clone()));
    assert!(!RequirementSpec::set_global(second));
    assert_eq!(RequirementSpec::global(), Some(&first));
}
