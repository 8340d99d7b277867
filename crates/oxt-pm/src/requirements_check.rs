//! Checks whether the declared requirements are met by the installed packages.
//!
//! Every declared package is classified on its own; the overall result is
//! `true` only when every package passes and every pinned package that
//! applies to the current environment is satisfied. The check never returns
//! an error: problems are reported as classifications and logged.

use std::fmt;

use oxt_semver::{Rule, VerRules};
use serde::Serialize;

use crate::environment::Environment;
use crate::installed::PackageLookup;
use crate::py_package::PyPackage;
use crate::requirement_spec::RequirementSpec;

/// Classification of one declared package
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PackageStatus {
    /// Installed and the requirement is met
    Ok,
    /// Installed but the requirement is not met
    VersionMismatch,
    /// Not installed
    NotInstalled,
    /// The requirement string produced no rule
    Invalid,
}

impl PackageStatus {
    /// Numeric code: `0` ok, `1` mismatch, `2` not installed, `-1` invalid
    pub fn code(self) -> i32 {
        match self {
            PackageStatus::Ok => 0,
            PackageStatus::VersionMismatch => 1,
            PackageStatus::NotInstalled => 2,
            PackageStatus::Invalid => -1,
        }
    }

    /// Whether the package counts as passing.
    ///
    /// An invalid requirement is treated as no requirement so one typo in the
    /// configuration does not block every install.
    pub fn is_pass(self) -> bool {
        matches!(self, PackageStatus::Ok | PackageStatus::Invalid)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PackageStatus::Ok => "ok",
            PackageStatus::VersionMismatch => "version mismatch",
            PackageStatus::NotInstalled => "not installed",
            PackageStatus::Invalid => "invalid requirement",
        }
    }
}

impl fmt::Display for PackageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classification of one pinned `py_packages` entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PinnedStatus {
    Ok,
    VersionMismatch,
    NotInstalled,
    /// Platform or Python version restrictions exclude this environment
    Skipped,
}

impl PinnedStatus {
    pub fn is_pass(self) -> bool {
        matches!(self, PinnedStatus::Ok | PinnedStatus::Skipped)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PinnedStatus::Ok => "ok",
            PinnedStatus::VersionMismatch => "version mismatch",
            PinnedStatus::NotInstalled => "not installed",
            PinnedStatus::Skipped => "skipped",
        }
    }
}

impl fmt::Display for PinnedStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How edge cases are classified
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequirementPolicy {
    /// Treat an absent package whose requirement accepts every version (empty, `*`) as met
    pub allow_absent_unconstrained: bool,
}

/// Result for one declared package
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageReport {
    pub name: String,
    pub requirement: String,
    pub installed: Option<String>,
    pub status: PackageStatus,
    pub code: i32,
}

/// Result for one pinned package
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PinnedReport {
    pub name: String,
    pub requirement: String,
    pub installed: Option<String>,
    pub status: PinnedStatus,
}

/// Result of a full requirement check
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CheckReport {
    pub packages: Vec<PackageReport>,
    pub pinned: Vec<PinnedReport>,
    pub met: bool,
}

impl CheckReport {
    /// Packages whose requirement string produced no rule
    pub fn invalid(&self) -> impl Iterator<Item = &PackageReport> {
        self.packages
            .iter()
            .filter(|p| p.status == PackageStatus::Invalid)
    }

    /// Packages and pinned packages that fail
    pub fn failures(&self) -> Vec<&str> {
        self.packages
            .iter()
            .filter(|p| !p.status.is_pass())
            .map(|p| p.name.as_str())
            .chain(
                self.pinned
                    .iter()
                    .filter(|p| !p.status.is_pass())
                    .map(|p| p.name.as_str()),
            )
            .collect()
    }
}

/// Requirement checker over a requirement set and an installed-package source
pub struct RequirementsCheck<'a> {
    requirements: &'a RequirementSpec,
    lookup: &'a dyn PackageLookup,
    py_packages: &'a [PyPackage],
    environment: Environment,
    policy: RequirementPolicy,
    ver_rules: VerRules,
}

impl<'a> RequirementsCheck<'a> {
    pub fn new(requirements: &'a RequirementSpec, lookup: &'a dyn PackageLookup) -> Self {
        Self {
            requirements,
            lookup,
            py_packages: &[],
            environment: Environment::default(),
            policy: RequirementPolicy::default(),
            ver_rules: VerRules::new(),
        }
    }

    /// Also check pinned packages, skipping those that do not apply to `environment`
    pub fn with_py_packages(mut self, py_packages: &'a [PyPackage], environment: Environment) -> Self {
        self.py_packages = py_packages;
        self.environment = environment;
        self
    }

    pub fn with_policy(mut self, policy: RequirementPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Check every declared and pinned package.
    ///
    /// Returns `true` when all requirements are met.
    pub fn check_requirements(&self) -> bool {
        self.report().met
    }

    /// Classify every declared and pinned package
    pub fn report(&self) -> CheckReport {
        let packages: Vec<PackageReport> = self
            .requirements
            .iter()
            .map(|(name, requirement)| {
                let installed = self.lookup.installed_version(name);
                let status = self.classify(name, requirement, installed.as_deref());
                PackageReport {
                    name: name.to_string(),
                    requirement: requirement.to_string(),
                    installed,
                    status,
                    code: status.code(),
                }
            })
            .collect();

        let pinned: Vec<PinnedReport> = self.py_packages.iter().map(|pkg| self.check_pinned(pkg)).collect();

        let met = packages.iter().all(|p| p.status.is_pass()) && pinned.iter().all(|p| p.status.is_pass());
        if met {
            log::info!("Requirements are met");
        } else {
            log::error!("Requirements not met.");
        }

        CheckReport { packages, pinned, met }
    }

    /// Classify one package against a requirement string
    pub fn is_valid_version(&self, name: &str, requirement: &str) -> PackageStatus {
        let installed = self.lookup.installed_version(name);
        self.classify(name, requirement, installed.as_deref())
    }

    fn classify(&self, name: &str, requirement: &str, installed: Option<&str>) -> PackageStatus {
        let requirement = requirement.trim();
        let requirement = if requirement.is_empty() { "==*" } else { requirement };
        let rules = self.ver_rules.get_matched_rules(requirement);
        let unconstrained = rules.first().map_or(false, Rule::is_match_all);

        let installed = match installed.filter(|v| !v.trim().is_empty()) {
            Some(installed) => installed,
            None if unconstrained && self.policy.allow_absent_unconstrained => {
                log::debug!("Package {} not installed, no requirement given", name);
                return PackageStatus::Ok;
            }
            None => {
                log::debug!("Package {} not installed.", name);
                return PackageStatus::NotInstalled;
            }
        };

        log::debug!("Found Package {} {} already installed ...", name, installed);
        if rules.is_empty() {
            log::warn!(
                "Unable to find rules for {} '{}', treating it as no requirement",
                name,
                requirement
            );
            return PackageStatus::Invalid;
        }

        if !self.ver_rules.get_installed_is_valid_by_rules(&rules, installed) {
            log::info!(
                "Package {} {} already installed. It does not meet requirements specified by: {}",
                name,
                installed,
                requirement
            );
            return PackageStatus::VersionMismatch;
        }

        log::info!(
            "Package {} {} already installed. Requirements met for constraints: {}",
            name,
            installed,
            requirement
        );
        PackageStatus::Ok
    }

    /// Check one pinned package
    pub fn check_pinned(&self, pkg: &PyPackage) -> PinnedReport {
        let (name, requirement) = pkg.name_version();
        let mut report = PinnedReport {
            name: name.to_string(),
            requirement,
            installed: None,
            status: PinnedStatus::Skipped,
        };

        if !pkg.applies_to(&self.environment) {
            return report;
        }

        report.installed = self.lookup.installed_version(name);
        report.status = match report.installed.as_deref() {
            None => {
                log::debug!("Package {} not installed ...", name);
                PinnedStatus::NotInstalled
            }
            Some(installed) if self.ver_rules.get_installed_is_valid(&report.requirement, installed) => {
                PinnedStatus::Ok
            }
            Some(installed) => {
                log::info!(
                    "Package {} {} does not meet pinned requirement {}",
                    name,
                    installed,
                    report.requirement
                );
                PinnedStatus::VersionMismatch
            }
        };
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn installed(entries: &[(&str, &str)]) -> HashMap<String, String> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(PackageStatus::Ok.code(), 0);
        assert_eq!(PackageStatus::VersionMismatch.code(), 1);
        assert_eq!(PackageStatus::NotInstalled.code(), 2);
        assert_eq!(PackageStatus::Invalid.code(), -1);
        assert!(PackageStatus::Invalid.is_pass());
        assert!(!PackageStatus::NotInstalled.is_pass());
    }

    #[test]
    fn test_is_valid_version() {
        let spec = RequirementSpec::new();
        let lookup = installed(&[("verr", "1.1.2")]);
        let check = RequirementsCheck::new(&spec, &lookup);

        assert_eq!(check.is_valid_version("verr", ">=1.1.0"), PackageStatus::Ok);
        assert_eq!(check.is_valid_version("verr", ""), PackageStatus::Ok);
        assert_eq!(check.is_valid_version("verr", "<1.0"), PackageStatus::VersionMismatch);
        assert_eq!(check.is_valid_version("verr", "invalid-garbage"), PackageStatus::Invalid);
        assert_eq!(check.is_valid_version("missing", ">=1.0"), PackageStatus::NotInstalled);
    }

    #[test]
    fn test_invalid_requirement_does_not_block() {
        let spec: RequirementSpec = [("verr", "invalid-garbage")].into_iter().collect();
        let lookup = installed(&[("verr", "1.0.0")]);

        let report = RequirementsCheck::new(&spec, &lookup).report();
        assert!(report.met);
        assert_eq!(report.invalid().count(), 1);
        assert_eq!(report.packages[0].code, -1);
    }

    #[test]
    fn test_absent_unconstrained_policy() {
        let spec: RequirementSpec = [("verr", "*")].into_iter().collect();
        let lookup = installed(&[]);

        assert!(!RequirementsCheck::new(&spec, &lookup).check_requirements());

        let policy = RequirementPolicy {
            allow_absent_unconstrained: true,
        };
        assert!(RequirementsCheck::new(&spec, &lookup)
            .with_policy(policy)
            .check_requirements());

        for requirement in ["", "== *", "*, *"] {
            let spec: RequirementSpec = [("verr", requirement)].into_iter().collect();
            assert!(RequirementsCheck::new(&spec, &lookup)
                .with_policy(policy)
                .check_requirements());
        }

        let constrained: RequirementSpec = [("verr", ">=1.0")].into_iter().collect();
        assert!(!RequirementsCheck::new(&constrained, &lookup)
            .with_policy(policy)
            .check_requirements());
    }

    #[test]
    fn test_unparseable_installed_version_is_mismatch() {
        let spec: RequirementSpec = [("odd", ">=1.0")].into_iter().collect();
        let lookup = installed(&[("odd", "not-a-version")]);

        let report = RequirementsCheck::new(&spec, &lookup).report();
        assert_eq!(report.packages[0].status, PackageStatus::VersionMismatch);
        assert_eq!(report.failures(), vec!["odd"]);
    }
}
