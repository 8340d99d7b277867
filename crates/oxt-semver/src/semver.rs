//! Semver facade providing high-level version operations

use crate::{VerRules, VersionParser};

/// Main facade for requirement checks on plain strings
pub struct Semver;

impl Semver {
    /// Check if a version satisfies a requirement string
    pub fn satisfies(version: &str, constraints: &str) -> bool {
        VerRules::new().get_installed_is_valid(constraints, version)
    }

    /// Return all versions that satisfy the given requirement string
    pub fn satisfied_by(versions: &[&str], constraints: &str) -> Vec<String> {
        let ver_rules = VerRules::new();
        let rules = ver_rules.get_matched_rules(constraints);
        if rules.is_empty() {
            return Vec::new();
        }

        versions
            .iter()
            .filter(|v| ver_rules.get_installed_is_valid_by_rules(&rules, v))
            .map(|v| v.to_string())
            .collect()
    }

    /// Sort versions in ascending order, dropping unparseable ones
    pub fn sort(versions: &[&str]) -> Vec<String> {
        let parser = VersionParser::new();
        let mut parsed: Vec<_> = versions
            .iter()
            .filter_map(|v| parser.parse(v).ok().map(|parsed| (parsed, v.to_string())))
            .collect();
        parsed.sort_by(|(a, _), (b, _)| a.cmp(b));
        parsed.into_iter().map(|(_, v)| v).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_satisfies_positive() {
        assert!(Semver::satisfies("1.2.3", "*"));
        assert!(Semver::satisfies("1.0.0", ">=1.0.0"));
        assert!(Semver::satisfies("1.0.1", "> 1.0.0"));
        assert!(Semver::satisfies("1.9999.9999", "<2.0.0"));
        assert!(Semver::satisfies("2.0.0", "<=2.0.0"));
        assert!(Semver::satisfies("1.3.0", "^1.2.3"));
        assert!(Semver::satisfies("0.2.9", "^0.2.3"));
        assert!(Semver::satisfies("1.2.9", "~1.2"));
        assert!(Semver::satisfies("1.2.3", "1.2.*"));
        assert!(Semver::satisfies("1.5.2", ">=1.0.0, <2.0.0"));
    }

    #[test]
    fn test_satisfies_negative() {
        assert!(!Semver::satisfies("2.0.0", "^1.2.3"));
        assert!(!Semver::satisfies("0.3.0", "^0.2.3"));
        assert!(!Semver::satisfies("1.3.0", "~1.2"));
        assert!(!Semver::satisfies("1.0.0", ">1.0.0"));
        assert!(!Semver::satisfies("1.5.0", "!=1.5"));
        assert!(!Semver::satisfies("1.0.0", "garbage"));
        assert!(!Semver::satisfies("garbage", ">=1.0"));
    }

    #[test]
    fn test_satisfied_by() {
        let versions = ["0.9", "1.0", "1.4.2", "2.0", "not-a-version"];
        assert_eq!(Semver::satisfied_by(&versions, "^1.0"), vec!["1.0", "1.4.2"]);
        assert!(Semver::satisfied_by(&versions, "junk").is_empty());
    }

    #[test]
    fn test_sort() {
        let versions = ["1.10.0", "1.2", "1.2.0rc1", "bogus", "0.9"];
        assert_eq!(Semver::sort(&versions), vec!["0.9", "1.2.0rc1", "1.2", "1.10.0"]);
    }
}
