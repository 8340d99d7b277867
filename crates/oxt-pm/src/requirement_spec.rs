//! Declared requirements: package name to raw constraint string.

use std::sync::OnceLock;

use indexmap::IndexMap;
use oxt_semver::VerRules;
use serde::{Deserialize, Serialize};

static GLOBAL_SPEC: OnceLock<RequirementSpec> = OnceLock::new();

/// Ordered map of package name to constraint string (e.g. `"verr" => ">=1.1.0"`).
///
/// An empty constraint means "any version".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequirementSpec {
    requirements: IndexMap<String, String>,
}

impl RequirementSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the requirement for a package
    pub fn insert(&mut self, name: impl Into<String>, requirement: impl Into<String>) -> Option<String> {
        self.requirements.insert(name.into(), requirement.into())
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.requirements.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.requirements.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.requirements.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.requirements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requirements.is_empty()
    }

    /// Replace the requirement of `package_name` with one entered by the user
    /// in the extension options.
    ///
    /// The text is canonicalized first. Blank text leaves the declared
    /// requirement alone; text without any valid clause is logged and ignored.
    /// Returns `true` when the requirement was replaced.
    pub fn apply_option_override(&mut self, package_name: &str, text: &str) -> bool {
        if !self.contains(package_name) {
            log::debug!(
                "{} requirement not part of pyproject.toml tool.oxt.requirements",
                package_name
            );
        }

        if text.trim().is_empty() {
            log::debug!("No requirement set in extension options for {} package", package_name);
            return false;
        }

        match VerRules::new().normalize_requirement(text) {
            Ok(requirement) => {
                log::debug!(
                    "Setting from extension options - {} requirement: '{}'",
                    package_name,
                    requirement
                );
                self.insert(package_name, requirement);
                true
            }
            Err(err) => {
                log::error!("Invalid {} requirement: {} ({})", package_name, text, err);
                false
            }
        }
    }

    /// Install `spec` as the process-wide requirement set.
    ///
    /// Only the first call wins; later calls return `false`.
    pub fn set_global(spec: RequirementSpec) -> bool {
        GLOBAL_SPEC.set(spec).is_ok()
    }

    /// The process-wide requirement set, if one was installed
    pub fn global() -> Option<&'static RequirementSpec> {
        GLOBAL_SPEC.get()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RequirementSpec {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        RequirementSpec {
            requirements: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

impl From<IndexMap<String, String>> for RequirementSpec {
    fn from(requirements: IndexMap<String, String>) -> Self {
        RequirementSpec { requirements }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keeps_declaration_order() {
        let spec: RequirementSpec = [("zeta", ">=1"), ("alpha", ""), ("mid", "^2")].into_iter().collect();
        let names: Vec<&str> = spec.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
        assert_eq!(spec.get("alpha"), Some(""));
    }

    #[test]
    fn test_option_override_is_canonicalized() {
        let mut spec: RequirementSpec = [("ooo-dev-tools", ">=0.40.0")].into_iter().collect();

        assert!(spec.apply_option_override("ooo-dev-tools", "^1.0; !=1.5"));
        assert_eq!(spec.get("ooo-dev-tools"), Some(">=1.0.0, <2.0.0, !=1.5.0"));
    }

    #[test]
    fn test_option_override_adds_missing_package() {
        let mut spec = RequirementSpec::new();
        assert!(spec.apply_option_override("verr", "*"));
        assert_eq!(spec.get("verr"), Some("==*"));
    }

    #[test]
    fn test_invalid_or_blank_override_is_ignored() {
        let mut spec: RequirementSpec = [("verr", ">=1.1.0")].into_iter().collect();

        assert!(!spec.apply_option_override("verr", "not a version"));
        assert!(!spec.apply_option_override("verr", "  "));
        assert_eq!(spec.get("verr"), Some(">=1.1.0"));
    }

    #[test]
    fn test_deserialize_transparent() {
        let spec: RequirementSpec = serde_json::from_str(r#"{"b": "<2", "a": ""}"#).unwrap();
        assert_eq!(spec.len(), 2);
        assert_eq!(spec.iter().next(), Some(("b", "<2")));
    }
}
