//! Pinned packages listed under `py_packages`

use oxt_semver::VerRules;
use serde::{Deserialize, Serialize};

use crate::environment::{Environment, Platform};
use crate::error::{RequirementsError, Result};

/// Restriction operators a pinned package may use
pub const RESTRICTIONS: [&str; 9] = ["<", "<=", "==", "!=", ">", ">=", "^", "~", "~="];

/// Restriction used when an entry does not name one
pub const DEFAULT_RESTRICTION: &str = ">=";

/// One `py_packages` entry, e.g.
/// `{ name = "numpy", version = "1.26", restriction = "^", platforms = ["linux"] }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PyPackage {
    pub name: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restriction: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub platforms: Vec<Platform>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ignore_platforms: Vec<Platform>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub python_versions: Vec<String>,
}

impl PyPackage {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            restriction: None,
            platforms: Vec::new(),
            ignore_platforms: Vec::new(),
            python_versions: Vec::new(),
        }
    }

    pub fn with_restriction(mut self, restriction: impl Into<String>) -> Self {
        self.restriction = Some(restriction.into());
        self
    }

    /// Name and requirement string, e.g. `("numpy", "^1.26")`.
    ///
    /// An empty or `*` version requires any version.
    pub fn name_version(&self) -> (&str, String) {
        let version = self.version.trim();
        if version.is_empty() || version == "*" {
            return (&self.name, "==*".to_string());
        }
        let restriction = self.restriction.as_deref().unwrap_or(DEFAULT_RESTRICTION);
        (&self.name, format!("{}{}", restriction, version))
    }

    /// Check if this entry applies to `env`.
    ///
    /// `platforms` (when given) must name the environment, `ignore_platforms`
    /// must not, and at least one `python_versions` constraint (when given)
    /// must accept the running Python. An unknown Python version does not
    /// exclude the entry.
    pub fn applies_to(&self, env: &Environment) -> bool {
        if !self.platforms.is_empty() && !env.matches_any(&self.platforms) {
            log::debug!("{} does not target platform {:?}", self.name, env.platforms());
            return false;
        }
        if env.matches_any(&self.ignore_platforms) {
            log::debug!("{} ignored on platform {:?}", self.name, env.platforms());
            return false;
        }
        if self.python_versions.is_empty() {
            return true;
        }

        let python = match env.python_version.as_deref() {
            Some(python) => python,
            None => {
                log::warn!(
                    "Python version unknown, not applying python_versions restriction of {}",
                    self.name
                );
                return true;
            }
        };
        let ver_rules = VerRules::new();
        let applies = self
            .python_versions
            .iter()
            .any(|constraint| ver_rules.get_installed_is_valid(constraint, python));
        if !applies {
            log::debug!("{} does not target Python {}", self.name, python);
        }
        applies
    }

    /// Check the entry's fields
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(RequirementsError::manifest("py_packages name must not be empty"));
        }

        if let Some(ref restriction) = self.restriction {
            if !RESTRICTIONS.contains(&restriction.as_str()) {
                return Err(RequirementsError::manifest(format!(
                    "py_packages restriction of {} must be in [{}], got \"{}\"",
                    self.name,
                    RESTRICTIONS.join(", "),
                    restriction
                )));
            }
        }

        let ver_rules = VerRules::new();
        for python in &self.python_versions {
            if python.trim().is_empty() {
                return Err(RequirementsError::manifest(format!(
                    "py_packages python_versions of {} must not be an empty string",
                    self.name
                )));
            }
            if let Some(err) = ver_rules.parse(python).rejected.into_iter().next() {
                return Err(RequirementsError::manifest(format!(
                    "Error in py_packages python_versions of {}: {}",
                    self.name, err
                )));
            }
        }

        let (_, requirement) = self.name_version();
        if !ver_rules.parse(&requirement).rejected.is_empty() {
            return Err(RequirementsError::manifest(format!(
                "py_packages version of {} is not valid: \"{}\"",
                self.name, requirement
            )));
        }
        Ok(())
    }
}
