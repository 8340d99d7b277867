//! Requirement manifests.
//!
//! Requirements are declared in the project's `pyproject.toml`:
//!
//! ```toml
//! [tool.oxt.token]
//! package_name = "ooo_dev_tools"
//!
//! [tool.oxt.requirements]
//! verr = ">=1.1.2"
//! ooo-dev-tools = "^0.47"
//!
//! [[tool.oxt.py_packages]]
//! name = "tomli"
//! version = "2.0"
//! python_versions = ["<3.11"]
//! ```
//!
//! A built extension carries the same data in its JSON config under the
//! `requirements`, `py_packages` and `package_name` keys.

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Deserialize;

use crate::error::{RequirementsError, Result};
use crate::py_package::PyPackage;
use crate::requirement_spec::RequirementSpec;

pub const PYPROJECT_FILE: &str = "pyproject.toml";

/// Declared requirements and pinned packages of an extension
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Manifest {
    /// `tool.oxt.requirements`
    pub requirements: RequirementSpec,
    /// `tool.oxt.py_packages`
    pub py_packages: Vec<PyPackage>,
    /// Package whose requirement the extension options may override
    pub package_name: Option<String>,
    /// File the manifest was read from
    pub path: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PyProject {
    tool: ToolTable,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ToolTable {
    oxt: Option<OxtTable>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OxtTable {
    requirements: IndexMap<String, String>,
    py_packages: Vec<PyPackage>,
    token: NamedTable,
    config: NamedTable,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct NamedTable {
    package_name: Option<String>,
}

/// The subset of a built extension's JSON config used for requirement checks
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct JsonConfig {
    requirements: IndexMap<String, String>,
    py_packages: Vec<PyPackage>,
    package_name: Option<String>,
}

impl Manifest {
    /// Parse `pyproject.toml` content
    pub fn from_pyproject_str(content: &str) -> Result<Self> {
        let pyproject: PyProject = toml::from_str(content)?;
        let oxt = match pyproject.tool.oxt {
            Some(oxt) => oxt,
            None => {
                log::debug!("No [tool.oxt] table found, nothing to check");
                return Ok(Manifest::default());
            }
        };

        let package_name = oxt.token.package_name.or(oxt.config.package_name);
        let manifest = Manifest {
            requirements: oxt.requirements.into(),
            py_packages: oxt.py_packages,
            package_name,
            path: None,
        };
        manifest.validate()?;
        Ok(manifest)
    }

    /// Parse the JSON config of a built extension
    pub fn from_json_str(content: &str) -> Result<Self> {
        let config: JsonConfig = serde_json::from_str(content)?;
        let manifest = Manifest {
            requirements: config.requirements.into(),
            py_packages: config.py_packages,
            package_name: config.package_name,
            path: None,
        };
        manifest.validate()?;
        Ok(manifest)
    }

    /// Read a manifest file; `.json` files are extension configs, anything
    /// else is read as `pyproject.toml`
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .map_or(false, |ext| ext.eq_ignore_ascii_case("json"));

        let mut manifest = if is_json {
            Self::from_json_str(&content)?
        } else {
            Self::from_pyproject_str(&content)?
        };
        log::debug!(
            "Loaded {} requirements and {} pinned packages from {}",
            manifest.requirements.len(),
            manifest.py_packages.len(),
            path.display()
        );
        manifest.path = Some(path.to_path_buf());
        Ok(manifest)
    }

    /// Load `pyproject.toml`, searching upward from the given directory
    pub fn load(start_dir: &Path) -> Result<Option<Self>> {
        let mut current = start_dir.to_path_buf();

        loop {
            let manifest_path = current.join(PYPROJECT_FILE);

            if manifest_path.is_file() {
                return Self::from_path(&manifest_path).map(Some);
            }

            if !current.pop() {
                return Ok(None);
            }
        }
    }

    /// Load `pyproject.toml` by searching upward from the current working directory
    pub fn load_from_cwd() -> Result<Option<Self>> {
        let cwd = std::env::current_dir()?;
        Self::load(&cwd)
    }

    /// Check the pinned packages and the package name
    pub fn validate(&self) -> Result<()> {
        if let Some(ref name) = self.package_name {
            if name.trim().is_empty() {
                return Err(RequirementsError::manifest("package_name must not be an empty string"));
            }
        }
        for pkg in &self.py_packages {
            pkg.validate()?;
        }
        Ok(())
    }

    /// Apply the requirement entered in the extension options to `package_name`
    pub fn apply_option_override(&mut self, text: &str) -> bool {
        match self.package_name {
            Some(ref name) => self.requirements.apply_option_override(name, text),
            None => {
                log::warn!("No package_name configured, ignoring requirement '{}'", text);
                false
            }
        }
    }
}
