//! Installed package lookup.
//!
//! The checker only needs "which version of `name` is installed?". Tests and
//! the CLI answer it from a plain map; a real Python installation is answered
//! by scanning `site-packages` metadata directories.

use std::collections::HashMap;
use std::fs;
use std::hash::BuildHasher;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;

use crate::error::{RequirementsError, Result};

/// Source of installed package versions
pub trait PackageLookup {
    /// Installed version of `name`, or `None` when the package is absent
    fn installed_version(&self, name: &str) -> Option<String>;
}

impl<S: BuildHasher> PackageLookup for HashMap<String, String, S> {
    fn installed_version(&self, name: &str) -> Option<String> {
        if let Some(version) = self.get(name) {
            return Some(version.clone());
        }
        let wanted = normalize_name(name);
        self.iter()
            .find(|(key, _)| normalize_name(key) == wanted)
            .map(|(_, version)| version.clone())
    }
}

impl<S: BuildHasher> PackageLookup for IndexMap<String, String, S> {
    fn installed_version(&self, name: &str) -> Option<String> {
        if let Some(version) = self.get(name) {
            return Some(version.clone());
        }
        let wanted = normalize_name(name);
        self.iter()
            .find(|(key, _)| normalize_name(key) == wanted)
            .map(|(_, version)| version.clone())
    }
}

impl<T: PackageLookup + ?Sized> PackageLookup for &T {
    fn installed_version(&self, name: &str) -> Option<String> {
        (**self).installed_version(name)
    }
}

/// Installed version of `name`, or [`RequirementsError::PackageNotFound`]
pub fn require_installed(lookup: &dyn PackageLookup, name: &str) -> Result<String> {
    lookup
        .installed_version(name)
        .ok_or_else(|| RequirementsError::PackageNotFound {
            name: name.to_string(),
        })
}

/// Normalize a distribution name: lowercase, runs of `-`, `_` and `.` become `-`
pub fn normalize_name(name: &str) -> String {
    let mut normalized = String::with_capacity(name.len());
    let mut in_separator = false;
    for c in name.trim().chars() {
        if matches!(c, '-' | '_' | '.') {
            if !in_separator {
                normalized.push('-');
            }
            in_separator = true;
        } else {
            normalized.extend(c.to_lowercase());
            in_separator = false;
        }
    }
    normalized
}

/// Installed distributions found in one or more `site-packages` directories.
///
/// Directories are searched in order; the first distribution found for a
/// name wins, like the interpreter's own import path.
#[derive(Debug, Clone, Default)]
pub struct SitePackages {
    packages: IndexMap<String, String>,
}

impl SitePackages {
    /// Scan `dirs` for `*.dist-info` and `*.egg-info` entries.
    ///
    /// Directories that do not exist are skipped.
    pub fn scan<P: AsRef<Path>>(dirs: &[P]) -> Result<Self> {
        let mut packages = IndexMap::new();

        for dir in dirs {
            let dir = dir.as_ref();
            if !dir.is_dir() {
                log::debug!("Skipping missing site-packages directory {}", dir.display());
                continue;
            }

            let mut entries: Vec<PathBuf> = fs::read_dir(dir)?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .collect();
            entries.sort();

            for path in entries {
                if let Some((name, version)) = read_distribution(&path) {
                    log::trace!("Found {} {} in {}", name, version, dir.display());
                    packages.entry(normalize_name(&name)).or_insert(version);
                }
            }
        }

        log::debug!("Found {} installed distributions", packages.len());
        Ok(SitePackages { packages })
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    /// Normalized name and version of every distribution found
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.packages.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl PackageLookup for SitePackages {
    fn installed_version(&self, name: &str) -> Option<String> {
        self.packages.get(&normalize_name(name)).cloned()
    }
}

/// Name and version of a metadata entry such as `numpy-1.26.4.dist-info`
fn read_distribution(path: &Path) -> Option<(String, String)> {
    let file_name = path.file_name()?.to_str()?;
    let (stem, metadata_file) = if let Some(stem) = file_name.strip_suffix(".dist-info") {
        (stem, "METADATA")
    } else if let Some(stem) = file_name.strip_suffix(".egg-info") {
        (stem, "PKG-INFO")
    } else {
        return None;
    };

    // name-version[-pyX.Y]; the name never contains '-' in escaped form
    let mut parts = stem.splitn(3, '-');
    let name = parts.next().filter(|n| !n.is_empty())?.to_string();
    if let Some(version) = parts.next().filter(|v| !v.is_empty()) {
        return Some((name, version.to_string()));
    }

    // Older egg-info entries carry only the name; ask the metadata file
    let metadata_path = if path.is_dir() {
        path.join(metadata_file)
    } else {
        path.to_path_buf()
    };
    let content = fs::read_to_string(&metadata_path).ok()?;
    let version = metadata_version(&content)?;
    Some((name, version))
}

/// `Version:` header of a core metadata file
fn metadata_version(content: &str) -> Option<String> {
    content
        .lines()
        .take_while(|line| !line.trim().is_empty())
        .find_map(|line| line.strip_prefix("Version:"))
        .map(|version| version.trim().to_string())
        .filter(|version| !version.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("Friendly-Bard"), "friendly-bard");
        assert_eq!(normalize_name("friendly_bard"), "friendly-bard");
        assert_eq!(normalize_name("FRIENDLY.._-BARD"), "friendly-bard");
        assert_eq!(normalize_name("ooo_dev_tools"), "ooo-dev-tools");
    }

    #[test]
    fn test_map_lookup() {
        let mut installed = HashMap::new();
        installed.insert("ooo-dev-tools".to_string(), "0.47.1".to_string());

        assert_eq!(installed.installed_version("ooo-dev-tools"), Some("0.47.1".to_string()));
        assert_eq!(installed.installed_version("OOO_Dev_Tools"), Some("0.47.1".to_string()));
        assert_eq!(installed.installed_version("numpy"), None);
    }

    #[test]
    fn test_require_installed() {
        let installed: IndexMap<String, String> =
            [("verr".to_string(), "1.1.2".to_string())].into_iter().collect();

        assert_eq!(require_installed(&installed, "verr").unwrap(), "1.1.2");
        assert!(matches!(
            require_installed(&installed, "missing"),
            Err(RequirementsError::PackageNotFound { .. })
        ));
    }

    #[test]
    fn test_metadata_version() {
        let content = "Metadata-Version: 2.1\nName: verr\nVersion: 1.1.2\n\nVersion: 9.9.9 in body\n";
        assert_eq!(metadata_version(content), Some("1.1.2".to_string()));
        assert_eq!(metadata_version("Name: verr\n"), None);
    }
}
