//! Platform and Python runtime detection.
//!
//! Pinned packages may be limited to some platforms or Python versions; the
//! [`Environment`] describes where the check is running so those entries can
//! be skipped instead of failed.

use std::fmt;
use std::process::Command;

use serde::{Deserialize, Serialize};

/// A platform tag as written in `py_packages` entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Linux,
    Macos,
    Win,
    Flatpak,
    Snap,
    All,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Linux => "linux",
            Platform::Macos => "macos",
            Platform::Win => "win",
            Platform::Flatpak => "flatpak",
            Platform::Snap => "snap",
            Platform::All => "all",
        }
    }

    /// Parse a platform tag, case-insensitively
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "linux" => Some(Platform::Linux),
            "macos" => Some(Platform::Macos),
            "win" => Some(Platform::Win),
            "flatpak" => Some(Platform::Flatpak),
            "snap" => Some(Platform::Snap),
            "all" => Some(Platform::All),
            _ => None,
        }
    }

    /// The operating system this binary was built for
    pub fn current_os() -> Self {
        if cfg!(target_os = "windows") {
            Platform::Win
        } else if cfg!(target_os = "macos") {
            Platform::Macos
        } else {
            Platform::Linux
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a requirement check runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment {
    /// Operating system (`linux`, `macos` or `win`)
    pub os: Platform,
    /// Sandbox the office suite runs in (`flatpak` or `snap`)
    pub sandbox: Option<Platform>,
    /// Python version such as `3.11.4`, when known
    pub python_version: Option<String>,
}

impl Default for Environment {
    fn default() -> Self {
        Self::new(Platform::current_os())
    }
}

impl Environment {
    pub fn new(os: Platform) -> Self {
        Self {
            os,
            sandbox: None,
            python_version: None,
        }
    }

    pub fn with_sandbox(mut self, sandbox: Platform) -> Self {
        self.sandbox = Some(sandbox);
        self
    }

    pub fn with_python_version(mut self, version: impl Into<String>) -> Self {
        self.python_version = Some(version.into());
        self
    }

    /// Detect the current environment.
    ///
    /// The sandbox comes from `FLATPAK_ID` / `SNAP_INSTANCE_NAME`. When
    /// `python_version` is `None` the interpreter on `PATH` is asked.
    pub fn detect(python_version: Option<String>) -> Self {
        let sandbox = if std::env::var_os("FLATPAK_ID").is_some() {
            Some(Platform::Flatpak)
        } else if std::env::var_os("SNAP_INSTANCE_NAME").is_some() {
            Some(Platform::Snap)
        } else {
            None
        };

        let python_version = python_version.or_else(detect_python_version);
        log::debug!(
            "Detected environment: os={}, sandbox={:?}, python={:?}",
            Platform::current_os(),
            sandbox,
            python_version
        );

        Self {
            os: Platform::current_os(),
            sandbox,
            python_version,
        }
    }

    /// Platform tags describing this environment
    pub fn platforms(&self) -> Vec<Platform> {
        let mut platforms = vec![self.os];
        if let Some(sandbox) = self.sandbox {
            platforms.push(sandbox);
        }
        platforms
    }

    /// Check if any tag in `list` names this environment (`all` always does)
    pub fn matches_any(&self, list: &[Platform]) -> bool {
        list.iter()
            .any(|p| *p == Platform::All || self.platforms().contains(p))
    }
}

/// Ask `python3` (then `python`) for its version
fn detect_python_version() -> Option<String> {
    for program in ["python3", "python"] {
        let output = match Command::new(program).arg("--version").output() {
            Ok(output) if output.status.success() => output,
            _ => continue,
        };
        // Python 2 printed the version to stderr
        let text = if output.stdout.is_empty() {
            String::from_utf8_lossy(&output.stderr).into_owned()
        } else {
            String::from_utf8_lossy(&output.stdout).into_owned()
        };
        if let Some(version) = parse_python_version(&text) {
            return Some(version);
        }
    }
    log::debug!("Unable to detect the Python version");
    None
}

fn parse_python_version(text: &str) -> Option<String> {
    let version = text.trim().strip_prefix("Python")?.trim();
    if version.is_empty() {
        None
    } else {
        Some(version.to_string())
    }
}
