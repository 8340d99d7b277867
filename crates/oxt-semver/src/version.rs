//! Parsed version type and its ordering

use std::cmp::Ordering;
use std::fmt;

/// Stability levels for versions
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stability {
    Dev,
    Alpha,
    Beta,
    RC,
    Stable,
}

impl Stability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stability::Dev => "dev",
            Stability::Alpha => "alpha",
            Stability::Beta => "beta",
            Stability::RC => "RC",
            Stability::Stable => "stable",
        }
    }

    /// Tag used in the canonical rendering of a pre-release (`1.0.0rc1`)
    fn tag(&self) -> &'static str {
        match self {
            Stability::Dev => "dev",
            Stability::Alpha => "a",
            Stability::Beta => "b",
            Stability::RC => "rc",
            Stability::Stable => "",
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Stability::Dev => 0,
            Stability::Alpha => 1,
            Stability::Beta => 2,
            Stability::RC => 3,
            Stability::Stable => 4,
        }
    }
}

impl fmt::Display for Stability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A parsed package version.
///
/// Equality and ordering ignore the text the version was written as, trailing
/// zero release segments and the local (`+build`) label, so `1.0` equals
/// `1.0.0` and `1.0.0+ubuntu1`.
#[derive(Debug, Clone)]
pub struct Version {
    release: Vec<u64>,
    pre: Option<(Stability, u64)>,
    post: Option<u64>,
    dev: Option<u64>,
    local: Option<String>,
    pretty: String,
}

impl Version {
    pub(crate) fn new(
        release: Vec<u64>,
        pre: Option<(Stability, u64)>,
        post: Option<u64>,
        dev: Option<u64>,
        local: Option<String>,
        pretty: String,
    ) -> Self {
        Version {
            release,
            pre,
            post,
            dev,
            local,
            pretty,
        }
    }

    /// Build a final release from numeric segments
    pub fn from_release(release: Vec<u64>) -> Self {
        let pretty = release
            .iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>()
            .join(".");
        Version::new(release, None, None, None, None, pretty)
    }

    /// Release segments exactly as written
    pub fn release(&self) -> &[u64] {
        &self.release
    }

    /// Release segment at `index`, missing segments read as 0
    pub fn segment(&self, index: usize) -> u64 {
        self.release.get(index).copied().unwrap_or(0)
    }

    pub fn major(&self) -> u64 {
        self.segment(0)
    }

    pub fn minor(&self) -> u64 {
        self.segment(1)
    }

    pub fn patch(&self) -> u64 {
        self.segment(2)
    }

    pub fn pre_release(&self) -> Option<(Stability, u64)> {
        self.pre
    }

    pub fn post_release(&self) -> Option<u64> {
        self.post
    }

    pub fn dev_release(&self) -> Option<u64> {
        self.dev
    }

    pub fn local(&self) -> Option<&str> {
        self.local.as_deref()
    }

    /// The version text as it was written
    pub fn pretty(&self) -> &str {
        &self.pretty
    }

    pub fn is_prerelease(&self) -> bool {
        self.pre.is_some() || self.dev.is_some()
    }

    pub fn is_postrelease(&self) -> bool {
        self.post.is_some()
    }

    pub fn stability(&self) -> Stability {
        match (self.pre, self.dev) {
            (_, Some(_)) => Stability::Dev,
            (Some((stability, _)), None) => stability,
            (None, None) => Stability::Stable,
        }
    }

    /// True when both versions share the same release segments (zero padded)
    pub fn same_release(&self, other: &Version) -> bool {
        compare_release(&self.release, &other.release) == Ordering::Equal
    }

    /// Final release with the segment at `index` incremented and every later
    /// segment reset to zero.
    ///
    /// Returns `None` when the segment at `index` is already `u64::MAX`.
    pub fn bump(&self, index: usize) -> Option<Version> {
        let len = std::cmp::max(3, index + 1);
        let release = (0..len)
            .map(|i| match i.cmp(&index) {
                Ordering::Less => Some(self.segment(i)),
                Ordering::Equal => self.segment(i).checked_add(1),
                Ordering::Greater => Some(0),
            })
            .collect::<Option<Vec<u64>>>()?;
        Some(Version::from_release(release))
    }

    /// Canonical rendering: at least three release segments followed by the
    /// pre, post, dev and local parts (`1.2.0rc1`, `1.0.0.post2`).
    pub fn normalized(&self) -> String {
        let mut segments: Vec<String> = self.release.iter().map(|s| s.to_string()).collect();
        while segments.len() < 3 {
            segments.push("0".to_string());
        }
        let mut out = segments.join(".");
        if let Some((stability, number)) = self.pre {
            out.push_str(stability.tag());
            out.push_str(&number.to_string());
        }
        if let Some(number) = self.post {
            out.push_str(&format!(".post{}", number));
        }
        if let Some(number) = self.dev {
            out.push_str(&format!(".dev{}", number));
        }
        if let Some(ref local) = self.local {
            out.push('+');
            out.push_str(local);
        }
        out
    }

    fn pre_key(&self) -> (u8, u64) {
        match self.pre {
            Some((stability, number)) => (stability.rank(), number),
            // 1.0.dev1 sorts before 1.0a1
            None if self.post.is_none() && self.dev.is_some() => (Stability::Dev.rank(), 0),
            None => (Stability::Stable.rank(), 0),
        }
    }

    fn dev_key(&self) -> (u8, u64) {
        match self.dev {
            Some(number) => (0, number),
            None => (1, 0),
        }
    }
}

fn compare_release(a: &[u64], b: &[u64]) -> Ordering {
    let max_len = std::cmp::max(a.len(), b.len());
    for i in 0..max_len {
        let a_val = a.get(i).copied().unwrap_or(0);
        let b_val = b.get(i).copied().unwrap_or(0);
        match a_val.cmp(&b_val) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    Ordering::Equal
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        compare_release(&self.release, &other.release)
            .then_with(|| self.pre_key().cmp(&other.pre_key()))
            .then_with(|| self.post.cmp(&other.post))
            .then_with(|| self.dev_key().cmp(&other.dev_key()))
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.pretty)
    }
}
