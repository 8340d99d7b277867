//! Bound type for rule boundaries

use std::cmp::Ordering;
use std::fmt;

use crate::Version;

/// Represents a bound (lower or upper) of a version range
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bound {
    version: Version,
    is_inclusive: bool,
}

impl Bound {
    /// Create a new bound
    pub fn new(version: Version, is_inclusive: bool) -> Self {
        Bound {
            version,
            is_inclusive,
        }
    }

    /// Get the version
    pub fn version(&self) -> &Version {
        &self.version
    }

    /// Check if the bound is inclusive
    pub fn is_inclusive(&self) -> bool {
        self.is_inclusive
    }

    /// Check whether `candidate` lies above this bound when used as a lower bound.
    ///
    /// An exclusive `> V` does not admit post-releases of V unless V is one.
    pub fn admits_above(&self, candidate: &Version) -> bool {
        match candidate.cmp(&self.version) {
            Ordering::Less => false,
            Ordering::Equal => self.is_inclusive,
            Ordering::Greater => {
                self.is_inclusive
                    || self.version.is_postrelease()
                    || !(candidate.is_postrelease() && candidate.same_release(&self.version))
            }
        }
    }

    /// Check whether `candidate` lies below this bound when used as an upper bound.
    ///
    /// An exclusive `< V` does not admit pre-releases of V unless V is one.
    pub fn admits_below(&self, candidate: &Version) -> bool {
        match candidate.cmp(&self.version) {
            Ordering::Greater => false,
            Ordering::Equal => self.is_inclusive,
            Ordering::Less => {
                self.is_inclusive
                    || self.version.is_prerelease()
                    || !(candidate.is_prerelease() && candidate.same_release(&self.version))
            }
        }
    }

    /// Check if this lower bound excludes more than `other`
    pub fn is_stricter_lower(&self, other: &Bound) -> bool {
        match self.version.cmp(&other.version) {
            Ordering::Greater => true,
            Ordering::Less => false,
            Ordering::Equal => !self.is_inclusive && other.is_inclusive,
        }
    }

    /// Check if this upper bound excludes more than `other`
    pub fn is_stricter_upper(&self, other: &Bound) -> bool {
        match self.version.cmp(&other.version) {
            Ordering::Less => true,
            Ordering::Greater => false,
            Ordering::Equal => !self.is_inclusive && other.is_inclusive,
        }
    }
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}]",
            self.version.normalized(),
            if self.is_inclusive {
                "inclusive"
            } else {
                "exclusive"
            }
        )
    }
}
