//! Rule - normalized version range built from one or more constraint clauses

use std::fmt;

use super::{Bound, Constraint, Operator};
use crate::version_parser::{VersionParserError, VersionPattern};
use crate::{Version, VersionParser};

/// A normalized, conjunctive version range.
///
/// A rule holds an optional lower bound, an optional upper bound and a list of
/// excluded versions. The lower bound never lies above the upper bound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    lower: Option<Bound>,
    upper: Option<Bound>,
    excluded: Vec<Version>,
}

impl Rule {
    /// A rule accepting every version
    pub fn any() -> Self {
        Rule {
            lower: None,
            upper: None,
            excluded: Vec::new(),
        }
    }

    /// A rule accepting exactly `version`
    pub fn exact(version: Version) -> Self {
        Rule {
            lower: Some(Bound::new(version.clone(), true)),
            upper: Some(Bound::new(version, true)),
            excluded: Vec::new(),
        }
    }

    /// A rule accepting every version except `version`
    pub fn excluding(version: Version) -> Self {
        Rule {
            lower: None,
            upper: None,
            excluded: vec![version],
        }
    }

    /// A rule with the given bounds
    pub fn range(lower: Option<Bound>, upper: Option<Bound>) -> Result<Self, VersionParserError> {
        let rule = Rule {
            lower,
            upper,
            excluded: Vec::new(),
        };
        rule.check_non_empty()?;
        Ok(rule)
    }

    /// Expand one constraint clause into a rule
    pub fn from_constraint(constraint: &Constraint) -> Result<Self, VersionParserError> {
        let clause = constraint.pretty_string();

        let version = match constraint.version() {
            VersionPattern::Any => {
                return match constraint.operator() {
                    Operator::Equal | Operator::Wildcard => Ok(Rule::any()),
                    _ => Err(VersionParserError::constraint(clause, "wildcard requires \"==\"")),
                };
            }
            VersionPattern::Prefix(segments) => {
                return match constraint.operator() {
                    Operator::Equal | Operator::Wildcard => Self::prefix_range(segments, clause),
                    _ => Err(VersionParserError::constraint(clause, "wildcard requires \"==\"")),
                };
            }
            VersionPattern::Exact(version) => version.clone(),
        };

        let empty = |_: VersionParserError| VersionParserError::constraint(clause, "empty version range");
        match constraint.operator() {
            Operator::Equal | Operator::Wildcard => Ok(Rule::exact(version)),
            Operator::NotEqual => Ok(Rule::excluding(version)),
            Operator::LessThan => Self::range(None, Some(Bound::new(version, false))).map_err(empty),
            Operator::LessThanOrEqual => Self::range(None, Some(Bound::new(version, true))).map_err(empty),
            Operator::GreaterThan => Self::range(Some(Bound::new(version, false)), None).map_err(empty),
            Operator::GreaterThanOrEqual => Self::range(Some(Bound::new(version, true)), None).map_err(empty),
            Operator::Caret => {
                let position = if version.major() != 0 {
                    0
                } else if version.minor() != 0 {
                    1
                } else {
                    2
                };
                Self::bumped_range(version, position, clause)
            }
            Operator::Tilde | Operator::TildeEqual => {
                let position = match version.release().len() {
                    1 => 0,
                    2 | 3 => 1,
                    n => n - 2,
                };
                Self::bumped_range(version, position, clause)
            }
        }
    }

    fn prefix_range(segments: &[u64], clause: &str) -> Result<Self, VersionParserError> {
        if segments.is_empty() {
            return Ok(Rule::any());
        }
        Self::bumped_range(Version::from_release(segments.to_vec()), segments.len() - 1, clause)
    }

    /// `>=version, <upper` where `upper` is `version` bumped at `position`
    fn bumped_range(version: Version, position: usize, clause: &str) -> Result<Self, VersionParserError> {
        let upper = version
            .bump(position)
            .ok_or_else(|| VersionParserError::constraint(clause, "version segment too large"))?;
        Self::range(Some(Bound::new(version, true)), Some(Bound::new(upper, false)))
            .map_err(|_| VersionParserError::constraint(clause, "empty version range"))
    }

    /// Get the lower bound
    pub fn lower_bound(&self) -> Option<&Bound> {
        self.lower.as_ref()
    }

    /// Get the upper bound
    pub fn upper_bound(&self) -> Option<&Bound> {
        self.upper.as_ref()
    }

    /// Versions excluded with `!=`
    pub fn excluded(&self) -> &[Version] {
        &self.excluded
    }

    /// Check if this rule accepts every version
    pub fn is_match_all(&self) -> bool {
        self.lower.is_none() && self.upper.is_none() && self.excluded.is_empty()
    }

    /// Check if this rule pins a single version
    pub fn is_exact(&self) -> bool {
        match (&self.lower, &self.upper) {
            (Some(lower), Some(upper)) => {
                lower.is_inclusive() && upper.is_inclusive() && lower.version() == upper.version()
            }
            _ => false,
        }
    }

    /// Combine two rules with AND.
    ///
    /// Fails when the combined range would be empty.
    pub fn intersect(&self, other: &Rule) -> Result<Rule, VersionParserError> {
        let lower = match (&self.lower, &other.lower) {
            (Some(a), Some(b)) => Some(if b.is_stricter_lower(a) { b.clone() } else { a.clone() }),
            (a, b) => a.clone().or_else(|| b.clone()),
        };
        let upper = match (&self.upper, &other.upper) {
            (Some(a), Some(b)) => Some(if b.is_stricter_upper(a) { b.clone() } else { a.clone() }),
            (a, b) => a.clone().or_else(|| b.clone()),
        };

        let mut rule = Rule {
            lower,
            upper,
            excluded: Vec::new(),
        };
        rule.check_non_empty()?;

        for version in self.excluded.iter().chain(other.excluded.iter()) {
            if rule.bounds_admit(version) && !rule.excluded.contains(version) {
                rule.excluded.push(version.clone());
            }
        }
        rule.excluded.sort();

        if rule.is_exact() && !rule.excluded.is_empty() {
            return Err(VersionParserError::constraint(&rule.get_versions_str(), "empty version range"));
        }

        Ok(rule)
    }

    fn check_non_empty(&self) -> Result<(), VersionParserError> {
        if let (Some(lower), Some(upper)) = (&self.lower, &self.upper) {
            let empty = match lower.version().cmp(upper.version()) {
                std::cmp::Ordering::Greater => true,
                std::cmp::Ordering::Equal => !(lower.is_inclusive() && upper.is_inclusive()),
                // `>1.0, <1.0.post1` and `>=1.0rc1, <1.0` admit nothing: the only
                // versions between the bounds are post-releases the exclusive lower
                // bound rejects, or pre-releases the exclusive upper bound rejects.
                std::cmp::Ordering::Less => {
                    lower.version().same_release(upper.version())
                        && ((!lower.is_inclusive() && is_final(lower.version()))
                            || (!upper.is_inclusive() && is_final(upper.version())))
                }
            };
            if empty {
                return Err(VersionParserError::constraint(&self.get_versions_str(), "empty version range"));
            }
        }
        Ok(())
    }

    fn bounds_admit(&self, version: &Version) -> bool {
        self.lower.as_ref().map_or(true, |b| b.admits_above(version))
            && self.upper.as_ref().map_or(true, |b| b.admits_below(version))
    }

    /// Check if `version` satisfies this rule
    pub fn contains(&self, version: &Version) -> bool {
        self.bounds_admit(version) && !self.excluded.contains(version)
    }

    /// Parse `check_version` and test it against this rule
    pub fn get_is_match(&self, check_version: &str) -> bool {
        match VersionParser::new().parse(check_version) {
            Ok(version) => self.contains(&version),
            Err(err) => {
                log::debug!("Cannot match \"{}\" against {}: {}", check_version, self, err);
                false
            }
        }
    }

    /// Canonical constraint text, e.g. `>=1.0.0, <2.0.0`
    pub fn get_versions_str(&self) -> String {
        if self.is_match_all() {
            return "==*".to_string();
        }

        let mut parts = Vec::new();
        if self.is_exact() {
            if let Some(ref lower) = self.lower {
                parts.push(format!("=={}", lower.version().normalized()));
            }
        } else {
            if let Some(ref lower) = self.lower {
                let op = if lower.is_inclusive() { ">=" } else { ">" };
                parts.push(format!("{}{}", op, lower.version().normalized()));
            }
            if let Some(ref upper) = self.upper {
                let op = if upper.is_inclusive() { "<=" } else { "<" };
                parts.push(format!("{}{}", op, upper.version().normalized()));
            }
        }
        for version in &self.excluded {
            parts.push(format!("!={}", version.normalized()));
        }
        parts.join(", ")
    }
}

fn is_final(version: &Version) -> bool {
    !version.is_prerelease() && !version.is_postrelease()
}

impl Default for Rule {
    fn default() -> Self {
        Self::any()
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.get_versions_str())
    }
}
