//! Version and constraint clause parsing

use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

use crate::constraint::{Constraint, Operator};
use crate::version::{Stability, Version};

/// Most release segments a version literal may carry
pub const MAX_RELEASE_SEGMENTS: usize = 4;

/// Error type for version and constraint parsing
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VersionParserError {
    #[error("Invalid version string \"{0}\"")]
    InvalidVersion(String),
    #[error("Could not parse version constraint \"{constraint}\": {reason}")]
    InvalidConstraint { constraint: String, reason: String },
    #[error("Invalid operator \"{0}\"")]
    InvalidOperator(String),
}

impl VersionParserError {
    pub(crate) fn constraint(constraint: &str, reason: impl Into<String>) -> Self {
        VersionParserError::InvalidConstraint {
            constraint: constraint.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<crate::constraint::InvalidOperatorError> for VersionParserError {
    fn from(err: crate::constraint::InvalidOperatorError) -> Self {
        VersionParserError::InvalidOperator(err.0)
    }
}

lazy_static! {
    // release, then optional pre, post, dev and local parts
    static ref VERSION_RE: Regex = Regex::new(concat!(
        r"(?i)^v?(?P<release>\d+(?:\.\d+)*)",
        r"(?:[._-]?(?P<pre_l>alpha|a|beta|b|preview|pre|rc|c)[._-]?(?P<pre_n>\d+)?)?",
        r"(?:-(?P<post_implicit>\d+)|[._-]?(?P<post_l>post|rev|r|patch|pl|p)[._-]?(?P<post_n>\d+)?)?",
        r"(?:[._-]?(?P<dev_l>dev)[._-]?(?P<dev_n>\d+)?)?",
        r"(?:\+(?P<local>[a-z0-9]+(?:[._-][a-z0-9]+)*))?$",
    ))
    .unwrap();

    // 1.*, 1.2.*, v1.2.*
    static ref PREFIX_RE: Regex = Regex::new(r"(?i)^v?(\d+(?:\.\d+){0,2})\.\*$").unwrap();
}

/// A version literal that may contain a wildcard
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionPattern {
    /// `*`, every version
    Any,
    /// `1.2.*`, every version whose release starts with these segments
    Prefix(Vec<u64>),
    /// A complete version literal
    Exact(Version),
}

/// Parser for version literals and single constraint clauses
#[derive(Debug, Default, Clone, Copy)]
pub struct VersionParser;

impl VersionParser {
    /// Create a new version parser
    pub fn new() -> Self {
        VersionParser
    }

    /// Check if a version string is valid
    pub fn is_valid(&self, version: &str) -> bool {
        self.parse(version).is_ok()
    }

    /// Parse a version literal such as `1.2.3`, `2.0`, `1.2.3rc1` or `1.0.post1+local`
    pub fn parse(&self, version: &str) -> Result<Version, VersionParserError> {
        let version = version.trim();
        if version.is_empty() {
            return Err(VersionParserError::InvalidVersion(String::new()));
        }

        let caps = VERSION_RE
            .captures(version)
            .ok_or_else(|| VersionParserError::InvalidVersion(version.to_string()))?;

        let release_str = caps.name("release").map_or("", |m| m.as_str());
        let release = release_str
            .split('.')
            .map(|part| part.parse::<u64>())
            .collect::<Result<Vec<u64>, _>>()
            .map_err(|_| VersionParserError::InvalidVersion(version.to_string()))?;

        if release.len() > MAX_RELEASE_SEGMENTS {
            return Err(VersionParserError::InvalidVersion(version.to_string()));
        }

        let pre = match caps.name("pre_l") {
            Some(label) => Some((
                expand_stability(label.as_str()),
                parse_number(caps.name("pre_n"), version)?,
            )),
            None => None,
        };

        let post = if let Some(number) = caps.name("post_implicit") {
            Some(parse_number(Some(number), version)?)
        } else if caps.name("post_l").is_some() {
            Some(parse_number(caps.name("post_n"), version)?)
        } else {
            None
        };

        let dev = match caps.name("dev_l") {
            Some(_) => Some(parse_number(caps.name("dev_n"), version)?),
            None => None,
        };

        let local = caps.name("local").map(|m| m.as_str().to_lowercase());

        Ok(Version::new(release, pre, post, dev, local, version.to_string()))
    }

    /// Parse a version literal, accepting `*` and `X.Y.*` wildcards
    pub fn parse_pattern(&self, version: &str) -> Result<VersionPattern, VersionParserError> {
        let version = version.trim();
        if version == "*" {
            return Ok(VersionPattern::Any);
        }

        if let Some(caps) = PREFIX_RE.captures(version) {
            let segments = caps
                .get(1)
                .map_or("", |m| m.as_str())
                .split('.')
                .map(|part| part.parse::<u64>())
                .collect::<Result<Vec<u64>, _>>()
                .map_err(|_| VersionParserError::InvalidVersion(version.to_string()))?;
            return Ok(VersionPattern::Prefix(segments));
        }

        self.parse(version).map(VersionPattern::Exact)
    }

    /// Tokenize one constraint clause (operator and version literal)
    pub fn parse_constraint(&self, clause: &str) -> Result<Constraint, VersionParserError> {
        let clause = clause.trim();
        if clause.is_empty() {
            return Err(VersionParserError::constraint(clause, "empty constraint"));
        }

        if clause == "*" {
            return Ok(Constraint::new(Operator::Wildcard, VersionPattern::Any, clause));
        }

        let (operator, version_str) = match Operator::split_prefix(clause) {
            Some(split) => split,
            None if starts_like_version(clause) => (Operator::Equal, clause),
            None => {
                return Err(VersionParserError::constraint(
                    clause,
                    format!(
                        "unknown operator, expected one of: {}",
                        Operator::supported_operators().join(", ")
                    ),
                ))
            }
        };

        let version_str = version_str.trim();
        if version_str.is_empty() {
            return Err(VersionParserError::constraint(clause, "empty version"));
        }

        let pattern = match operator {
            Operator::Equal | Operator::NotEqual => self.parse_pattern(version_str)?,
            _ => VersionPattern::Exact(self.parse(version_str)?),
        };

        let operator = match (&operator, &pattern) {
            (Operator::Equal, VersionPattern::Any) => Operator::Wildcard,
            (Operator::Equal, VersionPattern::Prefix(_)) => Operator::Wildcard,
            _ => operator,
        };

        Ok(Constraint::new(operator, pattern, clause))
    }
}

fn starts_like_version(clause: &str) -> bool {
    let mut chars = clause.chars();
    match chars.next() {
        Some(c) if c.is_ascii_digit() => true,
        Some('v') | Some('V') => chars.next().map_or(false, |c| c.is_ascii_digit()),
        _ => false,
    }
}

fn parse_number(m: Option<regex::Match<'_>>, version: &str) -> Result<u64, VersionParserError> {
    match m {
        Some(m) => m
            .as_str()
            .parse()
            .map_err(|_| VersionParserError::InvalidVersion(version.to_string())),
        None => Ok(0),
    }
}

/// Expand shorthand pre-release labels
fn expand_stability(label: &str) -> Stability {
    match label.to_lowercase().as_str() {
        "a" | "alpha" => Stability::Alpha,
        "b" | "beta" => Stability::Beta,
        _ => Stability::RC,
    }
}
