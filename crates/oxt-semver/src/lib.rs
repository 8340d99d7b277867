//! Version parsing and requirement matching for pip-style constraints
//!
//! This crate parses version literals and requirement strings such as
//! `>=1.0, <2.0`, `^1.2`, `~=1.4` or `1.2.*` into normalized [`Rule`]s and
//! checks installed versions against them.

pub mod constraint;
mod comparator;
mod semver;
mod ver_rules;
mod version;
mod version_parser;

pub use comparator::Comparator;
pub use constraint::{Bound, Constraint, Operator, Rule};
pub use semver::Semver;
pub use ver_rules::{ParsedRules, VerRules};
pub use version::{Stability, Version};
pub use version_parser::{VersionParser, VersionParserError, VersionPattern, MAX_RELEASE_SEGMENTS};
