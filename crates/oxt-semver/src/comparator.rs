//! Version comparison utilities

use std::cmp::Ordering;

use crate::constraint::Operator;
use crate::VersionParser;

/// Comparator for comparing version strings.
///
/// Versions that cannot be parsed never compare successfully.
pub struct Comparator;

impl Comparator {
    /// Check if version1 > version2
    pub fn greater_than(version1: &str, version2: &str) -> bool {
        Self::compare(version1, ">", version2)
    }

    /// Check if version1 >= version2
    pub fn greater_than_or_equal_to(version1: &str, version2: &str) -> bool {
        Self::compare(version1, ">=", version2)
    }

    /// Check if version1 < version2
    pub fn less_than(version1: &str, version2: &str) -> bool {
        Self::compare(version1, "<", version2)
    }

    /// Check if version1 <= version2
    pub fn less_than_or_equal_to(version1: &str, version2: &str) -> bool {
        Self::compare(version1, "<=", version2)
    }

    /// Check if version1 == version2
    pub fn equal_to(version1: &str, version2: &str) -> bool {
        Self::compare(version1, "==", version2)
    }

    /// Check if version1 != version2
    pub fn not_equal_to(version1: &str, version2: &str) -> bool {
        Self::compare(version1, "!=", version2)
    }

    /// Compare version1 to version2 using the given operator
    pub fn compare(version1: &str, operator: &str, version2: &str) -> bool {
        let ordering = match Self::ordering(version1, version2) {
            Some(ordering) => ordering,
            None => return false,
        };

        match Operator::from_str(operator) {
            Ok(Operator::Equal) => ordering == Ordering::Equal,
            Ok(Operator::NotEqual) => ordering != Ordering::Equal,
            Ok(Operator::LessThan) => ordering == Ordering::Less,
            Ok(Operator::LessThanOrEqual) => ordering != Ordering::Greater,
            Ok(Operator::GreaterThan) => ordering == Ordering::Greater,
            Ok(Operator::GreaterThanOrEqual) => ordering != Ordering::Less,
            _ => false,
        }
    }

    /// Semantic ordering of two version strings
    pub fn ordering(version1: &str, version2: &str) -> Option<Ordering> {
        let parser = VersionParser::new();
        let v1 = parser.parse(version1).ok()?;
        let v2 = parser.parse(version2).ok()?;
        Some(v1.cmp(&v2))
    }
}
