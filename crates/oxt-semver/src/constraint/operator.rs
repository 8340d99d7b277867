//! Operator types for version constraints

use std::fmt;
use thiserror::Error;

/// Comparison and range operators for version constraints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// Equal (==)
    Equal,
    /// Not equal (!=)
    NotEqual,
    /// Less than (<)
    LessThan,
    /// Less than or equal (<=)
    LessThanOrEqual,
    /// Greater than (>)
    GreaterThan,
    /// Greater than or equal (>=)
    GreaterThanOrEqual,
    /// Caret range (^)
    Caret,
    /// Tilde range (~)
    Tilde,
    /// Compatible release (~=)
    TildeEqual,
    /// Any version, or a `1.2.*` prefix
    Wildcard,
}

#[derive(Error, Debug)]
#[error("Invalid operator: {0}")]
pub struct InvalidOperatorError(pub String);

/// Clause prefixes in match order, longest first so `<=` is never read as `<`
const PREFIXES: &[(&str, Operator)] = &[
    ("<=", Operator::LessThanOrEqual),
    (">=", Operator::GreaterThanOrEqual),
    ("==", Operator::Equal),
    ("!=", Operator::NotEqual),
    ("~=", Operator::TildeEqual),
    ("<", Operator::LessThan),
    (">", Operator::GreaterThan),
    ("^", Operator::Caret),
    ("~", Operator::Tilde),
    ("=", Operator::Equal),
];

impl Operator {
    /// Parse operator from string
    pub fn from_str(s: &str) -> Result<Self, InvalidOperatorError> {
        match s {
            "=" | "==" => Ok(Operator::Equal),
            "!=" => Ok(Operator::NotEqual),
            "<" => Ok(Operator::LessThan),
            "<=" => Ok(Operator::LessThanOrEqual),
            ">" => Ok(Operator::GreaterThan),
            ">=" => Ok(Operator::GreaterThanOrEqual),
            "^" => Ok(Operator::Caret),
            "~" => Ok(Operator::Tilde),
            "~=" => Ok(Operator::TildeEqual),
            "*" => Ok(Operator::Wildcard),
            _ => Err(InvalidOperatorError(s.to_string())),
        }
    }

    /// Get the string representation of the operator
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Equal => "==",
            Operator::NotEqual => "!=",
            Operator::LessThan => "<",
            Operator::LessThanOrEqual => "<=",
            Operator::GreaterThan => ">",
            Operator::GreaterThanOrEqual => ">=",
            Operator::Caret => "^",
            Operator::Tilde => "~",
            Operator::TildeEqual => "~=",
            Operator::Wildcard => "*",
        }
    }

    /// Split a clause into its leading operator and the remaining text
    pub fn split_prefix(clause: &str) -> Option<(Operator, &str)> {
        PREFIXES
            .iter()
            .find(|(prefix, _)| clause.starts_with(prefix))
            .map(|(prefix, op)| (*op, &clause[prefix.len()..]))
    }

    /// Operators accepted as a clause prefix
    pub fn supported_operators() -> &'static [&'static str] {
        &["<=", ">=", "==", "!=", "~=", "<", ">", "^", "~"]
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
