//! Single constraint clause

use std::fmt;

use super::Operator;
use crate::version_parser::VersionPattern;

/// One parsed constraint clause (e.g. `>=1.0.0`, `^0.2`, `1.2.*`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constraint {
    operator: Operator,
    version: VersionPattern,
    pretty_string: String,
}

impl Constraint {
    /// Create a new constraint
    pub fn new(operator: Operator, version: VersionPattern, pretty: &str) -> Self {
        Constraint {
            operator,
            version,
            pretty_string: pretty.to_string(),
        }
    }

    /// Get the operator
    pub fn operator(&self) -> Operator {
        self.operator
    }

    /// Get the version literal
    pub fn version(&self) -> &VersionPattern {
        &self.version
    }

    /// The clause text as it was written
    pub fn pretty_string(&self) -> &str {
        &self.pretty_string
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version {
            VersionPattern::Any => write!(f, "==*"),
            VersionPattern::Prefix(segments) => {
                let prefix: Vec<String> = segments.iter().map(|s| s.to_string()).collect();
                let op = if self.operator == Operator::Wildcard {
                    Operator::Equal
                } else {
                    self.operator
                };
                write!(f, "{}{}.*", op, prefix.join("."))
            }
            VersionPattern::Exact(version) => write!(f, "{}{}", self.operator, version.normalized()),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::VersionParser;

    #[test]
    fn test_display() {
        let parser = VersionParser::new();

        assert_eq!(parser.parse_constraint(">= 1.0").unwrap().to_string(), ">=1.0.0");
        assert_eq!(parser.parse_constraint("1.2").unwrap().to_string(), "==1.2.0");
        assert_eq!(parser.parse_constraint("^0.2").unwrap().to_string(), "^0.2.0");
        assert_eq!(parser.parse_constraint("1.2.*").unwrap().to_string(), "==1.2.*");
        assert_eq!(parser.parse_constraint("*").unwrap().to_string(), "==*");
    }
}
