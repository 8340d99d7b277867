//! Requirement strings to rules, and rule evaluation against installed versions

use std::collections::HashMap;
use std::sync::RwLock;

use lazy_static::lazy_static;

use crate::constraint::Rule;
use crate::{VersionParser, VersionParserError};

lazy_static! {
    // Read-through cache keyed by the raw requirement string
    static ref RULE_CACHE: RwLock<HashMap<String, Vec<Rule>>> = RwLock::new(HashMap::new());
}

/// Outcome of parsing one requirement string
#[derive(Debug, Clone, Default)]
pub struct ParsedRules {
    /// At most one rule: every valid clause AND-ed together
    pub rules: Vec<Rule>,
    /// Clauses that were skipped, with the reason
    pub rejected: Vec<VersionParserError>,
}

impl ParsedRules {
    pub fn is_valid(&self) -> bool {
        !self.rules.is_empty()
    }
}

/// Turns requirement strings such as `>=1.0, <2.0` or `^1.2` into rules and
/// evaluates installed versions against them.
#[derive(Debug, Default, Clone, Copy)]
pub struct VerRules {
    parser: VersionParser,
}

impl VerRules {
    pub fn new() -> Self {
        VerRules {
            parser: VersionParser::new(),
        }
    }

    /// Parse a requirement string without touching the cache.
    ///
    /// Clauses are separated by `,` or `;`. Malformed clauses are skipped and
    /// reported in [`ParsedRules::rejected`]; the remaining clauses still
    /// produce a rule. A blank string, `*` or `==*` yields the match-all rule.
    pub fn parse(&self, requirement: &str) -> ParsedRules {
        let requirement = requirement.trim();
        if requirement.is_empty() || requirement == "*" || requirement == "==*" {
            return ParsedRules {
                rules: vec![Rule::any()],
                rejected: Vec::new(),
            };
        }

        let mut combined: Option<Rule> = None;
        let mut rejected = Vec::new();

        for clause in split_clauses(requirement) {
            let rule = match self
                .parser
                .parse_constraint(clause)
                .and_then(|constraint| Rule::from_constraint(&constraint))
            {
                Ok(rule) => rule,
                Err(err) => {
                    log::warn!("Skipping requirement clause \"{}\": {}", clause, err);
                    rejected.push(err);
                    continue;
                }
            };

            combined = match combined {
                None => Some(rule),
                Some(current) => match current.intersect(&rule) {
                    Ok(merged) => Some(merged),
                    Err(err) => {
                        log::warn!("Skipping requirement clause \"{}\": {}", clause, err);
                        rejected.push(err);
                        Some(current)
                    }
                },
            };
        }

        ParsedRules {
            rules: combined.into_iter().collect(),
            rejected,
        }
    }

    /// Rules matching a requirement string; empty when no clause is valid
    pub fn get_matched_rules(&self, requirement: &str) -> Vec<Rule> {
        if let Ok(cache) = RULE_CACHE.read() {
            if let Some(rules) = cache.get(requirement) {
                return rules.clone();
            }
        }

        let rules = self.parse(requirement).rules;
        log::trace!("Rules for \"{}\": {:?}", requirement, rules);

        if let Ok(mut cache) = RULE_CACHE.write() {
            cache.insert(requirement.to_string(), rules.clone());
        }
        rules
    }

    /// Check an installed version against every rule (AND).
    ///
    /// No rules accepts any version. An unparseable version never matches.
    pub fn get_installed_is_valid_by_rules(&self, rules: &[Rule], check_version: &str) -> bool {
        if rules.is_empty() {
            return true;
        }
        let version = match self.parser.parse(check_version) {
            Ok(version) => version,
            Err(err) => {
                log::debug!("Installed version \"{}\" is not valid: {}", check_version, err);
                return false;
            }
        };
        rules.iter().all(|rule| rule.contains(&version))
    }

    /// Check an installed version against a requirement string.
    ///
    /// A requirement that yields no rule is invalid and never matches.
    pub fn get_installed_is_valid(&self, vstr: &str, check_version: &str) -> bool {
        let rules = self.get_matched_rules(vstr);
        if rules.is_empty() {
            log::debug!("No rules found for requirement \"{}\"", vstr);
            return false;
        }
        self.get_installed_is_valid_by_rules(&rules, check_version)
    }

    /// Canonicalize user-entered requirement text for storage.
    ///
    /// `^1.0; !=1.5` becomes `>=1.0.0, <2.0.0, !=1.5.0`. Blank text clears the
    /// requirement. Text where no clause can be matched is an
    /// [`VersionParserError::InvalidVersion`] so the caller can show it.
    pub fn normalize_requirement(&self, text: &str) -> Result<String, VersionParserError> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(String::new());
        }

        let mut matched: Vec<String> = Vec::new();
        for clause in split_clauses(text) {
            let clause = if clause == "*" { "==*" } else { clause };
            for rule in self.get_matched_rules(clause) {
                matched.extend(
                    rule.get_versions_str()
                        .split(',')
                        .map(|part| part.trim().to_string())
                        .filter(|part| !part.is_empty()),
                );
            }
        }

        if matched.is_empty() {
            log::error!(
                "Invalid requirement: '{}'. Must be in format of ==1.0.0 or >=1.0.0, <2.0.0 or ^1.0 etc.",
                text
            );
            return Err(VersionParserError::InvalidVersion(text.to_string()));
        }

        // Re-parse the joined parts so overlapping clauses collapse into one range
        let joined = matched.join(", ");
        match self.get_matched_rules(&joined).first() {
            Some(rule) => Ok(rule.get_versions_str()),
            None => Ok(joined),
        }
    }

    /// Drop every cached rule
    pub fn clear_cache() {
        if let Ok(mut cache) = RULE_CACHE.write() {
            cache.clear();
        }
    }
}

/// Split a requirement string on `,` and `;`, dropping empty clauses
fn split_clauses(requirement: &str) -> impl Iterator<Item = &str> {
    requirement
        .split([',', ';'])
        .map(str::trim)
        .filter(|clause| !clause.is_empty())
}
