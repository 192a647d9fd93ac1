//! Resource name filtering.
//!
//! Patterns are AND-combined whole-string matchers; prefixes are OR-combined
//! path prefixes. Prefixes are canonical slash-separated strings once they
//! reach this module.

use crate::error::{Result, ScanError};
use regex::Regex;
use std::fmt;

/// Source of the fixed filter folded into every class scan
pub const CLASS_PATTERN: &str = r".*\.class";

/// A regex that must match the whole resource name
#[derive(Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    pub fn new(source: &str) -> Result<Self> {
        let regex = Regex::new(&format!("^(?:{source})$")).map_err(|e| {
            ScanError::InvalidPattern {
                pattern: source.to_string(),
                source: e,
            }
        })?;
        Ok(Self {
            source: source.to_string(),
            regex,
        })
    }

    pub fn class_files() -> Self {
        Self::new(CLASS_PATTERN).expect("class pattern is a valid regex")
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn matches(&self, name: &str) -> bool {
        self.regex.is_match(name)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for Pattern {}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Pattern").field(&self.source).finish()
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// True iff every pattern matches the whole name. No patterns match everything.
pub fn matches_all(name: &str, patterns: &[Pattern]) -> bool {
    patterns.iter().all(|p| p.matches(name))
}

/// True iff no prefixes are configured or the name starts with one of them.
pub fn matches_any_prefix(name: &str, prefixes: &[String]) -> bool {
    prefixes.is_empty() || prefixes.iter().any(|p| name.starts_with(p.as_str()))
}

/// Canonical slash form of a resource prefix: `\` becomes `/`, no leading separator.
pub fn normalize_prefix(prefix: &str) -> String {
    prefix.replace('\\', "/").trim_start_matches('/').to_string()
}

/// `com.example` -> `com/example`
pub fn package_to_prefix(package: &str) -> String {
    normalize_prefix(&package.replace('.', "/"))
}

/// Append `extra` unless an equal pattern is already present.
pub fn fold_pattern(mut patterns: Vec<Pattern>, extra: Pattern) -> Vec<Pattern> {
    if !patterns.contains(&extra) {
        patterns.push(extra);
    }
    patterns
}
