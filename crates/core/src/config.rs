//! Scan configuration.
//!
//! [`ScanConfig`] is the user-facing, serializable form. Compiling it yields a
//! [`ScanFilter`], the immutable prefix/pattern pair that discovery applies to
//! every candidate resource.

use crate::error::{Result, ScanError};
use crate::pattern::{self, Pattern};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Resource prefixes (`com/foo`), or packages (`com.foo`) for class scans
    pub prefixes: Vec<String>,
    /// Whole-string regexes every resource must match
    pub patterns: Vec<String>,
}

impl ScanConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefixes.push(prefix.into());
        self
    }

    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.patterns.push(pattern.into());
        self
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ScanError::io(path, e))?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Merge another configuration's prefixes and patterns into this one.
    pub fn merge(mut self, other: ScanConfig) -> Self {
        self.prefixes.extend(other.prefixes);
        self.patterns.extend(other.patterns);
        self
    }

    /// Filter for raw resources: prefixes are slash paths, patterns verbatim.
    pub fn compile_resources(&self) -> Result<ScanFilter> {
        let prefixes = self
            .prefixes
            .iter()
            .map(|p| checked_prefix(p, pattern::normalize_prefix(p)))
            .collect::<Result<_>>()?;
        Ok(ScanFilter {
            prefixes,
            patterns: self.compile_patterns()?,
        })
    }

    /// Filter for class files: prefixes are dotted packages, and the fixed
    /// class-file pattern is always present.
    pub fn compile_classes(&self) -> Result<ScanFilter> {
        let prefixes = self
            .prefixes
            .iter()
            .map(|p| checked_prefix(p, pattern::package_to_prefix(p)))
            .collect::<Result<_>>()?;
        let patterns = pattern::fold_pattern(self.compile_patterns()?, Pattern::class_files());
        Ok(ScanFilter { prefixes, patterns })
    }

    fn compile_patterns(&self) -> Result<Vec<Pattern>> {
        self.patterns.iter().map(|p| Pattern::new(p)).collect()
    }
}

/// A prefix may not climb out of the root it is applied to.
fn checked_prefix(raw: &str, normalized: String) -> Result<String> {
    if normalized.split('/').any(|segment| segment == "..") {
        return Err(ScanError::Config(format!(
            "prefix `{raw}` contains a `..` segment"
        )));
    }
    Ok(normalized)
}

/// Compiled, immutable resource filter
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanFilter {
    pub prefixes: Vec<String>,
    pub patterns: Vec<Pattern>,
}

impl ScanFilter {
    pub fn accepts(&self, name: &str) -> bool {
        pattern::matches_any_prefix(name, &self.prefixes) && pattern::matches_all(name, &self.patterns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::CLASS_PATTERN;

    #[test]
    fn test_compile_classes_converts_packages() {
        let filter = ScanConfig::new()
            .with_prefix("com.foo")
            .compile_classes()
            .unwrap();
        assert_eq!(filter.prefixes, vec!["com/foo".to_string()]);
        assert_eq!(filter.patterns.len(), 1);
        assert_eq!(filter.patterns[0].as_str(), CLASS_PATTERN);
        assert!(filter.accepts("com/foo/Bar.class"));
        assert!(!filter.accepts("com/foo/bar.txt"));
    }

    #[test]
    fn test_compile_resources_keeps_dots() {
        let filter = ScanConfig::new()
            .with_prefix("/META-INF/app.d")
            .compile_resources()
            .unwrap();
        assert_eq!(filter.prefixes, vec!["META-INF/app.d".to_string()]);
        assert!(filter.patterns.is_empty());
    }

    #[test]
    fn test_config_from_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.json");
        std::fs::write(&path, r#"{ "prefixes": ["com/foo"], "patterns": [".*\\.properties"] }"#)
            .unwrap();

        let config = ScanConfig::from_json_file(&path).unwrap();
        assert_eq!(config.prefixes, vec!["com/foo".to_string()]);

        let filter = config.compile_resources().unwrap();
        assert!(filter.accepts("com/foo/x.properties"));
        assert!(!filter.accepts("com/bar/y.properties"));
        assert!(!filter.accepts("com/foo/z.txt"));
    }

    #[test]
    fn test_parent_segments_are_rejected() {
        for prefix in ["../outside", "com/../../etc", "com\\..\\x", ".."] {
            let err = ScanConfig::new().with_prefix(prefix).compile_resources().unwrap_err();
            assert!(matches!(err, ScanError::Config(_)), "{prefix}");
        }
        // Dots inside a segment are fine
        assert!(ScanConfig::new().with_prefix("a..b/c").compile_resources().is_ok());
    }

    #[test]
    fn test_missing_fields_default() {
        let config: ScanConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, ScanConfig::default());
    }
}
