use classscan_core::ScanConfig;
use classscan_plugin::ClassLoader;
use clap::Args;
use std::ffi::OsString;
use std::path::PathBuf;
use std::sync::Arc;

/// Flags shared by every subcommand
#[derive(Args, Debug, Clone, Default)]
pub struct ScanArgs {
    /// Classpath entries, separated like PATH. Defaults to the current directory.
    #[arg(long, short = 'c', value_name = "PATHS")]
    pub classpath: Option<OsString>,

    /// Entries of a parent loader, consulted after the classpath
    #[arg(long, value_name = "PATHS")]
    pub parent_classpath: Option<OsString>,

    /// Resource prefix (com/foo), or package (com.foo) for queries. Repeatable.
    #[arg(long = "prefix", visible_alias = "package", value_name = "PREFIX")]
    pub prefixes: Vec<String>,

    /// Regex every resource name must match in full. Repeatable.
    #[arg(long = "pattern", value_name = "REGEX")]
    pub patterns: Vec<String>,

    /// JSON file with `prefixes` and `patterns`, merged with the flags
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long)]
    pub json: bool,

    /// Also log to stderr
    #[arg(long, short = 'v')]
    pub verbose: bool,
}

impl ScanArgs {
    pub fn scan_config(&self) -> classscan_core::Result<ScanConfig> {
        let base = match &self.config {
            Some(path) => ScanConfig::from_json_file(path)?,
            None => ScanConfig::new(),
        };
        Ok(base.merge(ScanConfig {
            prefixes: self.prefixes.clone(),
            patterns: self.patterns.clone(),
        }))
    }

    /// Loader for `--classpath`, delegating to a loader for `--parent-classpath`
    pub fn loader(&self) -> Result<Arc<ClassLoader>, classscan_plugin::LoaderError> {
        let parent = match &self.parent_classpath {
            Some(paths) => Some(Arc::new(ClassLoader::from_paths(
                "parent",
                std::env::split_paths(paths),
                None,
            )?)),
            None => None,
        };

        let entries: Vec<PathBuf> = match &self.classpath {
            Some(paths) => std::env::split_paths(paths).collect(),
            None => vec![PathBuf::from(".")],
        };
        Ok(Arc::new(ClassLoader::from_paths("app", entries, parent)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loader_chain_from_path_lists() {
        let joined = std::env::join_paths(["/tmp/a", "/tmp/b.jar"]).unwrap();
        let args = ScanArgs {
            classpath: Some(joined),
            parent_classpath: Some(OsString::from("/tmp/parent")),
            ..Default::default()
        };

        let loader = args.loader().unwrap();
        assert_eq!(loader.entries().len(), 2);
        assert!(loader.entries()[1].as_str().ends_with("/tmp/b.jar"));

        let parent = loader.parent().unwrap();
        assert_eq!(parent.entries().len(), 1);
        assert!(parent.parent().is_none());
    }

    #[test]
    fn test_flags_merge_into_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("scan.json");
        std::fs::write(&file, r#"{"prefixes": ["com/foo"], "patterns": [".*\\.xml"]}"#).unwrap();

        let args = ScanArgs {
            config: Some(file),
            prefixes: vec!["com/bar".to_string()],
            ..Default::default()
        };

        let config = args.scan_config().unwrap();
        assert_eq!(config.prefixes, vec!["com/foo", "com/bar"]);
        assert_eq!(config.patterns, vec![r".*\.xml"]);
    }
}
