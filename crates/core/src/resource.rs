use crate::config::{ScanConfig, ScanFilter};
use crate::discovery::RootDiscovery;
use crate::error::{Result, ScanError};
use crate::pattern::Pattern;
use crate::root::Root;
use classscan_plugin::ClassLoader;
use std::collections::BTreeSet;
use std::io::Read;
use std::sync::Arc;

/// Index of resource names reachable from a loader and its ancestors.
///
/// Roots are discovered once at construction; queries only read the
/// in-memory resource sets and never touch the file system again.
#[derive(Debug)]
pub struct ResourceScanner {
    loader: Arc<ClassLoader>,
    filter: ScanFilter,
    roots: Vec<Root>,
}

impl ResourceScanner {
    /// Scan raw resources: prefixes are slash paths, patterns used verbatim.
    pub fn new(loader: &Arc<ClassLoader>, config: &ScanConfig) -> Result<Self> {
        Self::with_filter(loader, config.compile_resources()?)
    }

    /// Scan class files: prefixes are dotted packages, the class-file
    /// pattern is always applied.
    pub fn for_classes(loader: &Arc<ClassLoader>, config: &ScanConfig) -> Result<Self> {
        Self::with_filter(loader, config.compile_classes()?)
    }

    pub fn with_filter(loader: &Arc<ClassLoader>, filter: ScanFilter) -> Result<Self> {
        let roots = RootDiscovery::discover(Some(loader), &filter)?;
        Ok(Self {
            loader: loader.clone(),
            filter,
            roots,
        })
    }

    pub fn loader(&self) -> &Arc<ClassLoader> {
        &self.loader
    }

    /// Prefixes checked before a resource is admitted; one must match
    pub fn prefixes(&self) -> &[String] {
        &self.filter.prefixes
    }

    /// Patterns checked before a resource is admitted; all must match
    pub fn patterns(&self) -> &[Pattern] {
        &self.filter.patterns
    }

    /// Roots in delegation order, each holding at least one resource
    pub fn roots(&self) -> &[Root] {
        &self.roots
    }

    /// Union of every root's resources
    pub fn all_resources(&self) -> BTreeSet<String> {
        self.find(|_| true)
    }

    pub fn find<P>(&self, predicate: P) -> BTreeSet<String>
    where
        P: Fn(&str) -> bool,
    {
        self.roots
            .iter()
            .flat_map(|root| root.resources().iter())
            .filter(|name| predicate(name.as_str()))
            .cloned()
            .collect()
    }

    pub fn find_pattern(&self, pattern: &Pattern) -> BTreeSet<String> {
        self.find(|name| pattern.matches(name))
    }

    /// The first root (in delegation order) that holds `resource`
    pub fn root_for(&self, resource: &str) -> Option<&Root> {
        self.roots.iter().find(|root| root.has(resource))
    }

    pub fn with_stream<T, F>(&self, resource: &str, process: F) -> Result<T>
    where
        F: FnOnce(&mut dyn Read) -> Result<T>,
    {
        let root = self
            .root_for(resource)
            .ok_or_else(|| ScanError::UnknownResource(resource.to_string()))?;
        root.with_stream(resource, process)
    }
}
