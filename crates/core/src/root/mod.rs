//! Scan origins.
//!
//! A [`Root`] is one physical classpath entry (directory tree or archive)
//! bound to the loader that contributed it. Its resource set is sorted,
//! deduplicated and fixed at construction.

pub mod archive;
pub mod directory;

pub use archive::ArchiveRoot;
pub use directory::DirectoryRoot;

use crate::error::Result;
use classscan_plugin::{ClassLoader, ScopeId};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RootKind {
    Directory,
    Archive,
}

#[derive(Debug)]
pub enum Root {
    Directory(DirectoryRoot),
    Archive(ArchiveRoot),
}

impl Root {
    pub fn loader(&self) -> &Arc<ClassLoader> {
        match self {
            Root::Directory(root) => root.loader(),
            Root::Archive(root) => root.loader(),
        }
    }

    pub fn scope(&self) -> ScopeId {
        self.loader().id()
    }

    pub fn resources(&self) -> &BTreeSet<String> {
        match self {
            Root::Directory(root) => root.resources(),
            Root::Archive(root) => root.resources(),
        }
    }

    pub fn has(&self, resource: &str) -> bool {
        self.resources().contains(resource)
    }

    /// Directory path or archive file path
    pub fn origin(&self) -> &Path {
        match self {
            Root::Directory(root) => root.directory(),
            Root::Archive(root) => root.path(),
        }
    }

    pub fn kind(&self) -> RootKind {
        match self {
            Root::Directory(_) => RootKind::Directory,
            Root::Archive(_) => RootKind::Archive,
        }
    }

    /// Open `resource`, hand the stream to `process`, release it on every exit path.
    pub fn with_stream<T, F>(&self, resource: &str, process: F) -> Result<T>
    where
        F: FnOnce(&mut dyn Read) -> Result<T>,
    {
        match self {
            Root::Directory(root) => root.with_stream(resource, process),
            Root::Archive(root) => root.with_stream(resource, process),
        }
    }

    /// Process every resource in order, one scoped stream at a time.
    pub fn with_each_stream<T, F>(&self, mut process: F) -> Result<BTreeMap<String, T>>
    where
        F: FnMut(&str, &mut dyn Read) -> Result<T>,
    {
        let mut results = BTreeMap::new();
        for resource in self.resources() {
            let value = self.with_stream(resource, |reader| process(resource, reader))?;
            results.insert(resource.clone(), value);
        }
        Ok(results)
    }
}

/// Roots are equal when bound to the same scope with the same resources.
impl PartialEq for Root {
    fn eq(&self, other: &Self) -> bool {
        self.kind() == other.kind()
            && self.scope() == other.scope()
            && self.resources() == other.resources()
    }
}

impl Eq for Root {}
