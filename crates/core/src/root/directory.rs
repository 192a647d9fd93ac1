use crate::config::ScanFilter;
use crate::error::{Result, ScanError};
use classscan_plugin::ClassLoader;
use std::collections::BTreeSet;
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;
use walkdir::WalkDir;

/// A directory tree on the classpath
pub struct DirectoryRoot {
    loader: Arc<ClassLoader>,
    directory: PathBuf,
    resources: BTreeSet<String>,
}

impl DirectoryRoot {
    /// Walk `directory` and collect every file accepted by `filter`.
    /// Returns `None` when nothing matches.
    pub fn scan(loader: &Arc<ClassLoader>, directory: &Path, filter: &ScanFilter) -> Result<Option<Self>> {
        let mut resources = BTreeSet::new();

        if filter.prefixes.is_empty() {
            Self::walk(directory, directory, filter, &mut resources)?;
        } else {
            for prefix in &filter.prefixes {
                if let Some(start) = walk_start(directory, prefix) {
                    Self::walk(directory, &start, filter, &mut resources)?;
                }
            }
        }

        debug!(
            "Directory {} contributed {} resources",
            directory.display(),
            resources.len()
        );

        if resources.is_empty() {
            return Ok(None);
        }

        Ok(Some(Self {
            loader: loader.clone(),
            directory: directory.to_path_buf(),
            resources,
        }))
    }

    fn walk(base: &Path, start: &Path, filter: &ScanFilter, resources: &mut BTreeSet<String>) -> Result<()> {
        for entry in WalkDir::new(start).follow_links(true).sort_by_file_name() {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            let Some(name) = resource_name(base, entry.path()) else {
                continue;
            };
            if filter.accepts(&name) {
                resources.insert(name);
            }
        }
        Ok(())
    }

    pub fn loader(&self) -> &Arc<ClassLoader> {
        &self.loader
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn resources(&self) -> &BTreeSet<String> {
        &self.resources
    }

    pub fn with_stream<T, F>(&self, resource: &str, process: F) -> Result<T>
    where
        F: FnOnce(&mut dyn Read) -> Result<T>,
    {
        if !self.resources.contains(resource) {
            return Err(ScanError::UnknownResource(resource.to_string()));
        }
        let path = self.directory.join(resource);
        let mut file = File::open(&path).map_err(|e| ScanError::io(&path, e))?;
        process(&mut file)
    }
}

impl fmt::Debug for DirectoryRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DirectoryRoot")
            .field("scope", &self.loader.id())
            .field("directory", &self.directory)
            .field("resources", &self.resources.len())
            .finish()
    }
}

/// Where to begin walking for `prefix`: the directory part before its last
/// segment. `com/foo` starts at `com` so that `com/foobar` is still seen.
fn walk_start(directory: &Path, prefix: &str) -> Option<PathBuf> {
    // Resource names never contain `..`, so such a prefix admits nothing
    if prefix.split('/').any(|segment| segment == "..") {
        return None;
    }
    let parent = match prefix.rfind('/') {
        Some(idx) => directory.join(&prefix[..idx]),
        None => directory.to_path_buf(),
    };
    parent.is_dir().then_some(parent)
}

/// Root-relative, slash-separated name of `file`
fn resource_name(base: &Path, file: &Path) -> Option<String> {
    let relative = file.strip_prefix(base).ok()?;
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    if parts.is_empty() {
        return None;
    }
    Some(parts.join("/"))
}
