use crate::config::ScanFilter;
use crate::error::{Result, ScanError};
use classscan_plugin::ClassLoader;
use std::collections::BTreeSet;
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::debug;
use zip::ZipArchive;

/// An archive (jar/zip) on the classpath. The open archive handle is owned
/// by the root for its whole lifetime.
pub struct ArchiveRoot {
    loader: Arc<ClassLoader>,
    path: PathBuf,
    archive: Mutex<ZipArchive<File>>,
    resources: BTreeSet<String>,
}

impl ArchiveRoot {
    /// Open `path` and collect every stored entry accepted by `filter`.
    /// Returns `None` when nothing matches.
    pub fn scan(loader: &Arc<ClassLoader>, path: &Path, filter: &ScanFilter) -> Result<Option<Self>> {
        let file = File::open(path).map_err(|e| ScanError::io(path, e))?;
        let archive = ZipArchive::new(file).map_err(|source| ScanError::Archive {
            path: path.to_path_buf(),
            source,
        })?;

        let names: Vec<String> = archive.file_names().map(str::to_string).collect();
        let mut resources = BTreeSet::new();

        if should_process(&names, &filter.prefixes) {
            for name in names {
                // Directory entries carry no byte stream
                if name.ends_with('/') {
                    continue;
                }
                if filter.accepts(&name) {
                    resources.insert(name);
                }
            }
        } else {
            debug!("Archive {} holds none of the prefixes, skipped", path.display());
        }

        debug!(
            "Archive {} contributed {} resources",
            path.display(),
            resources.len()
        );

        if resources.is_empty() {
            return Ok(None);
        }

        Ok(Some(Self {
            loader: loader.clone(),
            path: path.to_path_buf(),
            archive: Mutex::new(archive),
            resources,
        }))
    }

    pub fn loader(&self) -> &Arc<ClassLoader> {
        &self.loader
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn resources(&self) -> &BTreeSet<String> {
        &self.resources
    }

    /// The archive stays locked while `process` runs; `process` must not
    /// re-enter this root.
    pub fn with_stream<T, F>(&self, resource: &str, process: F) -> Result<T>
    where
        F: FnOnce(&mut dyn Read) -> Result<T>,
    {
        if !self.resources.contains(resource) {
            return Err(ScanError::UnknownResource(resource.to_string()));
        }
        let mut archive = self
            .archive
            .lock()
            .map_err(|_| ScanError::Runtime(format!("archive lock poisoned: {}", self.path.display())))?;
        let mut entry = archive.by_name(resource).map_err(|source| ScanError::Archive {
            path: self.path.clone(),
            source,
        })?;
        process(&mut entry)
    }
}

impl fmt::Debug for ArchiveRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArchiveRoot")
            .field("scope", &self.loader.id())
            .field("path", &self.path)
            .field("resources", &self.resources.len())
            .finish()
    }
}

/// Cheap negative check: with prefixes configured, at least one of them must
/// be stored as an entry (`prefix` or `prefix/`) for the archive to be scanned.
fn should_process(names: &[String], prefixes: &[String]) -> bool {
    if prefixes.is_empty() {
        return true;
    }
    prefixes.iter().any(|prefix| {
        let dir = format!("{}/", prefix.trim_end_matches('/'));
        names.iter().any(|name| name == prefix || *name == dir)
    })
}
