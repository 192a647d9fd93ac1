//! Root discovery along a loader's delegation chain.
//!
//! Discovery is a pure function of `(loader chain, filter)`: each loader's
//! own `file:` entries are visited in declaration order, self before parent,
//! and every entry holding at least one accepted resource becomes a [`Root`].

use crate::config::ScanFilter;
use crate::error::{Result, ScanError};
use crate::root::{ArchiveRoot, DirectoryRoot, Root};
use classscan_plugin::ClassLoader;
use classscan_plugin::loader::local_path;
use std::io::ErrorKind;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

pub struct RootDiscovery;

impl RootDiscovery {
    /// Roots for `loader` and all of its ancestors. `None` yields no roots.
    pub fn discover(loader: Option<&Arc<ClassLoader>>, filter: &ScanFilter) -> Result<Vec<Root>> {
        let start = std::time::Instant::now();
        let mut roots = Vec::new();

        if let Some(loader) = loader {
            for scope in ClassLoader::chain(loader) {
                roots.extend(Self::discover_own(&scope, filter)?);
            }
        }

        info!(
            "Root discovery complete: {} roots, {} resources in {:?}",
            roots.len(),
            roots.iter().map(|r| r.resources().len()).sum::<usize>(),
            start.elapsed()
        );

        Ok(roots)
    }

    /// Roots contributed by `loader` alone, in entry order
    pub fn discover_own(loader: &Arc<ClassLoader>, filter: &ScanFilter) -> Result<Vec<Root>> {
        let mut roots = Vec::new();
        for url in loader.entries() {
            let Some(path) = local_path(url) else {
                debug!("Skipping non-local classpath entry {} of {}", url, loader);
                continue;
            };
            if let Some(root) = Self::factory(loader, &path, filter)? {
                roots.push(root);
            }
        }
        Ok(roots)
    }

    /// Build a root for one local entry, or `None` when the entry is not
    /// scannable or contributes nothing.
    pub fn factory(loader: &Arc<ClassLoader>, path: &Path, filter: &ScanFilter) -> Result<Option<Root>> {
        let metadata = std::fs::metadata(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => ScanError::MissingRoot(path.to_path_buf()),
            _ => ScanError::io(path, e),
        })?;

        if metadata.is_dir() {
            return Ok(DirectoryRoot::scan(loader, path, filter)?.map(Root::Directory));
        }

        if metadata.is_file() && is_archive(path) {
            return Ok(ArchiveRoot::scan(loader, path, filter)?.map(Root::Archive));
        }

        debug!("Skipping classpath entry {}: not a directory or archive", path.display());
        Ok(None)
    }
}

fn is_archive(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("jar") || e.eq_ignore_ascii_case("zip"))
        .unwrap_or(false)
}
