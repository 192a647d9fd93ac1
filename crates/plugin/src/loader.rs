//! Classpath providers.
//!
//! A [`ClassLoader`] is an explicit stand-in for a host classloader: a list of
//! classpath URLs plus an optional parent. Identity is carried by a [`ScopeId`]
//! allocated at construction; two loaders with identical entries are still
//! different scopes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use url::Url;

static NEXT_SCOPE: AtomicU64 = AtomicU64::new(1);

/// Opaque, process-unique identity of a classloading scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ScopeId(u64);

impl ScopeId {
    fn next() -> Self {
        ScopeId(NEXT_SCOPE.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "scope#{}", self.0)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LoaderError {
    #[error("cannot resolve classpath entry {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("classpath entry is not representable as a file URL: {0}")]
    InvalidPath(PathBuf),
}

/// A classpath provider bound to one scope, optionally delegating to a parent.
pub struct ClassLoader {
    id: ScopeId,
    name: String,
    entries: Vec<Url>,
    parent: Option<Arc<ClassLoader>>,
}

impl ClassLoader {
    pub fn new(name: impl Into<String>, entries: Vec<Url>, parent: Option<Arc<ClassLoader>>) -> Self {
        Self {
            id: ScopeId::next(),
            name: name.into(),
            entries,
            parent,
        }
    }

    /// Build a loader from local paths. Relative paths are made absolute
    /// against the current directory before conversion to `file:` URLs.
    pub fn from_paths<I, P>(
        name: impl Into<String>,
        paths: I,
        parent: Option<Arc<ClassLoader>>,
    ) -> Result<Self, LoaderError>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut entries = Vec::new();
        for path in paths {
            let path = path.as_ref();
            let absolute = std::path::absolute(path).map_err(|source| LoaderError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            let url = Url::from_file_path(&absolute)
                .map_err(|_| LoaderError::InvalidPath(absolute.clone()))?;
            entries.push(url);
        }
        Ok(Self::new(name, entries, parent))
    }

    pub fn id(&self) -> ScopeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Classpath entries in declaration order
    pub fn entries(&self) -> &[Url] {
        &self.entries
    }

    pub fn parent(&self) -> Option<&Arc<ClassLoader>> {
        self.parent.as_ref()
    }

    /// `loader`, then its parent, then the parent's parent...
    pub fn chain(loader: &Arc<ClassLoader>) -> impl Iterator<Item = Arc<ClassLoader>> + use<> {
        std::iter::successors(Some(loader.clone()), |current| current.parent.clone())
    }

    /// Local file-system paths of this loader's own entries. Non-`file:` URLs are dropped.
    pub fn local_entries(&self) -> impl Iterator<Item = PathBuf> + '_ {
        self.entries.iter().filter_map(local_path)
    }
}

/// The file-system path behind a `file:` URL, if it is one.
pub fn local_path(url: &Url) -> Option<PathBuf> {
    if url.scheme() != "file" {
        return None;
    }
    url.to_file_path().ok()
}

impl PartialEq for ClassLoader {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ClassLoader {}

impl Hash for ClassLoader {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for ClassLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassLoader")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("entries", &self.entries.len())
            .field("parent", &self.parent.as_ref().map(|p| p.id))
            .finish()
    }
}

impl fmt::Display for ClassLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_identity_is_not_structural() {
        let a = ClassLoader::new("app", vec![], None);
        let b = ClassLoader::new("app", vec![], None);
        assert_ne!(a.id(), b.id());
        assert_ne!(a, b);
        assert_eq!(a, a);
    }

    #[test]
    fn test_chain_order() {
        let boot = Arc::new(ClassLoader::new("boot", vec![], None));
        let platform = Arc::new(ClassLoader::new("platform", vec![], Some(boot.clone())));
        let app = Arc::new(ClassLoader::new("app", vec![], Some(platform.clone())));

        let names: Vec<String> = ClassLoader::chain(&app).map(|l| l.name().to_string()).collect();
        assert_eq!(names, vec!["app", "platform", "boot"]);
    }

    #[test]
    fn test_local_entries_skip_remote() {
        let dir = std::env::temp_dir();
        let local = Url::from_file_path(&dir).unwrap();
        let remote = Url::parse("https://repo.example.com/lib.jar").unwrap();
        let loader = ClassLoader::new("app", vec![remote, local], None);

        let entries: Vec<PathBuf> = loader.local_entries().collect();
        assert_eq!(entries, vec![dir]);
    }

    #[test]
    fn test_from_paths_makes_relative_absolute() {
        let loader = ClassLoader::from_paths("app", ["lib/a.jar"], None).unwrap();
        let path = loader.local_entries().next().unwrap();
        assert!(path.is_absolute());
        assert!(path.ends_with("lib/a.jar"));
    }
}
