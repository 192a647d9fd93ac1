//! Structural class index.
//!
//! [`ClassScanner`] parses every class resource of a [`ResourceScanner`] once,
//! at construction, and answers structural questions from that node cache.
//! Runtime resolution is deferred until the cached node already matches, so
//! the host runtime only sees names that are likely hits.

pub mod queries;

use crate::config::ScanConfig;
use crate::error::{Result, ScanError};
use crate::resource::ResourceScanner;
use classscan_plugin::{
    ClassLoader, ClassNode, ClassParser, RuntimeField, RuntimeMethod, RuntimeType, ScopeId,
    TypeRuntime,
};
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashSet};
use std::hash::Hash;
use std::sync::Arc;
use tracing::{debug, info};

use queries::{
    DirectSubtypesOf, DirectlyImplements, FieldsAnnotatedWith, MethodsAnnotatedWith,
    MethodsWithParameterAnnotation, TypesAnnotatedWith,
};

/// What a [`NodeMatcher`] sees for one cached node
pub struct MatchContext<'a> {
    /// Loader of the root the node's resource came from
    pub loader: &'a Arc<ClassLoader>,
    pub runtime: &'a dyn TypeRuntime,
}

impl MatchContext<'_> {
    /// Resolve a binary name through the node's loader. Failure is fatal.
    pub fn resolve(&self, name: &str) -> Result<RuntimeType> {
        self.runtime
            .resolve(name, self.loader)
            .map_err(|e| ScanError::Resolution {
                name: name.to_string(),
                message: e.to_string(),
            })
    }
}

/// Filter-then-resolve step applied to every cached node
pub trait NodeMatcher<T> {
    fn matches(&self, ctx: &MatchContext<'_>, node: &ClassNode) -> Result<HashSet<T>>;
}

impl<T, F> NodeMatcher<T> for F
where
    F: Fn(&MatchContext<'_>, &ClassNode) -> Result<HashSet<T>>,
{
    fn matches(&self, ctx: &MatchContext<'_>, node: &ClassNode) -> Result<HashSet<T>> {
        self(ctx, node)
    }
}

pub struct ClassScanner {
    resources: ResourceScanner,
    nodes: BTreeMap<String, ClassNode>,
    runtime: Arc<dyn TypeRuntime>,
}

impl ClassScanner {
    /// Discover class resources for `loader` (packages in `config.prefixes`)
    /// and parse all of them with `parser`.
    pub fn new(
        loader: &Arc<ClassLoader>,
        config: &ScanConfig,
        parser: &dyn ClassParser,
        runtime: Arc<dyn TypeRuntime>,
    ) -> Result<Self> {
        let resources = ResourceScanner::for_classes(loader, config)?;
        Self::from_resources(resources, parser, runtime)
    }

    /// Build on an existing scanner. Its filter must only admit class files.
    pub fn from_resources(
        resources: ResourceScanner,
        parser: &dyn ClassParser,
        runtime: Arc<dyn TypeRuntime>,
    ) -> Result<Self> {
        let nodes = Self::populate_node_cache(&resources, parser)?;
        Ok(Self {
            resources,
            nodes,
            runtime,
        })
    }

    fn populate_node_cache(
        resources: &ResourceScanner,
        parser: &dyn ClassParser,
    ) -> Result<BTreeMap<String, ClassNode>> {
        let start = std::time::Instant::now();
        let mut nodes: BTreeMap<String, (ScopeId, ClassNode)> = BTreeMap::new();

        for root in resources.roots() {
            let parsed = root.with_each_stream(|resource, reader| {
                parser.parse(reader).map_err(|e| ScanError::Parse {
                    resource: resource.to_string(),
                    message: e.to_string(),
                })
            })?;
            debug!("Parsed {} classes from {}", parsed.len(), root.origin().display());

            // Shadowed names follow parent-first loading: a later scope is an
            // ancestor and replaces the node, within one scope the first entry wins
            let scope = root.scope();
            for (resource, node) in parsed {
                match nodes.entry(resource) {
                    Entry::Vacant(slot) => {
                        slot.insert((scope, node));
                    }
                    Entry::Occupied(mut slot) if slot.get().0 != scope => {
                        slot.insert((scope, node));
                    }
                    Entry::Occupied(_) => {}
                }
            }
        }
        let nodes: BTreeMap<String, ClassNode> =
            nodes.into_iter().map(|(name, (_, node))| (name, node)).collect();

        info!(
            "Class node cache populated: {} classes in {:?}",
            nodes.len(),
            start.elapsed()
        );
        Ok(nodes)
    }

    pub fn resources(&self) -> &ResourceScanner {
        &self.resources
    }

    pub fn runtime(&self) -> &Arc<dyn TypeRuntime> {
        &self.runtime
    }

    /// Cached node for a class resource (`com/foo/Bar.class`). For a shadowed
    /// name this is the definition a parent-first runtime would load.
    pub fn node(&self, resource: &str) -> Option<&ClassNode> {
        self.nodes.get(resource)
    }

    pub fn nodes(&self) -> impl Iterator<Item = (&str, &ClassNode)> {
        self.nodes.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Run `matcher` over every resource of every root and union the results.
    pub fn find_node_matches<T, M>(&self, matcher: &M) -> Result<HashSet<T>>
    where
        T: Eq + Hash,
        M: NodeMatcher<T> + ?Sized,
    {
        let mut found = HashSet::new();
        for root in self.resources.roots() {
            let ctx = MatchContext {
                loader: root.loader(),
                runtime: self.runtime.as_ref(),
            };
            for resource in root.resources() {
                let node = self.nodes.get(resource).ok_or_else(|| {
                    ScanError::Runtime(format!("no cached node for {resource}"))
                })?;
                found.extend(matcher.matches(&ctx, node)?);
            }
        }
        Ok(found)
    }

    /// Public methods carrying `annotation`
    pub fn find_methods_annotated_with(&self, annotation: &str) -> Result<HashSet<RuntimeMethod>> {
        self.find_node_matches(&MethodsAnnotatedWith::new(annotation))
    }

    /// Public methods with at least one parameter carrying `annotation`
    pub fn find_methods_with_parameter_annotation(
        &self,
        annotation: &str,
    ) -> Result<HashSet<RuntimeMethod>> {
        self.find_node_matches(&MethodsWithParameterAnnotation::new(annotation))
    }

    /// Public fields carrying `annotation`
    pub fn find_fields_annotated_with(&self, annotation: &str) -> Result<HashSet<RuntimeField>> {
        self.find_node_matches(&FieldsAnnotatedWith::new(annotation))
    }

    pub fn find_types_annotated_with(&self, annotation: &str) -> Result<HashSet<RuntimeType>> {
        self.find_node_matches(&TypesAnnotatedWith::new(annotation))
    }

    /// Types whose declared superclass is `type_name`
    pub fn find_direct_subtypes_of(&self, type_name: &str) -> Result<HashSet<RuntimeType>> {
        self.find_node_matches(&DirectSubtypesOf::new(type_name))
    }

    /// Transitive closure of [`Self::find_direct_subtypes_of`], computed frontier by frontier.
    pub fn find_subtypes_of(&self, type_name: &str) -> Result<HashSet<RuntimeType>> {
        let mut found = HashSet::new();
        let mut frontier = self.find_direct_subtypes_of(type_name)?;

        while !frontier.is_empty() {
            let mut next = HashSet::new();
            for ty in &frontier {
                for sub in self.find_direct_subtypes_of(&ty.name)? {
                    if !found.contains(&sub) && !frontier.contains(&sub) {
                        next.insert(sub);
                    }
                }
            }
            found.extend(frontier);
            frontier = next;
        }

        Ok(found)
    }

    /// Types naming `interface` in their own interface list
    pub fn find_directly_implements(&self, interface: &str) -> Result<HashSet<RuntimeType>> {
        self.find_node_matches(&DirectlyImplements::new(interface))
    }

    /// Direct implementers plus all of their subtypes
    pub fn find_implements(&self, interface: &str) -> Result<HashSet<RuntimeType>> {
        let direct = self.find_directly_implements(interface)?;
        let mut found = direct.clone();
        for ty in &direct {
            found.extend(self.find_subtypes_of(&ty.name)?);
        }
        Ok(found)
    }
}

impl std::fmt::Debug for ClassScanner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassScanner")
            .field("resources", &self.resources)
            .field("nodes", &self.nodes.len())
            .finish()
    }
}
