//! Runtime type resolution and reflection.
//!
//! The scanning core never inspects runtime types itself; it asks a
//! [`TypeRuntime`] to resolve names and to confirm member annotations.

use crate::BoxError;
use crate::loader::{ClassLoader, ScopeId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// A resolved type, bound to the scope that defined it
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RuntimeType {
    pub name: String,
    pub scope: ScopeId,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RuntimeMethod {
    /// Binary name of the declaring type
    pub declaring: String,
    pub name: String,
    pub descriptor: String,
    pub scope: ScopeId,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RuntimeField {
    pub declaring: String,
    pub name: String,
    pub descriptor: String,
    pub scope: ScopeId,
}

impl fmt::Display for RuntimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl fmt::Display for RuntimeMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}{}", self.declaring, self.name, self.descriptor)
    }
}

impl fmt::Display for RuntimeField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.declaring, self.name)
    }
}

/// A member whose annotations can be queried
#[derive(Debug, Clone, Copy)]
pub enum Member<'a> {
    Type(&'a RuntimeType),
    Method(&'a RuntimeMethod),
    Field(&'a RuntimeField),
}

/// Host runtime capability: name resolution plus read-only reflection.
pub trait TypeRuntime: Send + Sync {
    /// Resolve `name` as seen from `loader`, without initializing the type.
    /// Fails when the name cannot be resolved.
    fn resolve(&self, name: &str, loader: &Arc<ClassLoader>) -> Result<RuntimeType, BoxError>;

    /// Public methods, including inherited ones
    fn methods(&self, ty: &RuntimeType) -> Result<Vec<RuntimeMethod>, BoxError>;

    /// Public fields, including inherited ones
    fn fields(&self, ty: &RuntimeType) -> Result<Vec<RuntimeField>, BoxError>;

    /// Annotation type names per parameter slot
    fn parameter_annotations(&self, method: &RuntimeMethod) -> Result<Vec<Vec<String>>, BoxError>;

    fn is_annotation_present(&self, member: Member<'_>, annotation: &str) -> Result<bool, BoxError>;
}
