//! Collaborator contracts for classpath scanning.
//!
//! The scanning core only knows about the types in this crate:
//! - [`ClassLoader`]: an explicit classpath provider chain with an opaque scope identity
//! - [`ClassNode`]: the structural shape of one parsed class resource
//! - [`ClassParser`]: turns a class resource byte stream into a [`ClassNode`]
//! - [`TypeRuntime`]: resolves names into runtime types and reflects over their members
//!
//! Concrete implementations live in their respective crates
//! (`classscan-java` for JVM class files).

pub mod loader;
pub mod node;
pub mod parser;
pub mod runtime;

pub use loader::{ClassLoader, LoaderError, ScopeId};
pub use node::{AnnotationNode, ClassNode, FieldNode, MethodNode};
pub use parser::ClassParser;
pub use runtime::{Member, RuntimeField, RuntimeMethod, RuntimeType, TypeRuntime};

/// Error type for collaborator operations
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;
