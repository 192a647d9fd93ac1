//! JVM class-file collaborators for classscan.
//!
//! - [`ClassFileParser`] turns class files into structural nodes
//! - [`ClassFileRuntime`] resolves binary names and reflects over members,
//!   reading class files through a [`classscan_plugin::ClassLoader`]

pub mod converter;
pub mod locator;
pub mod parser;
pub mod runtime;

#[cfg(any(test, feature = "fixtures"))]
pub mod fixture;

pub use converter::JavaTypeConverter;
pub use parser::ClassFileParser;
pub use runtime::{ClassFileRuntime, ClassNotFound};
