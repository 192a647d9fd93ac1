use crate::BoxError;
use crate::node::ClassNode;
use std::io::Read;

/// Bytecode parser - knows how to turn a class resource into a structural node.
/// Implemented by language crates (e.g. `classscan_java::ClassFileParser`).
pub trait ClassParser: Send + Sync {
    /// Parse the class resource behind `reader`.
    /// The reader is only valid for the duration of the call.
    fn parse(&self, reader: &mut dyn Read) -> Result<ClassNode, BoxError>;
}
