//! Structural nodes: parsed, pre-resolution metadata for one class resource.
//!
//! All type names are binary names in dotted form (`com.example.Foo`,
//! `com.example.Outer$Inner`). Only runtime-visible annotations are recorded.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnnotationNode {
    /// Erased annotation type name
    pub type_name: String,
}

impl AnnotationNode {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
        }
    }

    pub fn is(&self, annotation: &str) -> bool {
        self.type_name == annotation
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldNode {
    pub name: String,
    pub is_public: bool,
    pub descriptor: String,
    pub annotations: Vec<AnnotationNode>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodNode {
    pub name: String,
    pub is_public: bool,
    pub is_static: bool,
    pub descriptor: String,
    pub annotations: Vec<AnnotationNode>,
    /// One slot per parameter that carries annotation data; slots may be empty
    pub parameter_annotations: Vec<Vec<AnnotationNode>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassNode {
    pub name: String,
    /// `None` only for the root of the type hierarchy
    pub super_name: Option<String>,
    pub interfaces: Vec<String>,
    pub is_interface: bool,
    pub annotations: Vec<AnnotationNode>,
    pub fields: Vec<FieldNode>,
    pub methods: Vec<MethodNode>,
}

impl ClassNode {
    pub fn has_annotation(&self, annotation: &str) -> bool {
        self.annotations.iter().any(|a| a.is(annotation))
    }

    pub fn has_method_annotation(&self, annotation: &str) -> bool {
        self.methods
            .iter()
            .any(|m| m.annotations.iter().any(|a| a.is(annotation)))
    }

    pub fn has_parameter_annotation(&self, annotation: &str) -> bool {
        self.methods.iter().any(|m| {
            m.parameter_annotations
                .iter()
                .flatten()
                .any(|a| a.is(annotation))
        })
    }

    pub fn has_field_annotation(&self, annotation: &str) -> bool {
        self.fields
            .iter()
            .any(|f| f.annotations.iter().any(|a| a.is(annotation)))
    }

    pub fn extends(&self, type_name: &str) -> bool {
        self.super_name.as_deref() == Some(type_name)
    }

    pub fn implements(&self, interface: &str) -> bool {
        self.interfaces.iter().any(|i| i == interface)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ClassNode {
        ClassNode {
            name: "a.B".into(),
            super_name: Some("java.lang.Object".into()),
            interfaces: vec!["a.I".into()],
            is_interface: false,
            annotations: vec![],
            fields: vec![FieldNode {
                name: "count".into(),
                is_public: true,
                descriptor: "I".into(),
                annotations: vec![AnnotationNode::new("a.Inject")],
            }],
            methods: vec![MethodNode {
                name: "run".into(),
                is_public: true,
                is_static: false,
                descriptor: "(Ljava/lang/String;)V".into(),
                annotations: vec![],
                parameter_annotations: vec![vec![AnnotationNode::new("a.NotNull")]],
            }],
        }
    }

    #[test]
    fn test_node_filters() {
        let node = sample();
        assert!(node.has_field_annotation("a.Inject"));
        assert!(!node.has_method_annotation("a.Inject"));
        assert!(node.has_parameter_annotation("a.NotNull"));
        assert!(!node.has_annotation("a.NotNull"));
        assert!(node.extends("java.lang.Object"));
        assert!(node.implements("a.I"));
        assert!(!node.implements("a.J"));
    }
}
