//! Node matchers behind the [`ClassScanner`](super::ClassScanner) queries.
//!
//! Each matcher first checks the cached node, then resolves and re-confirms
//! against the runtime.

use super::{MatchContext, NodeMatcher};
use crate::error::{Result, ScanError};
use classscan_plugin::{ClassNode, Member, RuntimeField, RuntimeMethod, RuntimeType};
use std::collections::HashSet;

fn runtime_err(e: classscan_plugin::BoxError) -> ScanError {
    ScanError::Runtime(e.to_string())
}

pub struct MethodsAnnotatedWith {
    annotation: String,
}

impl MethodsAnnotatedWith {
    pub fn new(annotation: &str) -> Self {
        Self {
            annotation: annotation.to_string(),
        }
    }
}

impl NodeMatcher<RuntimeMethod> for MethodsAnnotatedWith {
    fn matches(&self, ctx: &MatchContext<'_>, node: &ClassNode) -> Result<HashSet<RuntimeMethod>> {
        if !node.has_method_annotation(&self.annotation) {
            return Ok(HashSet::new());
        }
        let ty = ctx.resolve(&node.name)?;
        let mut found = HashSet::new();
        for method in ctx.runtime.methods(&ty).map_err(runtime_err)? {
            if ctx
                .runtime
                .is_annotation_present(Member::Method(&method), &self.annotation)
                .map_err(runtime_err)?
            {
                found.insert(method);
            }
        }
        Ok(found)
    }
}

pub struct MethodsWithParameterAnnotation {
    annotation: String,
}

impl MethodsWithParameterAnnotation {
    pub fn new(annotation: &str) -> Self {
        Self {
            annotation: annotation.to_string(),
        }
    }
}

impl NodeMatcher<RuntimeMethod> for MethodsWithParameterAnnotation {
    fn matches(&self, ctx: &MatchContext<'_>, node: &ClassNode) -> Result<HashSet<RuntimeMethod>> {
        if !node.has_parameter_annotation(&self.annotation) {
            return Ok(HashSet::new());
        }
        let ty = ctx.resolve(&node.name)?;
        let mut found = HashSet::new();
        for method in ctx.runtime.methods(&ty).map_err(runtime_err)? {
            let slots = ctx
                .runtime
                .parameter_annotations(&method)
                .map_err(runtime_err)?;
            if slots.iter().flatten().any(|a| *a == self.annotation) {
                found.insert(method);
            }
        }
        Ok(found)
    }
}

pub struct FieldsAnnotatedWith {
    annotation: String,
}

impl FieldsAnnotatedWith {
    pub fn new(annotation: &str) -> Self {
        Self {
            annotation: annotation.to_string(),
        }
    }
}

impl NodeMatcher<RuntimeField> for FieldsAnnotatedWith {
    fn matches(&self, ctx: &MatchContext<'_>, node: &ClassNode) -> Result<HashSet<RuntimeField>> {
        if !node.has_field_annotation(&self.annotation) {
            return Ok(HashSet::new());
        }
        let ty = ctx.resolve(&node.name)?;
        let mut found = HashSet::new();
        for field in ctx.runtime.fields(&ty).map_err(runtime_err)? {
            if ctx
                .runtime
                .is_annotation_present(Member::Field(&field), &self.annotation)
                .map_err(runtime_err)?
            {
                found.insert(field);
            }
        }
        Ok(found)
    }
}

pub struct TypesAnnotatedWith {
    annotation: String,
}

impl TypesAnnotatedWith {
    pub fn new(annotation: &str) -> Self {
        Self {
            annotation: annotation.to_string(),
        }
    }
}

impl NodeMatcher<RuntimeType> for TypesAnnotatedWith {
    fn matches(&self, ctx: &MatchContext<'_>, node: &ClassNode) -> Result<HashSet<RuntimeType>> {
        if node.has_annotation(&self.annotation) {
            Ok(HashSet::from([ctx.resolve(&node.name)?]))
        } else {
            Ok(HashSet::new())
        }
    }
}

pub struct DirectSubtypesOf {
    type_name: String,
}

impl DirectSubtypesOf {
    pub fn new(type_name: &str) -> Self {
        Self {
            type_name: type_name.to_string(),
        }
    }
}

impl NodeMatcher<RuntimeType> for DirectSubtypesOf {
    fn matches(&self, ctx: &MatchContext<'_>, node: &ClassNode) -> Result<HashSet<RuntimeType>> {
        if node.extends(&self.type_name) {
            Ok(HashSet::from([ctx.resolve(&node.name)?]))
        } else {
            Ok(HashSet::new())
        }
    }
}

pub struct DirectlyImplements {
    interface: String,
}

impl DirectlyImplements {
    pub fn new(interface: &str) -> Self {
        Self {
            interface: interface.to_string(),
        }
    }
}

impl NodeMatcher<RuntimeType> for DirectlyImplements {
    fn matches(&self, ctx: &MatchContext<'_>, node: &ClassNode) -> Result<HashSet<RuntimeType>> {
        if node.implements(&self.interface) {
            Ok(HashSet::from([ctx.resolve(&node.name)?]))
        } else {
            Ok(HashSet::new())
        }
    }
}
