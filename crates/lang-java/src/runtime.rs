//! A [`TypeRuntime`] computed from class files.
//!
//! Names resolve parent-first along the loader chain, like JVM delegation.
//! Defined classes are cached per `(scope, name)` and never initialized.
//! Reflection follows `getMethods`/`getFields`: public members of the type,
//! its superclasses and its superinterfaces, as far as each can be resolved.
//! Static interface methods are not inherited; hidden fields are reported.

use crate::locator::find_class_bytes;
use crate::parser::ClassFileParser;
use classscan_plugin::{
    BoxError, ClassLoader, ClassNode, Member, MethodNode, RuntimeField, RuntimeMethod, RuntimeType,
    ScopeId, TypeRuntime,
};
use dashmap::DashMap;
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, thiserror::Error)]
#[error("class not found: {0}")]
pub struct ClassNotFound(pub String);

struct Supertype {
    ty: RuntimeType,
    class: Arc<DefinedClass>,
    /// Reached through an implemented interface rather than the superclass chain
    via_interface: bool,
}

struct DefinedClass {
    node: ClassNode,
    /// Loader that defined the class; superclasses resolve through it
    loader: Arc<ClassLoader>,
}

#[derive(Default)]
pub struct ClassFileRuntime {
    parser: ClassFileParser,
    classes: DashMap<(ScopeId, String), Arc<DefinedClass>>,
}

impl ClassFileRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    fn defined(&self, scope: ScopeId, name: &str) -> Result<Arc<DefinedClass>, BoxError> {
        self.classes
            .get(&(scope, name.to_string()))
            .map(|entry| entry.value().clone())
            .ok_or_else(|| format!("{name} was not resolved by this runtime in {scope}").into())
    }

    /// Resolve a supertype reference. A supertype that is not on the
    /// classpath is left out of reflection instead of failing it.
    fn resolve_inherited(
        &self,
        name: &str,
        loader: &Arc<ClassLoader>,
    ) -> Result<Option<RuntimeType>, BoxError> {
        match self.resolve(name, loader) {
            Ok(ty) => Ok(Some(ty)),
            Err(e) if e.downcast_ref::<ClassNotFound>().is_some() => {
                debug!("Supertype {} not on classpath, skipped for reflection", name);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// The type, its superclasses nearest first, then every superinterface
    /// breadth first. Each type appears once.
    fn supertypes(&self, ty: &RuntimeType) -> Result<Vec<Supertype>, BoxError> {
        let mut found = Vec::new();
        let mut seen = HashSet::new();
        let mut interfaces = VecDeque::new();
        let mut current = Some(ty.clone());

        while let Some(class_ty) = current.take() {
            if !seen.insert(class_ty.name.clone()) {
                break;
            }
            let class = self.defined(class_ty.scope, &class_ty.name)?;
            interfaces.extend(
                class.node.interfaces.iter().map(|i| (i.clone(), class.loader.clone())),
            );
            // An interface's class-file superclass is not one of its supertypes
            if !class.node.is_interface {
                if let Some(super_name) = &class.node.super_name {
                    current = self.resolve_inherited(super_name, &class.loader)?;
                }
            }
            found.push(Supertype {
                ty: class_ty,
                class,
                via_interface: false,
            });
        }

        while let Some((name, loader)) = interfaces.pop_front() {
            if seen.contains(&name) {
                continue;
            }
            seen.insert(name.clone());
            let Some(interface_ty) = self.resolve_inherited(&name, &loader)? else {
                continue;
            };
            let class = self.defined(interface_ty.scope, &interface_ty.name)?;
            interfaces.extend(
                class.node.interfaces.iter().map(|i| (i.clone(), class.loader.clone())),
            );
            found.push(Supertype {
                ty: interface_ty,
                class,
                via_interface: true,
            });
        }

        Ok(found)
    }

    fn method_node<'a>(class: &'a DefinedClass, method: &RuntimeMethod) -> Option<&'a MethodNode> {
        class
            .node
            .methods
            .iter()
            .find(|m| m.name == method.name && m.descriptor == method.descriptor)
    }
}

impl TypeRuntime for ClassFileRuntime {
    fn resolve(&self, name: &str, loader: &Arc<ClassLoader>) -> Result<RuntimeType, BoxError> {
        let chain: Vec<Arc<ClassLoader>> = ClassLoader::chain(loader).collect();

        // Parent-first: the most distant ancestor gets the first chance
        for candidate in chain.iter().rev() {
            let key = (candidate.id(), name.to_string());
            if self.classes.contains_key(&key) {
                return Ok(RuntimeType {
                    name: name.to_string(),
                    scope: candidate.id(),
                });
            }

            let Some(bytes) = find_class_bytes(candidate, name)? else {
                continue;
            };
            let node = self.parser.parse_bytes(bytes)?;
            if node.name != name {
                return Err(format!("{name} resolved to a class file declaring {}", node.name).into());
            }
            debug!("Defined {} in {}", name, candidate);
            self.classes.entry(key).or_insert_with(|| {
                Arc::new(DefinedClass {
                    node,
                    loader: candidate.clone(),
                })
            });
            return Ok(RuntimeType {
                name: name.to_string(),
                scope: candidate.id(),
            });
        }

        Err(Box::new(ClassNotFound(name.to_string())))
    }

    fn methods(&self, ty: &RuntimeType) -> Result<Vec<RuntimeMethod>, BoxError> {
        let mut methods = Vec::new();
        let mut signatures = HashSet::new();

        for supertype in self.supertypes(ty)? {
            for method in &supertype.class.node.methods {
                if !method.is_public || method.name == "<init>" || method.name == "<clinit>" {
                    continue;
                }
                // Static interface methods are not inherited
                if supertype.via_interface && method.is_static {
                    continue;
                }
                // Overrides hide the inherited declaration
                if !signatures.insert((method.name.clone(), method.descriptor.clone())) {
                    continue;
                }
                methods.push(RuntimeMethod {
                    declaring: supertype.ty.name.clone(),
                    name: method.name.clone(),
                    descriptor: method.descriptor.clone(),
                    scope: supertype.ty.scope,
                });
            }
        }

        Ok(methods)
    }

    /// Hidden fields are kept: a subclass field does not remove the
    /// superclass or superinterface field of the same name.
    fn fields(&self, ty: &RuntimeType) -> Result<Vec<RuntimeField>, BoxError> {
        let mut fields = Vec::new();

        for supertype in self.supertypes(ty)? {
            for field in supertype.class.node.fields.iter().filter(|f| f.is_public) {
                fields.push(RuntimeField {
                    declaring: supertype.ty.name.clone(),
                    name: field.name.clone(),
                    descriptor: field.descriptor.clone(),
                    scope: supertype.ty.scope,
                });
            }
        }

        Ok(fields)
    }

    fn parameter_annotations(&self, method: &RuntimeMethod) -> Result<Vec<Vec<String>>, BoxError> {
        let class = self.defined(method.scope, &method.declaring)?;
        let node = Self::method_node(&class, method)
            .ok_or_else(|| format!("{method} is not declared by {}", method.declaring))?;
        Ok(node
            .parameter_annotations
            .iter()
            .map(|slot| slot.iter().map(|a| a.type_name.clone()).collect())
            .collect())
    }

    fn is_annotation_present(&self, member: Member<'_>, annotation: &str) -> Result<bool, BoxError> {
        match member {
            Member::Type(ty) => Ok(self.defined(ty.scope, &ty.name)?.node.has_annotation(annotation)),
            Member::Method(method) => {
                let class = self.defined(method.scope, &method.declaring)?;
                let node = Self::method_node(&class, method)
                    .ok_or_else(|| format!("{method} is not declared by {}", method.declaring))?;
                Ok(node.annotations.iter().any(|a| a.is(annotation)))
            }
            Member::Field(field) => {
                let class = self.defined(field.scope, &field.declaring)?;
                Ok(class
                    .node
                    .fields
                    .iter()
                    .filter(|f| f.name == field.name)
                    .any(|f| f.annotations.iter().any(|a| a.is(annotation))))
            }
        }
    }
}
