use crate::converter::JavaTypeConverter;
use classscan_plugin::{AnnotationNode, BoxError, ClassNode, ClassParser, FieldNode, MethodNode};
use ristretto_classfile::attributes::Attribute;
use ristretto_classfile::{
    ClassAccessFlags, ClassFile, ConstantPool, FieldAccessFlags, MethodAccessFlags,
};
use std::io::{Cursor, Read};

/// Parses JVM class files into structural nodes
#[derive(Debug, Default, Clone, Copy)]
pub struct ClassFileParser;

impl ClassFileParser {
    pub fn new() -> Self {
        Self
    }

    pub fn parse_bytes(&self, bytes: Vec<u8>) -> Result<ClassNode, BoxError> {
        let class = ClassFile::from_bytes(&mut Cursor::new(bytes))
            .map_err(|e| format!("Failed to parse class: {e:?}"))?;
        let pool = &class.constant_pool;

        let name = class_name(pool, class.this_class)?;
        let super_name = if class.super_class == 0 {
            None
        } else {
            Some(class_name(pool, class.super_class)?)
        };
        let interfaces = class
            .interfaces
            .iter()
            .map(|index| class_name(pool, *index))
            .collect::<Result<Vec<_>, _>>()?;

        let mut fields = Vec::with_capacity(class.fields.len());
        for field in &class.fields {
            fields.push(FieldNode {
                name: utf8(pool, field.name_index)?,
                is_public: field.access_flags.contains(FieldAccessFlags::PUBLIC),
                descriptor: utf8(pool, field.descriptor_index)?,
                annotations: visible_annotations(pool, &field.attributes)?,
            });
        }

        let mut methods = Vec::with_capacity(class.methods.len());
        for method in &class.methods {
            methods.push(MethodNode {
                name: utf8(pool, method.name_index)?,
                is_public: method.access_flags.contains(MethodAccessFlags::PUBLIC),
                is_static: method.access_flags.contains(MethodAccessFlags::STATIC),
                descriptor: utf8(pool, method.descriptor_index)?,
                annotations: visible_annotations(pool, &method.attributes)?,
                parameter_annotations: visible_parameter_annotations(pool, &method.attributes)?,
            });
        }

        Ok(ClassNode {
            name,
            super_name,
            interfaces,
            is_interface: class.access_flags.contains(ClassAccessFlags::INTERFACE),
            annotations: visible_annotations(pool, &class.attributes)?,
            fields,
            methods,
        })
    }
}

impl ClassParser for ClassFileParser {
    fn parse(&self, reader: &mut dyn Read) -> Result<ClassNode, BoxError> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        self.parse_bytes(bytes)
    }
}

fn utf8(pool: &ConstantPool, index: u16) -> Result<String, BoxError> {
    let value = pool
        .try_get_utf8(index)
        .map_err(|e| format!("Failed to read constant #{index}: {e:?}"))?;
    Ok(value.to_string())
}

fn class_name(pool: &ConstantPool, index: u16) -> Result<String, BoxError> {
    let internal = pool
        .try_get_class(index)
        .map_err(|e| format!("Failed to read class constant #{index}: {e:?}"))?;
    Ok(JavaTypeConverter::binary_name(internal))
}

fn annotation_node(pool: &ConstantPool, type_index: u16) -> Result<AnnotationNode, BoxError> {
    let descriptor = utf8(pool, type_index)?;
    let type_name = JavaTypeConverter::annotation_type(&descriptor)
        .ok_or_else(|| format!("Malformed annotation descriptor: {descriptor}"))?;
    Ok(AnnotationNode::new(type_name))
}

fn visible_annotations(pool: &ConstantPool, attributes: &[Attribute]) -> Result<Vec<AnnotationNode>, BoxError> {
    let mut nodes = Vec::new();
    for attribute in attributes {
        if let Attribute::RuntimeVisibleAnnotations { annotations, .. } = attribute {
            for annotation in annotations {
                nodes.push(annotation_node(pool, annotation.type_index)?);
            }
        }
    }
    Ok(nodes)
}

fn visible_parameter_annotations(
    pool: &ConstantPool,
    attributes: &[Attribute],
) -> Result<Vec<Vec<AnnotationNode>>, BoxError> {
    let mut slots = Vec::new();
    for attribute in attributes {
        if let Attribute::RuntimeVisibleParameterAnnotations {
            parameter_annotations,
            ..
        } = attribute
        {
            for parameter in parameter_annotations {
                let slot = parameter
                    .annotations
                    .iter()
                    .map(|annotation| annotation_node(pool, annotation.type_index))
                    .collect::<Result<Vec<_>, _>>()?;
                slots.push(slot);
            }
        }
    }
    Ok(slots)
}
