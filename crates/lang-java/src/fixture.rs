//! Minimal class-file writer for test fixtures.
//!
//! Emits version 52 class files with a constant pool, hierarchy, and
//! runtime-visible annotations on the type, its members and method
//! parameters. Methods carry no code.

use crate::converter::JavaTypeConverter;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

const ACC_PUBLIC: u16 = 0x0001;
const ACC_PRIVATE: u16 = 0x0002;
const ACC_STATIC: u16 = 0x0008;
const ACC_SUPER: u16 = 0x0020;
const ACC_INTERFACE: u16 = 0x0200;
const ACC_ABSTRACT: u16 = 0x0400;

const TAG_UTF8: u8 = 1;
const TAG_CLASS: u8 = 7;

struct Member {
    access: u16,
    name: String,
    descriptor: String,
    annotations: Vec<String>,
    parameters: Vec<Vec<String>>,
}

pub struct ClassFileBuilder {
    name: String,
    super_name: Option<String>,
    interfaces: Vec<String>,
    is_interface: bool,
    annotations: Vec<String>,
    fields: Vec<Member>,
    methods: Vec<Member>,
}

fn owned(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

impl ClassFileBuilder {
    /// Public class `name` (dotted binary name) extending `java.lang.Object`
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            super_name: Some("java.lang.Object".to_string()),
            interfaces: Vec::new(),
            is_interface: false,
            annotations: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
        }
    }

    pub fn extends(mut self, super_name: &str) -> Self {
        self.super_name = Some(super_name.to_string());
        self
    }

    pub fn no_super(mut self) -> Self {
        self.super_name = None;
        self
    }

    pub fn implements(mut self, interface: &str) -> Self {
        self.interfaces.push(interface.to_string());
        self
    }

    pub fn interface(mut self) -> Self {
        self.is_interface = true;
        self
    }

    pub fn annotated(mut self, annotation: &str) -> Self {
        self.annotations.push(annotation.to_string());
        self
    }

    pub fn field(self, name: &str, descriptor: &str, annotations: &[&str]) -> Self {
        self.push_field(ACC_PUBLIC, name, descriptor, annotations)
    }

    pub fn private_field(self, name: &str, descriptor: &str, annotations: &[&str]) -> Self {
        self.push_field(ACC_PRIVATE, name, descriptor, annotations)
    }

    pub fn method(self, name: &str, descriptor: &str, annotations: &[&str]) -> Self {
        self.method_with_parameters(name, descriptor, annotations, &[])
    }

    pub fn private_method(mut self, name: &str, descriptor: &str, annotations: &[&str]) -> Self {
        self.methods.push(Member {
            access: ACC_PRIVATE,
            name: name.to_string(),
            descriptor: descriptor.to_string(),
            annotations: owned(annotations),
            parameters: Vec::new(),
        });
        self
    }

    pub fn static_method(mut self, name: &str, descriptor: &str, annotations: &[&str]) -> Self {
        self.methods.push(Member {
            access: ACC_PUBLIC | ACC_STATIC,
            name: name.to_string(),
            descriptor: descriptor.to_string(),
            annotations: owned(annotations),
            parameters: Vec::new(),
        });
        self
    }

    /// Public method with one annotation slot per entry of `parameters`
    pub fn method_with_parameters(
        mut self,
        name: &str,
        descriptor: &str,
        annotations: &[&str],
        parameters: &[&[&str]],
    ) -> Self {
        self.methods.push(Member {
            access: ACC_PUBLIC,
            name: name.to_string(),
            descriptor: descriptor.to_string(),
            annotations: owned(annotations),
            parameters: parameters.iter().map(|slot| owned(slot)).collect(),
        });
        self
    }

    fn push_field(mut self, access: u16, name: &str, descriptor: &str, annotations: &[&str]) -> Self {
        self.fields.push(Member {
            access,
            name: name.to_string(),
            descriptor: descriptor.to_string(),
            annotations: owned(annotations),
            parameters: Vec::new(),
        });
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut pool = Pool::default();
        let mut body = Vec::new();

        let access = if self.is_interface {
            ACC_PUBLIC | ACC_INTERFACE | ACC_ABSTRACT
        } else {
            ACC_PUBLIC | ACC_SUPER
        };
        put_u2(&mut body, access);
        put_u2(&mut body, pool.class(&self.name));
        let super_index = match &self.super_name {
            Some(name) => pool.class(name),
            None => 0,
        };
        put_u2(&mut body, super_index);

        put_u2(&mut body, self.interfaces.len() as u16);
        for interface in &self.interfaces {
            put_u2(&mut body, pool.class(interface));
        }

        for members in [&self.fields, &self.methods] {
            put_u2(&mut body, members.len() as u16);
            for member in members {
                put_u2(&mut body, member.access);
                put_u2(&mut body, pool.utf8(&member.name));
                put_u2(&mut body, pool.utf8(&member.descriptor));
                let attributes = [
                    annotations_attribute(&mut pool, &member.annotations),
                    parameters_attribute(&mut pool, &member.parameters),
                ];
                write_attributes(&mut body, attributes);
            }
        }

        let attributes = [annotations_attribute(&mut pool, &self.annotations), None];
        write_attributes(&mut body, attributes);

        let mut out = Vec::new();
        out.extend_from_slice(&0xCAFE_BABEu32.to_be_bytes());
        put_u2(&mut out, 0);
        put_u2(&mut out, 52);
        pool.write(&mut out);
        out.extend_from_slice(&body);
        out
    }

    /// Write the class under `dir` at its resource path and return that path.
    pub fn write_to(&self, dir: &Path) -> std::io::Result<PathBuf> {
        let path = dir.join(JavaTypeConverter::resource_name(&self.name));
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, self.build())?;
        Ok(path)
    }
}

#[derive(Default)]
struct Pool {
    entries: Vec<Vec<u8>>,
    utf8: HashMap<String, u16>,
    classes: HashMap<String, u16>,
}

impl Pool {
    fn push(&mut self, entry: Vec<u8>) -> u16 {
        self.entries.push(entry);
        self.entries.len() as u16
    }

    fn utf8(&mut self, value: &str) -> u16 {
        if let Some(index) = self.utf8.get(value) {
            return *index;
        }
        let mut entry = vec![TAG_UTF8];
        put_u2(&mut entry, value.len() as u16);
        entry.extend_from_slice(value.as_bytes());
        let index = self.push(entry);
        self.utf8.insert(value.to_string(), index);
        index
    }

    /// Class constant for a dotted binary name
    fn class(&mut self, name: &str) -> u16 {
        if let Some(index) = self.classes.get(name) {
            return *index;
        }
        let name_index = self.utf8(&name.replace('.', "/"));
        let mut entry = vec![TAG_CLASS];
        put_u2(&mut entry, name_index);
        let index = self.push(entry);
        self.classes.insert(name.to_string(), index);
        index
    }

    fn annotation_type(&mut self, name: &str) -> u16 {
        self.utf8(&format!("L{};", name.replace('.', "/")))
    }

    fn write(&self, out: &mut Vec<u8>) {
        put_u2(out, self.entries.len() as u16 + 1);
        for entry in &self.entries {
            out.extend_from_slice(entry);
        }
    }
}

fn put_u2(out: &mut Vec<u8>, value: u16) {
    out.extend_from_slice(&value.to_be_bytes());
}

fn put_annotations(out: &mut Vec<u8>, pool: &mut Pool, annotations: &[String]) {
    put_u2(out, annotations.len() as u16);
    for annotation in annotations {
        put_u2(out, pool.annotation_type(annotation));
        // no element-value pairs
        put_u2(out, 0);
    }
}

/// (name index, payload)
type RawAttribute = (u16, Vec<u8>);

fn annotations_attribute(pool: &mut Pool, annotations: &[String]) -> Option<RawAttribute> {
    if annotations.is_empty() {
        return None;
    }
    let name = pool.utf8("RuntimeVisibleAnnotations");
    let mut payload = Vec::new();
    put_annotations(&mut payload, pool, annotations);
    Some((name, payload))
}

fn parameters_attribute(pool: &mut Pool, parameters: &[Vec<String>]) -> Option<RawAttribute> {
    if parameters.is_empty() {
        return None;
    }
    let name = pool.utf8("RuntimeVisibleParameterAnnotations");
    let mut payload = vec![parameters.len() as u8];
    for slot in parameters {
        put_annotations(&mut payload, pool, slot);
    }
    Some((name, payload))
}

fn write_attributes(out: &mut Vec<u8>, attributes: [Option<RawAttribute>; 2]) {
    let present: Vec<RawAttribute> = attributes.into_iter().flatten().collect();
    put_u2(out, present.len() as u16);
    for (name, payload) in present {
        put_u2(out, name);
        out.extend_from_slice(&(payload.len() as u32).to_be_bytes());
        out.extend_from_slice(&payload);
    }
}
