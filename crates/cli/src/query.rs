use crate::args::ScanArgs;
use classscan_core::ClassScanner;
use classscan_java::{ClassFileParser, ClassFileRuntime, JavaTypeConverter};
use classscan_plugin::{RuntimeField, RuntimeMethod, RuntimeType};
use clap::ValueEnum;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum QueryKind {
    /// Public methods carrying the annotation
    MethodsAnnotated,
    /// Public methods with an annotated parameter
    ParameterAnnotated,
    /// Public fields carrying the annotation
    FieldsAnnotated,
    /// Types carrying the annotation
    TypesAnnotated,
    /// Types whose superclass is NAME
    DirectSubtypes,
    /// All types below NAME
    Subtypes,
    /// Types listing NAME among their interfaces
    DirectImplementers,
    /// Direct implementers of NAME and their subtypes
    Implementers,
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
enum Hit {
    Type(RuntimeType),
    Method(RuntimeMethod),
    Field(RuntimeField),
}

impl Hit {
    fn render(&self) -> String {
        match self {
            Hit::Type(ty) => ty.name.clone(),
            Hit::Method(m) => match JavaTypeConverter::render_method(&m.name, &m.descriptor) {
                Ok(signature) => format!("{}#{}", m.declaring, signature),
                Err(_) => m.to_string(),
            },
            Hit::Field(f) => f.to_string(),
        }
    }
}

fn collect<T>(found: HashSet<T>, wrap: fn(T) -> Hit) -> Vec<Hit> {
    let mut hits: Vec<Hit> = found.into_iter().map(wrap).collect();
    hits.sort();
    hits
}

fn execute(scanner: &ClassScanner, kind: QueryKind, name: &str) -> classscan_core::Result<Vec<Hit>> {
    Ok(match kind {
        QueryKind::MethodsAnnotated => collect(scanner.find_methods_annotated_with(name)?, Hit::Method),
        QueryKind::ParameterAnnotated => collect(
            scanner.find_methods_with_parameter_annotation(name)?,
            Hit::Method,
        ),
        QueryKind::FieldsAnnotated => collect(scanner.find_fields_annotated_with(name)?, Hit::Field),
        QueryKind::TypesAnnotated => collect(scanner.find_types_annotated_with(name)?, Hit::Type),
        QueryKind::DirectSubtypes => collect(scanner.find_direct_subtypes_of(name)?, Hit::Type),
        QueryKind::Subtypes => collect(scanner.find_subtypes_of(name)?, Hit::Type),
        QueryKind::DirectImplementers => collect(scanner.find_directly_implements(name)?, Hit::Type),
        QueryKind::Implementers => collect(scanner.find_implements(name)?, Hit::Type),
    })
}

pub fn run(kind: QueryKind, name: &str, args: &ScanArgs) -> Result<(), Box<dyn std::error::Error>> {
    let loader = args.loader()?;
    let scanner = ClassScanner::new(
        &loader,
        &args.scan_config()?,
        &ClassFileParser,
        Arc::new(ClassFileRuntime::new()),
    )?;

    let hits = execute(&scanner, kind, name)?;
    info!("{:?} {}: {} hits", kind, name, hits.len());

    if args.json {
        println!("{}", serde_json::to_string_pretty(&hits)?);
    } else {
        for hit in &hits {
            println!("{}", hit.render());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use classscan_core::ScanConfig;
    use classscan_java::fixture::ClassFileBuilder;
    use classscan_plugin::ClassLoader;

    #[test]
    fn test_execute_renders_sorted_hits() {
        let dir = tempfile::tempdir().unwrap();
        ClassFileBuilder::new("web.Controller")
            .method_with_parameters("get", "(ILjava/lang/String;)V", &["web.Route"], &[&[], &[]])
            .method("post", "([B)V", &["web.Route"])
            .write_to(dir.path())
            .unwrap();

        let loader = Arc::new(ClassLoader::from_paths("test", [dir.path()], None).unwrap());
        let scanner = ClassScanner::new(
            &loader,
            &ScanConfig::new().with_prefix("web"),
            &ClassFileParser,
            Arc::new(ClassFileRuntime::new()),
        )
        .unwrap();

        let rendered: Vec<String> = execute(&scanner, QueryKind::MethodsAnnotated, "web.Route")
            .unwrap()
            .iter()
            .map(Hit::render)
            .collect();
        assert_eq!(
            rendered,
            vec![
                "web.Controller#get(int, java.lang.String)",
                "web.Controller#post(byte[])"
            ]
        );
    }
}
