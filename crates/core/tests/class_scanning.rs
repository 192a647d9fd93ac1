use classscan_core::{ClassScanner, ScanConfig, ScanError};
use classscan_java::fixture::ClassFileBuilder;
use classscan_java::{ClassFileParser, ClassFileRuntime};
use classscan_plugin::{
    BoxError, ClassLoader, Member, RuntimeField, RuntimeMethod, RuntimeType, TypeRuntime,
};
use std::collections::BTreeSet;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tempfile::tempdir;

fn loader(paths: &[&Path], parent: Option<Arc<ClassLoader>>) -> Arc<ClassLoader> {
    Arc::new(ClassLoader::from_paths("test", paths.iter().copied(), parent).unwrap())
}

fn scanner(loader: &Arc<ClassLoader>, config: &ScanConfig) -> ClassScanner {
    ClassScanner::new(loader, config, &ClassFileParser, Arc::new(ClassFileRuntime::new())).unwrap()
}

fn type_names(types: impl IntoIterator<Item = RuntimeType>) -> BTreeSet<String> {
    types.into_iter().map(|t| t.name).collect()
}

fn set(names: &[&str]) -> BTreeSet<String> {
    names.iter().map(|s| s.to_string()).collect()
}

/// a.I <- a.B <- a.C
fn hierarchy_fixture(dir: &Path) {
    ClassFileBuilder::new("a.I").interface().write_to(dir).unwrap();
    ClassFileBuilder::new("a.B").implements("a.I").write_to(dir).unwrap();
    ClassFileBuilder::new("a.C").extends("a.B").write_to(dir).unwrap();
}

#[test]
fn test_hierarchy_scenario() {
    let dir = tempdir().unwrap();
    hierarchy_fixture(dir.path());
    let scanner = scanner(&loader(&[dir.path()], None), &ScanConfig::new().with_prefix("a"));

    assert_eq!(type_names(scanner.find_subtypes_of("a.B").unwrap()), set(&["a.C"]));
    assert_eq!(type_names(scanner.find_directly_implements("a.I").unwrap()), set(&["a.B"]));
    assert_eq!(type_names(scanner.find_implements("a.I").unwrap()), set(&["a.B", "a.C"]));
    assert!(scanner.find_subtypes_of("a.C").unwrap().is_empty());
}

#[test]
fn test_subtype_closure_is_fixed_point() {
    let dir = tempdir().unwrap();
    ClassFileBuilder::new("x.Root").write_to(dir.path()).unwrap();
    ClassFileBuilder::new("x.Mid").extends("x.Root").write_to(dir.path()).unwrap();
    ClassFileBuilder::new("x.Leaf1").extends("x.Mid").write_to(dir.path()).unwrap();
    ClassFileBuilder::new("x.Leaf2").extends("x.Mid").write_to(dir.path()).unwrap();
    ClassFileBuilder::new("x.Deep").extends("x.Leaf1").write_to(dir.path()).unwrap();
    ClassFileBuilder::new("x.Other").write_to(dir.path()).unwrap();

    let scanner = scanner(&loader(&[dir.path()], None), &ScanConfig::new());
    let all = scanner.find_subtypes_of("x.Root").unwrap();
    assert_eq!(
        type_names(all.clone()),
        set(&["x.Mid", "x.Leaf1", "x.Leaf2", "x.Deep"])
    );

    // Nothing further down is missing from the closure
    for ty in &all {
        for sub in scanner.find_direct_subtypes_of(&ty.name).unwrap() {
            assert!(all.contains(&sub));
        }
    }
    assert!(scanner.find_direct_subtypes_of("x.Root").unwrap().is_subset(&all));
}

#[test]
fn test_type_annotation_round_trip() {
    let dir = tempdir().unwrap();
    ClassFileBuilder::new("p.Marked")
        .annotated("p.Component")
        .write_to(dir.path())
        .unwrap();
    ClassFileBuilder::new("p.Plain").write_to(dir.path()).unwrap();

    let scanner = scanner(&loader(&[dir.path()], None), &ScanConfig::new().with_prefix("p"));

    assert_eq!(
        type_names(scanner.find_types_annotated_with("p.Component").unwrap()),
        set(&["p.Marked"])
    );
    assert!(scanner.find_methods_annotated_with("p.Component").unwrap().is_empty());
    assert!(scanner.find_fields_annotated_with("p.Component").unwrap().is_empty());
    assert!(scanner
        .find_methods_with_parameter_annotation("p.Component")
        .unwrap()
        .is_empty());
}

#[test]
fn test_member_annotation_queries() {
    let dir = tempdir().unwrap();
    ClassFileBuilder::new("s.Base")
        .method("init", "()V", &["s.PostConstruct"])
        .write_to(dir.path())
        .unwrap();
    ClassFileBuilder::new("s.Service")
        .extends("s.Base")
        .field("repo", "Ljava/lang/Object;", &["s.Inject"])
        .private_field("hidden", "I", &["s.Inject"])
        .method("start", "()V", &["s.PostConstruct"])
        .private_method("stop", "()V", &["s.PostConstruct"])
        .method_with_parameters(
            "handle",
            "(Ljava/lang/String;I)V",
            &[],
            &[&[], &["s.Valid"]],
        )
        .write_to(dir.path())
        .unwrap();

    let scanner = scanner(&loader(&[dir.path()], None), &ScanConfig::new().with_prefix("s"));

    let methods: BTreeSet<String> = scanner
        .find_methods_annotated_with("s.PostConstruct")
        .unwrap()
        .iter()
        .map(RuntimeMethod::to_string)
        .collect();
    assert_eq!(methods, set(&["s.Base#init()V", "s.Service#start()V"]));

    let handlers: Vec<RuntimeMethod> = scanner
        .find_methods_with_parameter_annotation("s.Valid")
        .unwrap()
        .into_iter()
        .collect();
    assert_eq!(handlers.len(), 1);
    assert_eq!(handlers[0].name, "handle");
    assert_eq!(handlers[0].declaring, "s.Service");

    let fields: BTreeSet<String> = scanner
        .find_fields_annotated_with("s.Inject")
        .unwrap()
        .iter()
        .map(RuntimeField::to_string)
        .collect();
    assert_eq!(fields, set(&["s.Service#repo"]));
}

#[test]
fn test_classes_from_archive_and_parent() {
    let parent_dir = tempdir().unwrap();
    ClassFileBuilder::new("lib.Base").write_to(parent_dir.path()).unwrap();

    let child_dir = tempdir().unwrap();
    let jar = child_dir.path().join("app.jar");
    let mut zip = zip::ZipWriter::new(File::create(&jar).unwrap());
    let options = zip::write::SimpleFileOptions::default();
    zip.add_directory("app/", options).unwrap();
    zip.start_file("app/Impl.class", options).unwrap();
    zip.write_all(&ClassFileBuilder::new("app.Impl").extends("lib.Base").build())
        .unwrap();
    zip.finish().unwrap();

    let parent = loader(&[parent_dir.path()], None);
    let child = loader(&[jar.as_path()], Some(parent.clone()));
    let scanner = scanner(&child, &ScanConfig::new());

    assert!(scanner.node("app/Impl.class").is_some());
    assert!(scanner.node("lib/Base.class").is_some());

    let subs: Vec<RuntimeType> = scanner
        .find_direct_subtypes_of("lib.Base")
        .unwrap()
        .into_iter()
        .collect();
    assert_eq!(subs.len(), 1);
    assert_eq!(subs[0].name, "app.Impl");
    assert_eq!(subs[0].scope, child.id());
}

/// `a.X` defined by both loaders, annotated with `a.M` only where `annotated_in_parent` says
fn shadowed_fixture(
    annotated_in_parent: bool,
) -> (ClassScanner, Arc<ClassLoader>, Arc<ClassLoader>, [tempfile::TempDir; 2]) {
    let parent_dir = tempdir().unwrap();
    let child_dir = tempdir().unwrap();
    let (annotated, plain) = if annotated_in_parent {
        (parent_dir.path(), child_dir.path())
    } else {
        (child_dir.path(), parent_dir.path())
    };
    ClassFileBuilder::new("a.X").annotated("a.M").write_to(annotated).unwrap();
    ClassFileBuilder::new("a.X").write_to(plain).unwrap();

    let parent = loader(&[parent_dir.path()], None);
    let child = loader(&[child_dir.path()], Some(parent.clone()));
    let scanner = scanner(&child, &ScanConfig::new().with_prefix("a"));
    (scanner, child, parent, [parent_dir, child_dir])
}

#[test]
fn test_shadowed_class_follows_parent_definition() {
    let (scanner, child, parent, _dirs) = shadowed_fixture(true);

    assert!(scanner.node("a/X.class").unwrap().has_annotation("a.M"));
    let found: Vec<RuntimeType> = scanner
        .find_types_annotated_with("a.M")
        .unwrap()
        .into_iter()
        .collect();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name, "a.X");
    assert_eq!(found[0].scope, parent.id());

    let loaded = scanner.runtime().resolve("a.X", &child).unwrap();
    assert_eq!(loaded.scope, parent.id());
    assert!(scanner
        .runtime()
        .is_annotation_present(Member::Type(&loaded), "a.M")
        .unwrap());
}

#[test]
fn test_shadowed_annotation_in_child_is_not_reported() {
    let (scanner, child, parent, _dirs) = shadowed_fixture(false);

    assert!(!scanner.node("a/X.class").unwrap().has_annotation("a.M"));
    assert!(scanner.find_types_annotated_with("a.M").unwrap().is_empty());

    let loaded = scanner.runtime().resolve("a.X", &child).unwrap();
    assert_eq!(loaded.scope, parent.id());
    assert!(!scanner
        .runtime()
        .is_annotation_present(Member::Type(&loaded), "a.M")
        .unwrap());

    // The resource itself is still listed under both roots
    assert_eq!(scanner.resources().roots().len(), 2);
}

#[test]
fn test_node_cache_covers_every_class_resource() {
    let dir = tempdir().unwrap();
    hierarchy_fixture(dir.path());
    std::fs::write(dir.path().join("a/readme.txt"), "not a class").unwrap();

    let scanner = scanner(&loader(&[dir.path()], None), &ScanConfig::new());
    let cached: BTreeSet<String> = scanner.nodes().map(|(k, _)| k.to_string()).collect();

    assert_eq!(cached, scanner.resources().all_resources());
    assert_eq!(cached, set(&["a/B.class", "a/C.class", "a/I.class"]));
}

#[test]
fn test_prefix_limits_class_scan() {
    let dir = tempdir().unwrap();
    hierarchy_fixture(dir.path());
    ClassFileBuilder::new("b.D").extends("a.B").write_to(dir.path()).unwrap();

    let scanner = scanner(&loader(&[dir.path()], None), &ScanConfig::new().with_prefix("b"));

    assert_eq!(type_names(scanner.find_subtypes_of("a.B").unwrap()), set(&["b.D"]));
    assert!(scanner.node("a/B.class").is_none());
}

#[test]
fn test_parse_failure_is_fatal() {
    let dir = tempdir().unwrap();
    hierarchy_fixture(dir.path());
    std::fs::write(dir.path().join("a/Broken.class"), b"not a class file").unwrap();

    let err = ClassScanner::new(
        &loader(&[dir.path()], None),
        &ScanConfig::new(),
        &ClassFileParser,
        Arc::new(ClassFileRuntime::new()),
    )
    .unwrap_err();

    match err {
        ScanError::Parse { resource, .. } => assert_eq!(resource, "a/Broken.class"),
        other => panic!("unexpected error: {other}"),
    }
}

struct UnresolvableRuntime;

impl TypeRuntime for UnresolvableRuntime {
    fn resolve(&self, name: &str, _loader: &Arc<ClassLoader>) -> Result<RuntimeType, BoxError> {
        Err(format!("{name} cannot be loaded").into())
    }

    fn methods(&self, _ty: &RuntimeType) -> Result<Vec<RuntimeMethod>, BoxError> {
        Ok(Vec::new())
    }

    fn fields(&self, _ty: &RuntimeType) -> Result<Vec<RuntimeField>, BoxError> {
        Ok(Vec::new())
    }

    fn parameter_annotations(&self, _method: &RuntimeMethod) -> Result<Vec<Vec<String>>, BoxError> {
        Ok(Vec::new())
    }

    fn is_annotation_present(&self, _member: Member<'_>, _annotation: &str) -> Result<bool, BoxError> {
        Ok(false)
    }
}

#[test]
fn test_unresolvable_match_is_fatal() {
    let dir = tempdir().unwrap();
    hierarchy_fixture(dir.path());
    let scanner = ClassScanner::new(
        &loader(&[dir.path()], None),
        &ScanConfig::new(),
        &ClassFileParser,
        Arc::new(UnresolvableRuntime),
    )
    .unwrap();

    let err = scanner.find_direct_subtypes_of("a.B").unwrap_err();
    assert!(matches!(err, ScanError::Resolution { ref name, .. } if name == "a.C"));

    // No structural match means no resolution attempt
    assert!(scanner.find_types_annotated_with("a.Nothing").unwrap().is_empty());
}

#[test]
fn test_repeated_construction_is_stable() {
    let dir = tempdir().unwrap();
    hierarchy_fixture(dir.path());
    let loader = loader(&[dir.path()], None);

    let first = scanner(&loader, &ScanConfig::new());
    let second = scanner(&loader, &ScanConfig::new());

    assert_eq!(first.resources().all_resources(), second.resources().all_resources());
    assert_eq!(
        type_names(first.find_implements("a.I").unwrap()),
        type_names(second.find_implements("a.I").unwrap())
    );
}

#[test]
fn test_concurrent_class_queries() {
    let dir = tempdir().unwrap();
    hierarchy_fixture(dir.path());
    let scanner = Arc::new(scanner(&loader(&[dir.path()], None), &ScanConfig::new()));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let scanner = scanner.clone();
            std::thread::spawn(move || type_names(scanner.find_implements("a.I").unwrap()))
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), set(&["a.B", "a.C"]));
    }
}
