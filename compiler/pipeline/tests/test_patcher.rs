use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use config::GenerationConfig;
use ir::{Document, DocumentTree, Field, FieldType, StructLike, TypeCategory};
use pipeline::{
    generate_from_file, write_output, NamespaceResolver, OutputUnit, PatchOptions, Patcher,
    PipelineError, UnitKind,
};
use regex::Regex;
use semantics::StructuralOracle;
use tempfile::TempDir;

const MODULE: &str = "github.com/acme/app";

/// Helper function to create a document with a go namespace
fn create_test_document(filename: &str, namespace: &str, includes: &[&str]) -> Document {
    let mut doc = Document::new(filename);
    doc.namespaces.insert("go".into(), namespace.into());
    doc.includes = includes.iter().map(|s| s.to_string()).collect();
    doc
}

/// Helper function to create a service tree where two documents share an include
fn create_test_tree() -> DocumentTree {
    let mut base = create_test_document("idl/base.thrift", "base", &[]);
    base.structs.push(StructLike::new(
        "Base",
        vec![Field::new(1, "LogID", FieldType::scalar(TypeCategory::String))],
    ));

    let mut user = create_test_document("idl/user.thrift", "example.user", &["idl/base.thrift"]);
    user.structs.push(StructLike::new(
        "User",
        vec![
            Field::new(1, "id", FieldType::scalar(TypeCategory::I64)),
            Field::new(2, "name", FieldType::scalar(TypeCategory::String)),
        ],
    ));

    let mut svc = create_test_document(
        "idl/svc.thrift",
        "example.svc",
        &["idl/base.thrift", "idl/user.thrift"],
    );
    let user_type = FieldType::named("User", TypeCategory::Struct, "idl/user.thrift");
    let base_type = FieldType::named("Base", TypeCategory::Struct, "idl/base.thrift");
    svc.structs.push(StructLike::new(
        "GetUserRequest",
        vec![Field::new(1, "user", user_type), Field::new(255, "Base", base_type)],
    ));

    DocumentTree::with_root("idl/svc.thrift", vec![svc, base, user]).expect("tree should build")
}

/// Helper function to run the patcher with `options` over `tree`
fn patch(tree: &DocumentTree, options: PatchOptions) -> pipeline::Result<Vec<OutputUnit>> {
    let oracle = StructuralOracle::new(tree);
    let resolver = NamespaceResolver::new(tree, options.module.clone(), "go").expect("resolver");
    Patcher::new(tree, resolver, &oracle).with_options(options).patch()
}

fn paths_and_kinds(units: &[OutputUnit]) -> Vec<(PathBuf, UnitKind)> {
    units.iter().map(|u| (u.path.clone(), u.kind)).collect()
}

/// Helper function to write every document of `tree` as a source file below `root`
fn create_test_sources(root: &Path, tree: &DocumentTree) {
    for doc in tree.documents() {
        let path = root.join(&doc.filename);
        fs::create_dir_all(path.parent().expect("source has a parent")).expect("create dir");
        fs::write(&path, format!("// {}\n", doc.filename)).expect("write source");
    }
}

#[test]
fn test_units_follow_depth_first_order() {
    let tree = create_test_tree();
    let units = patch(&tree, PatchOptions::default().module(MODULE)).expect("patch");

    assert_eq!(
        paths_and_kinds(&units),
        vec![
            (PathBuf::from("example/svc/generated-consts.go"), UnitKind::Protection),
            (PathBuf::from("example/svc/generated-svc.go"), UnitKind::Document),
            (PathBuf::from("base/generated-consts.go"), UnitKind::Protection),
            (PathBuf::from("base/generated-base.go"), UnitKind::Document),
            (PathBuf::from("example/user/generated-consts.go"), UnitKind::Protection),
            (PathBuf::from("example/user/generated-user.go"), UnitKind::Document),
        ]
    );
}

#[test]
fn test_shared_include_visited_once() {
    let tree = create_test_tree();
    let units = patch(&tree, PatchOptions::default()).expect("patch");

    let base_documents = units
        .iter()
        .filter(|u| u.path == PathBuf::from("base/generated-base.go"))
        .count();
    assert_eq!(base_documents, 1);
}

#[test]
fn test_two_documents_share_one_protection_unit() {
    let a = create_test_document("a.thrift", "out.pkg", &[]);
    let b = create_test_document("b.thrift", "out.pkg", &[]);
    let tree = DocumentTree::new(vec![a, b], vec!["a.thrift".into(), "b.thrift".into()])
        .expect("tree should build");
    let units = patch(&tree, PatchOptions::default()).expect("patch");

    assert_eq!(
        paths_and_kinds(&units),
        vec![
            (PathBuf::from("out/pkg/generated-consts.go"), UnitKind::Protection),
            (PathBuf::from("out/pkg/generated-a.go"), UnitKind::Document),
            (PathBuf::from("out/pkg/generated-b.go"), UnitKind::Document),
        ]
    );
}

#[test]
fn test_protection_file_declares_package() {
    let tree = create_test_tree();
    let units = patch(&tree, PatchOptions::default()).expect("patch");

    let protection = units.first().expect("protection unit");
    assert_eq!(protection.kind, UnitKind::Protection);
    assert!(protection.text().starts_with("package svc\n"), "got {}", protection.text());
    assert!(units[1].text().contains("\npackage svc\n"));
}

#[test]
fn test_module_local_imports_listed_once() {
    let tree = create_test_tree();
    let units = patch(&tree, PatchOptions::default().module(MODULE)).expect("patch");

    let svc = units[1].text();
    assert_eq!(svc.matches("\"github.com/acme/app/example/user\"").count(), 1, "got {}", svc);
    assert!(svc.contains("func (p *GetUserRequest) FastRead"));
}

/// Package names the import block of `source` makes visible.
fn imported_names(source: &str) -> BTreeSet<String> {
    let block = source
        .split_once("import (\n")
        .and_then(|(_, rest)| rest.split_once("\n)"))
        .map(|(block, _)| block)
        .expect("import block");
    block
        .lines()
        .filter_map(|line| {
            let line = line.trim();
            let (alias, path) = line.split_once(' ').unwrap_or(("", line));
            let path = path.trim_matches('"');
            if path.is_empty() {
                return None;
            }
            let last = path.rsplit('/').next().unwrap_or(path);
            Some(if alias.is_empty() { last } else { alias }.to_string())
        })
        .collect()
}

/// Package qualifiers the body of `source` uses for types and constructors.
fn qualifiers(source: &str) -> BTreeSet<String> {
    let pointer = Regex::new(r"\*([a-z_][a-z0-9_]*)\.[A-Z]").expect("pattern");
    let constructor = Regex::new(r"\b([a-z_][a-z0-9_]*)\.New[A-Z]\w*\(").expect("pattern");
    pointer
        .captures_iter(source)
        .chain(constructor.captures_iter(source))
        .map(|c| c[1].to_string())
        .collect()
}

#[test]
fn test_qualified_types_are_imported() {
    let mut base = create_test_document("base.thrift", "base", &[]);
    base.structs.push(StructLike::new(
        "Base",
        vec![Field::new(1, "LogID", FieldType::scalar(TypeCategory::String))],
    ));
    let base_type = FieldType::named("base.Base", TypeCategory::Struct, "base.thrift");
    let mut svc = create_test_document("svc.thrift", "example.svc", &["base.thrift"]);
    svc.structs.push(StructLike::new(
        "Req",
        vec![
            Field::new(1, "id", FieldType::scalar(TypeCategory::I64)),
            Field::new(255, "Base", base_type),
        ],
    ));
    let tree = DocumentTree::with_root("svc.thrift", vec![svc, base]).expect("tree should build");

    let units = patch(&tree, PatchOptions::default().module(MODULE)).expect("patch");
    let svc = units[1].text();
    assert!(svc.contains("\"github.com/acme/app/base\""), "got {}", svc);
    assert!(svc.contains("p.Base = base.NewBase()"), "got {}", svc);
    assert!(svc.contains("_ = base.UnusedProtection"), "got {}", svc);

    let used = qualifiers(&svc);
    assert!(used.contains("base"), "got {:?}", used);
    let imported = imported_names(&svc);
    let missing: Vec<&String> = used.difference(&imported).collect();
    assert!(missing.is_empty(), "unimported qualifiers {:?} in {}", missing, svc);
}

#[test]
fn test_same_package_include_is_unqualified() {
    let mut peer = create_test_document("peer.thrift", "example.svc", &[]);
    peer.structs.push(StructLike::new("Peer", vec![]));
    let mut svc = create_test_document("svc.thrift", "example.svc", &["peer.thrift"]);
    svc.structs.push(StructLike::new(
        "Req",
        vec![Field::new(1, "peer", FieldType::named("Peer", TypeCategory::Struct, "peer.thrift"))],
    ));
    let tree = DocumentTree::with_root("svc.thrift", vec![svc, peer]).expect("tree should build");

    let units = patch(&tree, PatchOptions::default().module(MODULE)).expect("patch");
    let svc = units[1].text();
    assert!(svc.contains(":= NewPeer()"), "got {}", svc);
    assert!(!svc.contains("example/svc\""), "got {}", svc);
}

#[test]
fn test_fast_api_disabled() {
    let tree = create_test_tree();
    let units = patch(&tree, PatchOptions::default().fast_api(false)).expect("patch");

    assert!(!units[1].text().contains("FastWriteNocopy"));
}

#[test]
fn test_copy_idl_emits_verbatim_sources() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let tree = create_test_tree();
    create_test_sources(temp_dir.path(), &tree);

    let options = PatchOptions::default().copy_idl(true).source_root(temp_dir.path());
    let units = patch(&tree, options).expect("patch");

    let copies: Vec<&OutputUnit> = units.iter().filter(|u| u.kind == UnitKind::IdlCopy).collect();
    assert_eq!(copies.len(), 3);
    assert_eq!(copies[0].path, PathBuf::from("example/svc/svc.thrift"));
    assert_eq!(copies[0].content, b"// idl/svc.thrift\n");
    assert_eq!(units[2].kind, UnitKind::IdlCopy, "copy follows its document");
}

#[test]
fn test_copy_idl_keeps_non_utf8_bytes() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let tree = create_test_tree();
    create_test_sources(temp_dir.path(), &tree);
    let latin1: &[u8] = b"// caf\xe9\nnamespace go example.svc\n";
    fs::write(temp_dir.path().join("idl/svc.thrift"), latin1).expect("write source");

    let options = PatchOptions::default().copy_idl(true).source_root(temp_dir.path());
    let units = patch(&tree, options).expect("patch");
    assert_eq!(units[2].kind, UnitKind::IdlCopy);
    assert_eq!(units[2].content, latin1);

    let out = temp_dir.path().join("out");
    write_output(&out, &units).expect("write");
    let written = fs::read(out.join("example/svc/svc.thrift")).expect("copy written");
    assert_eq!(written, latin1);
}

#[test]
fn test_copy_idl_missing_source() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let tree = create_test_tree();

    let options = PatchOptions::default().copy_idl(true).source_root(temp_dir.path());
    match patch(&tree, options) {
        Err(PipelineError::SourceRead { filename, .. }) => assert_eq!(filename, "idl/svc.thrift"),
        other => panic!("Expected SourceRead error, got {:?}", other),
    }
}

#[test]
fn test_unresolved_type_is_classification_error() {
    let mut doc = create_test_document("bad.thrift", "bad", &[]);
    doc.structs.push(StructLike::new(
        "Broken",
        vec![Field::new(1, "ghost", FieldType::named("Ghost", TypeCategory::Struct, "bad.thrift"))],
    ));
    let tree = DocumentTree::with_root("bad.thrift", vec![doc]).expect("tree should build");

    match patch(&tree, PatchOptions::default()) {
        Err(PipelineError::TypeClassification { filename, .. }) => {
            assert_eq!(filename, "bad.thrift")
        }
        other => panic!("Expected TypeClassification error, got {:?}", other),
    }
}

#[test]
fn test_invalid_namespace_is_scope_error() {
    let doc = create_test_document("odd.thrift", "example..odd", &[]);
    let tree = DocumentTree::with_root("odd.thrift", vec![doc]).expect("tree should build");

    match patch(&tree, PatchOptions::default()) {
        Err(PipelineError::ScopeResolution { filename, source }) => {
            assert_eq!(filename, "odd.thrift");
            assert!(source.to_string().contains("example..odd"));
        }
        other => panic!("Expected ScopeResolution error, got {:?}", other),
    }
}

#[test]
fn test_same_output_from_two_documents() {
    let first = create_test_document("a/user.thrift", "example.user", &[]);
    let second = create_test_document("b/user.thrift", "example.user", &[]);
    let tree = DocumentTree::new(
        vec![first, second],
        vec!["a/user.thrift".to_string(), "b/user.thrift".to_string()],
    )
    .expect("tree should build");

    match patch(&tree, PatchOptions::default()) {
        Err(PipelineError::DuplicateOutput { first, second, .. }) => {
            assert_eq!(first, "a/user.thrift");
            assert_eq!(second, "b/user.thrift");
        }
        other => panic!("Expected DuplicateOutput error, got {:?}", other),
    }
}

#[test]
fn test_generate_from_file_and_write() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let tree = create_test_tree();
    let tree_path = temp_dir.path().join("tree.json");
    tree.to_file(&tree_path).expect("save tree");
    create_test_sources(temp_dir.path(), &tree);

    let config = GenerationConfig { copy_idl: true, ..GenerationConfig::default() };
    let units = generate_from_file(&tree_path, &config, None).expect("generate");
    assert_eq!(units.len(), 9);

    let out = temp_dir.path().join("out");
    write_output(&out, &units).expect("write");
    assert!(out.join("example/svc/generated-svc.go").exists());
    assert!(out.join("example/user/generated-consts.go").exists());
    assert_eq!(
        fs::read_to_string(out.join("base/base.thrift")).expect("copy written"),
        "// idl/base.thrift\n"
    );
}

#[test]
fn test_generate_from_missing_tree() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let tree_path = temp_dir.path().join("absent.json");
    let result = generate_from_file(&tree_path, &GenerationConfig::default(), None);
    assert!(matches!(result, Err(PipelineError::Tree(_))), "got {:?}", result);
}
