// `!@include:` expansion against real files

use idlvisit::Error;
use idlvisit::idl::{FsLoader, IdlParser, preprocess};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write(dir: &Path, name: &str, content: &str) {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

#[test]
fn program_file_pulls_in_its_services() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write(
        root,
        "main.idl",
        "!@sails: 0.1.0\n!@include: services/counter.idl\n!@include: \"services/walker.idl\"\n\nprogram Demo {\n    services { Counter, Walker }\n}\n",
    );
    write(
        root,
        "services/counter.idl",
        "service Counter {\n    functions { Add(value: u32) -> u32; }\n}\n",
    );
    write(
        root,
        "services/walker.idl",
        "!@include: counter.idl\nservice Walker {\n    extends { Counter }\n}\n",
    );

    let doc = IdlParser::default().parse_file(root.join("main.idl")).unwrap();
    assert_eq!(doc.global("sails"), Some("0.1.0"));
    assert_eq!(doc.programs[0].services.len(), 2);

    // counter.idl is reachable twice but spliced once
    let names: Vec<_> = doc.services.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, ["Counter", "Walker"]);
}

#[test]
fn same_file_through_different_paths_is_spliced_once() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write(root, "shared/types.idl", "service Shared {}\n");
    write(
        root,
        "main.idl",
        "!@include: shared/types.idl\n!@include: shared/../shared/types.idl\n",
    );

    let main = root.join("main.idl");
    let source = preprocess(&main.to_string_lossy(), &FsLoader).unwrap();
    assert_eq!(source.matches("service Shared").count(), 1);
}

#[test]
fn include_cycle_terminates() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write(root, "a.idl", "!@include: b.idl\nservice A {}\n");
    write(root, "b.idl", "!@include: a.idl\nservice B {}\n");

    let doc = IdlParser::default().parse_file(root.join("a.idl")).unwrap();
    let names: Vec<_> = doc.services.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, ["B", "A"]);
}

#[test]
fn missing_include_is_reported() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write(root, "main.idl", "!@include: nowhere.idl\nservice S {}\n");

    match IdlParser::default().parse_file(root.join("main.idl")) {
        Err(Error::Include { path, .. }) => assert!(path.ends_with("nowhere.idl"), "{path}"),
        other => panic!("expected an include error, got {other:?}"),
    }
}

#[test]
fn syntax_errors_surface_after_expansion() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write(root, "broken.idl", "service Broken {\n");
    write(root, "main.idl", "!@include: broken.idl\nservice Fine {}\n");

    assert!(matches!(
        IdlParser::default().parse_file(root.join("main.idl")),
        Err(Error::Syntax { .. })
    ));
}
