//! Seed corpus definitions for fuzz targets.
//!
//! These seeds are the source of truth for fuzzing starting points.
//! The `generate-seeds` binary writes these to `corpus/` directories
//! where libFuzzer picks them up.

/// IDL document seeds covering grammar constructs and edge cases.
#[rustfmt::skip]
pub const IDL_SEEDS: &[(&str, &str)] = &[
    // Empty and trivial documents
    ("empty", ""),
    ("whitespace_only", "   \n\t  "),
    ("empty_service", "service S {}"),
    ("empty_program", "program P {}"),

    // Globals and annotations
    ("global_value", "!@sails: 0.1.0"),
    ("global_flag", "!@experimental"),
    ("doc_lines", "/// first\n/// second\nservice S {}"),
    ("query_annotation", "service S { functions { @query\nGet() -> u32; } }"),

    // Type expressions
    ("primitives", "service S { functions { F(a: bool, b: char, c: String, d: u256, e: H160); } }"),
    ("tuple", "service S { functions { F(a: (u8, i16, (u32,))); } }"),
    ("unit_output", "service S { functions { F() -> (); } }"),
    ("slice", "service S { functions { F(a: [[u8]]); } }"),
    ("array", "service S { functions { F(a: [u8; 32]); } }"),
    ("generics", "service S { functions { F(a: Result<Option<u8>, String>); } }"),
    ("path", "service S { functions { F(a: core::Id); } }"),

    // Declarations
    ("struct_named", "service S { types { struct P { x: i32, y: i32 } } }"),
    ("struct_tuple", "service S { types { struct Id(u64); } }"),
    ("struct_unit", "service S { types { struct Marker; } }"),
    ("enum", "service S { types { enum E { A, B(u8), C { v: u32 } } } }"),
    ("alias", "service S { types { alias Bytes = [u8]; } }"),
    ("type_params", "service S { types { struct W<T = u8, U> { t: T, u: U } } }"),

    // Services and programs
    ("events", "service S { events { Done, Moved(i32, i32) } }"),
    ("throws", "service S { functions { F() -> u32 throws String; } }"),
    ("extends", "service S { extends { A, b::B } }"),
    ("exports", "service S { exports { A, Route: B } }"),
    ("program", "program P { constructors { New(a: u32); } services { A, R: B } }"),

    // Edge cases
    ("deep_nesting", "service S { functions { F(a: Option<Option<Option<Option<u8>>>>); } }"),
    ("unclosed", "service S {"),
    ("array_overflow", "service S { functions { F(a: [u8; 99999999999]); } }"),
    ("comments", "// line\n/* block */ service S {}"),
];
