// Deeply nested type expressions: every layer must stop at its limit
// instead of overflowing the stack.
// Run with: cargo test --test stack_depth_test -- --nocapture

use idlvisit::ffi::{ErrorCode, ParseHandle, Visitor as CVisitor};
use idlvisit::idl::Builder;
use idlvisit::idl::constants::{DEFAULT_MAX_AST_DEPTH, DEFAULT_MAX_PARSE_DEPTH};
use idlvisit::idl::visitor::Visitor;
use idlvisit::{Error, LimitExceeded};
use std::ffi::CString;
use std::thread;

/// `Option<...<u8>...>` with `depth` type levels in total.
fn nested_option(depth: usize) -> String {
    let levels = depth - 1;
    format!(
        "service S {{ functions {{ F(a: {}u8{}); }} }}",
        "Option<".repeat(levels),
        ">".repeat(levels)
    )
}

/// Run `f` on a thread with an 8MB stack, as debug builds of pest need it.
fn with_large_stack(f: impl FnOnce() + Send + 'static) {
    thread::Builder::new()
        .stack_size(8 * 1024 * 1024)
        .spawn(f)
        .expect("Failed to spawn thread")
        .join()
        .expect("Thread panicked");
}

struct Walk;
impl Visitor<'_> for Walk {}

#[test]
fn deepest_allowed_type_parses_and_walks() {
    with_large_stack(|| {
        let input = nested_option(DEFAULT_MAX_AST_DEPTH);
        let doc = idlvisit::idl::parse(&input).unwrap();
        Walk.visit_document(&doc);

        let source = CString::new(input).unwrap();
        let handle = ParseHandle::parse(&source);
        assert_eq!(
            handle.accept(std::ptr::null(), &CVisitor::default()),
            ErrorCode::Ok
        );
    });
}

#[test]
fn one_level_deeper_hits_the_ast_limit() {
    with_large_stack(|| {
        let input = nested_option(DEFAULT_MAX_AST_DEPTH + 1);
        match idlvisit::idl::parse(&input) {
            Err(Error::LimitExceeded {
                kind: LimitExceeded::NestingDepth { .. },
                ..
            }) => {}
            other => panic!("expected a nesting limit error, got {other:?}"),
        }
    });
}

#[test]
fn prescan_rejects_before_pest_recurses() {
    // Far beyond what a default 1MB stack could parse; the delimiter scan
    // rejects it without recursing at all.
    let input = nested_option(DEFAULT_MAX_PARSE_DEPTH * 50);
    let handle = thread::Builder::new()
        .stack_size(1024 * 1024)
        .spawn(move || idlvisit::idl::parse(&input))
        .expect("Failed to spawn thread");
    let result = handle.join().expect("Thread panicked");
    assert!(matches!(result, Err(Error::LimitExceeded { .. })));
}

#[test]
fn raised_limits_admit_deeper_types() {
    with_large_stack(|| {
        let depth = DEFAULT_MAX_AST_DEPTH * 2;
        let parser = Builder::default()
            .max_parse_depth(depth + 8)
            .max_ast_depth(depth)
            .build();

        for depth in [10, 50, 100, depth] {
            let input = nested_option(depth);
            match parser.parse(&input) {
                Ok(_) => println!("Depth {depth}: ✓ SUCCESS"),
                Err(e) => panic!("Depth {depth}: ✗ FAILED - {e}"),
            }
        }
    });
}
