// IDL Parser Constants
//
// Defaults for the limits a `Builder` starts from.

/// Default maximum nesting depth for pre-parse validation (heuristic)
///
/// The pre-scan tracks the depth of opening delimiters `(`, `[`, `{`, `<`.
/// Structural nesting in IDL is shallow (`service { types { struct { ... } } }`
/// is four levels), so the headroom goes to nested type expressions.
///
/// This limit is enforced in:
/// - Parser validation (`parser.rs`: `validate_nesting_depth`)
pub const DEFAULT_MAX_PARSE_DEPTH: usize = 128;

/// Default maximum nesting depth of type expressions (precise)
///
/// The AST builder recurses once per nested `TypeDecl`, and so does the
/// visitor walking the finished tree. Both stay comfortably within a 1MB stack
/// at this depth.
///
/// This limit is enforced in:
/// - AST builder (`builder.rs`): depth parameter passed to `build_type_decl`
pub const DEFAULT_MAX_AST_DEPTH: usize = 64;

/// Default pest call limit (total rule invocations per parse)
pub const DEFAULT_MAX_CALL_LIMIT: usize = 10_000_000;

/// Annotation key that marks a service function as a query.
pub const QUERY_ANNOTATION: &str = "query";

/// Annotation key whose value is appended to a declaration's docs.
pub const DOC_ANNOTATION: &str = "doc";

/// Global annotation directive resolved by the preprocessor.
pub const INCLUDE_DIRECTIVE: &str = "!@include:";
