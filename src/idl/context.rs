// IDL Configuration and Parser Driver
//
// This module provides a builder pattern for configuring IDL parsing,
// and a driver struct `IdlParser` that runs the grammar, builds the AST and
// optionally expands `!@include:` directives first.

use crate::Result;
use crate::idl::ast::Document;
use crate::idl::parser::{self, ParseConfig};
use crate::idl::preprocess::{FsLoader, preprocess};
use crate::idl::{builder, constants};
use std::path::Path;
use tracing::debug;

// ============================================================================
// Configuration Builder
// ============================================================================

/// Configuration builder for IDL parsing
///
/// # Examples
///
/// Simple usage with defaults:
/// ```
/// use idlvisit::idl::Builder;
///
/// let parser = Builder::default().build();
/// ```
///
/// With custom configuration:
/// ```
/// use idlvisit::idl::Builder;
///
/// let parser = Builder::default()
///     .max_parse_depth(96)
///     .max_ast_depth(32)
///     .max_call_limit(50_000_000)
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct Builder {
    /// Maximum delimiter depth for heuristic pre-validation (default: 128)
    ///
    /// This protects the pest parser, which recurses once per nested rule.
    max_parse_depth: usize,

    /// Maximum nesting of type expressions (default: 64)
    ///
    /// Bounds recursion in the AST builder and, later, in the visitor walk.
    max_ast_depth: usize,

    /// Maximum call limit for pest parser (default: 10 million)
    max_call_limit: usize,
}

impl Default for Builder {
    /// Create a new builder with default configuration
    ///
    /// Defaults:
    /// - `max_parse_depth`: 128
    /// - `max_ast_depth`: 64
    /// - `max_call_limit`: 10,000,000
    fn default() -> Self {
        Self {
            max_parse_depth: constants::DEFAULT_MAX_PARSE_DEPTH,
            max_ast_depth: constants::DEFAULT_MAX_AST_DEPTH,
            max_call_limit: constants::DEFAULT_MAX_CALL_LIMIT,
        }
    }
}

impl Builder {
    /// Set maximum delimiter depth for heuristic pre-validation
    ///
    /// Should be higher than `max_ast_depth`: every type nesting level
    /// sits inside at least the braces of its service or program.
    #[must_use]
    pub fn max_parse_depth(mut self, depth: usize) -> Self {
        self.max_parse_depth = depth;
        self
    }

    /// Set maximum nesting depth of type expressions
    ///
    /// # Examples
    /// ```
    /// use idlvisit::idl::Builder;
    ///
    /// let parser = Builder::default().max_ast_depth(2).build();
    /// assert!(parser.parse("service S { functions { F(a: Option<u8>); } }").is_ok());
    /// assert!(parser.parse("service S { functions { F(a: Option<Option<u8>>); } }").is_err());
    /// ```
    #[must_use]
    pub fn max_ast_depth(mut self, depth: usize) -> Self {
        self.max_ast_depth = depth;
        self
    }

    /// Set maximum call limit for the pest parser
    ///
    /// `0` disables the limit.
    #[must_use]
    pub fn max_call_limit(mut self, limit: usize) -> Self {
        self.max_call_limit = limit;
        self
    }

    /// Build an IDL parser driver with this configuration
    ///
    /// The driver can be reused for parsing multiple documents.
    #[must_use]
    pub fn build(self) -> IdlParser {
        IdlParser {
            config: ParseConfig {
                max_parse_depth: self.max_parse_depth,
                max_ast_depth: self.max_ast_depth,
                max_call_limit: self.max_call_limit,
            },
        }
    }
}

// ============================================================================
// IDL Parser Driver
// ============================================================================

/// IDL Parser Driver
///
/// Holds the parsing limits and turns IDL source into an owned [`Document`].
/// The driver keeps no state between calls.
#[derive(Debug, Clone)]
pub struct IdlParser {
    config: ParseConfig,
}

impl Default for IdlParser {
    fn default() -> Self {
        Builder::default().build()
    }
}

impl IdlParser {
    /// The limits this driver applies.
    pub fn config(&self) -> ParseConfig {
        self.config
    }

    /// Parse IDL source text into a [`Document`]
    ///
    /// # Examples
    ///
    /// ```
    /// use idlvisit::idl::IdlParser;
    ///
    /// let doc = IdlParser::default()
    ///     .parse("program MyProgram { constructors { NewCtor(param1: u32); } }")?;
    /// assert_eq!(doc.programs[0].ctors[0].name, "NewCtor");
    /// # Ok::<(), idlvisit::Error>(())
    /// ```
    pub fn parse(&self, input: &str) -> Result<Document> {
        debug!(len = input.len(), "parsing IDL source");

        // 1. Parse with pest
        let pairs = parser::parse_with_config(input, self.config)?;

        // 2. Build the owned AST
        let doc = builder::build_document(pairs, self.config.max_ast_depth)?;

        debug!(
            globals = doc.globals.len(),
            programs = doc.programs.len(),
            services = doc.services.len(),
            "parsed IDL document"
        );
        Ok(doc)
    }

    /// Read `path`, expand its `!@include:` directives and parse the result
    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<Document> {
        let path = path.as_ref();
        let source = preprocess(&path.to_string_lossy(), &FsLoader)?;
        self.parse(&source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn default_builder_matches_constants() {
        let config = IdlParser::default().config();
        assert_eq!(config.max_parse_depth, constants::DEFAULT_MAX_PARSE_DEPTH);
        assert_eq!(config.max_ast_depth, constants::DEFAULT_MAX_AST_DEPTH);
        assert_eq!(config.max_call_limit, constants::DEFAULT_MAX_CALL_LIMIT);
    }

    #[test]
    fn parse_depth_limit_is_applied() {
        let parser = Builder::default().max_parse_depth(3).build();
        let err = parser
            .parse("service S { functions { F(a: (u8,)); } }")
            .unwrap_err();
        assert!(matches!(err, Error::LimitExceeded { .. }));
    }

    #[test]
    fn parser_is_reusable() {
        let parser = IdlParser::default();
        for name in ["A", "B", "C"] {
            let doc = parser.parse(&format!("service {name} {{}}")).unwrap();
            assert_eq!(doc.services[0].name, name);
        }
    }

    #[test]
    fn missing_file_is_an_include_error() {
        let err = IdlParser::default()
            .parse_file("/definitely/not/here.idl")
            .unwrap_err();
        assert!(matches!(err, Error::Include { .. }));
    }
}
