// IDL Parser
//
// This module runs the pest PEG grammar over IDL source text.
// It includes complexity protection against stack overflow and timeout attacks.

use crate::idl::constants;
use crate::{Error, Result, Span};
use pest::Parser;
use pest_derive::Parser;
use std::num::NonZeroUsize;

#[derive(Parser)]
#[grammar = "idl/grammar.pest"]
pub struct IdlGrammar;

pub use pest::iterators::Pairs;

/// Configuration for parsing IDL sources
#[derive(Debug, Clone, Copy)]
pub struct ParseConfig {
    /// Maximum delimiter nesting for the pre-parse heuristic (default: 128)
    ///
    /// pest recurses once per nested rule, so this bounds its stack usage.
    pub max_parse_depth: usize,

    /// Maximum nesting of type expressions while building the AST (default: 64)
    pub max_ast_depth: usize,

    /// Maximum number of rule invocations (pest call limit for DoS protection)
    ///
    /// `0` disables the limit.
    pub max_call_limit: usize,
}

impl Default for ParseConfig {
    fn default() -> Self {
        Self {
            max_parse_depth: constants::DEFAULT_MAX_PARSE_DEPTH,
            max_ast_depth: constants::DEFAULT_MAX_AST_DEPTH,
            max_call_limit: constants::DEFAULT_MAX_CALL_LIMIT,
        }
    }
}

/// Parse IDL source into a pest parse tree with default configuration
///
/// For custom limits, use [`parse_with_config`]. To get an AST, use
/// [`crate::idl::parse`] or an [`crate::idl::IdlParser`].
///
/// # Example
/// ```
/// use idlvisit::idl::parser::parse;
///
/// let pairs = parse("service Ping { functions { Ping() -> String; } }")?;
/// # Ok::<(), idlvisit::Error>(())
/// ```
pub fn parse(input: &str) -> Result<Pairs<'_, Rule>> {
    parse_with_config(input, ParseConfig::default())
}

/// Parse IDL source with custom configuration
///
/// # Example
/// ```
/// use idlvisit::idl::parser::{parse_with_config, ParseConfig};
///
/// let config = ParseConfig {
///     max_parse_depth: 32,
///     max_ast_depth: 16,
///     max_call_limit: 1_000_000,
/// };
/// let result = parse_with_config("program P {}", config);
/// assert!(result.is_ok());
/// ```
pub fn parse_with_config(input: &str, config: ParseConfig) -> Result<Pairs<'_, Rule>> {
    // Limits TOTAL rule invocations across the parse, not recursion depth
    pest::set_call_limit(NonZeroUsize::new(config.max_call_limit));

    // pest itself recurses per nested rule; reject absurd nesting up front
    validate_nesting_depth(input, config.max_parse_depth)?;

    IdlGrammar::parse(Rule::Top, input).map_err(|e| Error::from_pest_error(e, input.len()))
}

/// Validate that input doesn't exceed maximum delimiter depth (heuristic)
///
/// Tracks the depth of opening delimiters `(`, `[`, `{`, `<`. Each closing
/// delimiter decrements the counter with saturation. The `>` of `->` is not a
/// delimiter and is skipped.
///
/// Delimiters inside comments and doc lines are counted too. False positives
/// on such extreme inputs are acceptable.
fn validate_nesting_depth(input: &str, max_depth: usize) -> Result<()> {
    let mut depth = 0usize;
    let mut prev = '\0';

    for (pos, ch) in input.char_indices() {
        match ch {
            '(' | '[' | '{' | '<' => {
                depth += 1;
                if depth > max_depth {
                    // Span from the offending delimiter to end of input
                    let span = Span::new(pos, input.len());
                    return Err(Error::nesting_depth(span, Some((depth, max_depth))));
                }
            }
            '>' if prev == '-' => {}
            ')' | ']' | '}' | '>' => {
                depth = depth.saturating_sub(1);
            }
            _ => {}
        }
        prev = ch;
    }

    Ok(())
}
