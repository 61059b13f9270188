// Error types for idlvisit.

use crate::{Span, idl::parser::Rule};

// ============================================================================
// Safety Limits
// ============================================================================

/// Safety limits exceeded during parsing.
///
/// The parser enforces configurable limits so that hostile input cannot
/// overflow the stack, either inside pest or while building the AST.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LimitExceeded {
    /// Maximum nesting depth was exceeded.
    ///
    /// Raised by the delimiter pre-scan (`max_parse_depth`) and by the AST
    /// builder when type expressions nest deeper than `max_ast_depth`.
    NestingDepth { message: String },
}

impl std::fmt::Display for LimitExceeded {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LimitExceeded::NestingDepth { message } => f.write_str(message),
        }
    }
}

// ============================================================================
// Error Types
// ============================================================================

/// Top-level error type for parsing and preprocessing IDL sources.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A syntax error detected while parsing a particular nonterminal
    /// (for example, `<TypeDecl>` or `<ServiceDecl>`).
    #[error("syntax error in {nonterminal} at {span:?}: {message}")]
    Syntax {
        /// Source location of the error.
        ///
        /// pest reports cursor positions rather than token spans, so this
        /// runs from the error position to the end of input.
        span: Span,
        /// The grammar nonterminal(s) expected when the error occurred.
        nonterminal: String,
        /// Human-readable description, including line and column.
        message: String,
    },

    /// A safety limit was exceeded.
    #[error("limit exceeded at {span:?}: {kind}")]
    LimitExceeded {
        /// Source location where the limit was exceeded.
        span: Span,
        /// The specific limit that was exceeded.
        kind: LimitExceeded,
    },

    /// An `!@include:` directive could not be loaded or resolved.
    #[error("include of {path:?} failed: {message}")]
    Include {
        /// The include path as written, or as resolved when resolution succeeded.
        path: String,
        /// What went wrong.
        message: String,
    },
}

impl Error {
    /// Construct a syntax error.
    #[must_use]
    pub fn syntax(span: Span, nonterminal: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Syntax {
            span,
            nonterminal: nonterminal.into(),
            message: message.into(),
        }
    }

    /// Construct a nesting depth exceeded error.
    ///
    /// If `details` is `Some((depth, max))`, the message includes specific values.
    /// If `None`, a generic message is used.
    #[must_use]
    pub fn nesting_depth(span: Span, details: Option<(usize, usize)>) -> Self {
        let message = match details {
            Some((depth, max)) => {
                format!("Nesting depth {depth} exceeds maximum of {max}")
            }
            None => "maximum nesting depth exceeded".to_string(),
        };
        Error::LimitExceeded {
            span,
            kind: LimitExceeded::NestingDepth { message },
        }
    }

    /// Construct an include error.
    #[must_use]
    pub fn include(path: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Include {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Convert a pest error, keeping the expected rules as the nonterminal.
    ///
    /// The rendered pest message already carries line/column and a caret
    /// under the offending input, which is enough to locate the problem
    /// without re-parsing.
    pub(crate) fn from_pest_error(err: pest::error::Error<Rule>, input_len: usize) -> Self {
        use pest::error::{ErrorVariant, InputLocation};

        let position = match err.location {
            InputLocation::Pos(pos) => pos,
            InputLocation::Span((start, _)) => start,
        };
        let nonterminal = match &err.variant {
            ErrorVariant::ParsingError {
                positives,
                negatives,
            } => {
                let expected = positives
                    .iter()
                    .map(|r| format!("<{r:?}>"))
                    .chain(negatives.iter().map(|r| format!("not <{r:?}>")))
                    .collect::<Vec<_>>()
                    .join(", ");
                if expected.is_empty() {
                    "<input>".to_string()
                } else {
                    expected
                }
            }
            ErrorVariant::CustomError { .. } => "<input>".to_string(),
        };

        Error::Syntax {
            span: Span::new(position, input_len.max(position)),
            nonterminal,
            message: err.to_string(),
        }
    }

    /// The source span, when the error has one.
    pub fn span(&self) -> Option<Span> {
        match self {
            Error::Syntax { span, .. } | Error::LimitExceeded { span, .. } => Some(*span),
            Error::Include { .. } => None,
        }
    }
}

/// Result type alias for idlvisit operations.
pub type Result<T> = std::result::Result<T, Error>;
