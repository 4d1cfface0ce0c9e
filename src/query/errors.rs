//! Errors raised while lexing, parsing or compiling a query.

use thiserror::Error;

/// A failure at any stage of the query pipeline.
///
/// All variants are values: the pipeline never panics on malformed input, and
/// callers choose per-context presentation (the CLI prefixes these with
/// "could not parse query").
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// A character that cannot start or continue any token.
    #[error("unexpected character '{0}'")]
    UnexpectedCharacter(char),
    /// The query ended in the middle of a backslash escape.
    #[error("unterminated escape at end of query")]
    TrailingEscape,
    /// A token appeared where the grammar forbids it. The payload is the
    /// token's rendering; end-of-input renders as `EOF`.
    #[error("unexpected token: {0}")]
    UnexpectedToken(String),
    /// The expression nests more deeply than the supported maximum.
    #[error("query exceeds maximum nesting depth of {max}")]
    TooDeep {
        /// The enforced limit.
        max: usize,
    },
}
