//! Error types for parsing, building and rewriting table queries.

use crate::lexer::Span;
use crate::parser::ParseError;

/// A fault raised by the lexer on input it cannot tokenize.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Lexical error: {message} at position {span}")]
pub struct TokenError {
    /// What the lexer could not read.
    pub message: String,
    /// Where it happened.
    pub span: Span,
}

/// Errors surfaced by the public API of this crate.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    /// The input does not match the grammar.
    #[error(transparent)]
    Parse(ParseError),

    /// The input could not be tokenized.
    #[error(transparent)]
    Token(TokenError),

    /// A node was built, or a replacement offered, that violates an invariant.
    #[error("Invalid element: {0}")]
    Construction(String),

    /// A mutation precondition does not hold.
    #[error("Invalid state: {0}")]
    State(String),

    /// The count of a simple aggregate query is not defined.
    #[error("{0}")]
    SimpleAggregateQuery(String),

    /// The query shape is not supported by a rewrite.
    #[error("Unsupported query: {0}")]
    Unsupported(String),
}

impl QueryError {
    /// Creates a construction error.
    #[must_use]
    pub fn construction(message: impl Into<String>) -> Self {
        Self::Construction(message.into())
    }

    /// Creates a state error.
    #[must_use]
    pub fn state(message: impl Into<String>) -> Self {
        Self::State(message.into())
    }
}

impl From<ParseError> for QueryError {
    fn from(err: ParseError) -> Self {
        match err.lexer_message() {
            Some(message) => Self::Token(TokenError {
                message: String::from(message),
                span: err.span,
            }),
            None => Self::Parse(err),
        }
    }
}

impl From<TokenError> for QueryError {
    fn from(err: TokenError) -> Self {
        Self::Token(err)
    }
}

/// Result type for table query operations.
pub type Result<T> = std::result::Result<T, QueryError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::TokenKind;

    #[test]
    fn test_parse_error_with_lexer_token_becomes_token_error() {
        let err = ParseError::unexpected(
            "value",
            TokenKind::Error(String::from("Unexpected character: '#'")),
            Span::new(7, 8),
        );
        let err = QueryError::from(err);
        assert!(matches!(
            err,
            QueryError::Token(TokenError { ref message, span }) if message == "Unexpected character: '#'" && span == Span::new(7, 8)
        ));
    }

    #[test]
    fn test_plain_parse_error_is_kept() {
        let err = QueryError::from(ParseError::new("boom", Span::new(1, 2)));
        assert!(matches!(err, QueryError::Parse(_)));
        assert_eq!(err.to_string(), "boom at position 1..2");
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            QueryError::construction("bad").to_string(),
            "Invalid element: bad"
        );
        assert_eq!(QueryError::state("detached").to_string(), "Invalid state: detached");
    }
}
