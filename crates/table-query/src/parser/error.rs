//! Parser error types.

use crate::lexer::{Span, TokenKind};

/// A parse error: no grammar production matches at the current position.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message} at position {span}")]
pub struct ParseError {
    /// The error message.
    pub message: String,
    /// The location of the error.
    pub span: Span,
    /// Expected tokens (if applicable).
    pub expected: Option<String>,
    /// The actual token found.
    pub found: Option<TokenKind>,
}

impl ParseError {
    /// Creates a new parse error.
    #[must_use]
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
            expected: None,
            found: None,
        }
    }

    /// Creates an "unexpected token" error.
    #[must_use]
    pub fn unexpected(expected: impl Into<String>, found: TokenKind, span: Span) -> Self {
        if found == TokenKind::Eof {
            return Self::unexpected_eof(expected, span);
        }
        let expected_str: String = expected.into();
        Self {
            message: format!(
                "Unexpected token: expected {}, found {}",
                expected_str,
                found.describe()
            ),
            span,
            expected: Some(expected_str),
            found: Some(found),
        }
    }

    /// Creates an "unexpected end of input" error.
    #[must_use]
    pub fn unexpected_eof(expected: impl Into<String>, span: Span) -> Self {
        let expected_str: String = expected.into();
        Self {
            message: format!("Unexpected end of input: expected {expected_str}"),
            span,
            expected: Some(expected_str),
            found: Some(TokenKind::Eof),
        }
    }

    /// Returns the lexer message when the offending token was a lexer error.
    #[must_use]
    pub fn lexer_message(&self) -> Option<&str> {
        match &self.found {
            Some(TokenKind::Error(message)) => Some(message),
            _ => None,
        }
    }
}
