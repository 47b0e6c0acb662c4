//! Token types for the table query lexer.

use super::Span;

/// Reserved words of the table query dialect.
///
/// Function names (`COUNT`, `MAX`, `NULLIF`, `YEAR`, ...) are not keywords:
/// they are recognised by the parser from an identifier followed by `(`, so
/// that they stay usable as column names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    // Query structure
    Select,
    Distinct,
    All,
    From,
    Where,
    Group,
    Order,
    By,
    Asc,
    Desc,
    Limit,
    Offset,
    As,
    With,
    Union,
    DefiningWhere,

    // Joins
    Join,
    Inner,
    Left,
    Right,
    Outer,
    On,

    // Boolean logic and predicates
    And,
    Or,
    Not,
    Is,
    Null,
    True,
    False,
    Unknown,
    In,
    Between,
    Like,
    Escape,
    Has,
    HasLike,
    TextMatches,

    // Value expressions
    Case,
    When,
    Then,
    Else,
    End,
    Cast,
    Separator,
    Interval,
    Div,
}

impl Keyword {
    /// Attempts to parse a keyword from a string (case-insensitive).
    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "SELECT" => Some(Self::Select),
            "DISTINCT" => Some(Self::Distinct),
            "ALL" => Some(Self::All),
            "FROM" => Some(Self::From),
            "WHERE" => Some(Self::Where),
            "GROUP" => Some(Self::Group),
            "ORDER" => Some(Self::Order),
            "BY" => Some(Self::By),
            "ASC" => Some(Self::Asc),
            "DESC" => Some(Self::Desc),
            "LIMIT" => Some(Self::Limit),
            "OFFSET" => Some(Self::Offset),
            "AS" => Some(Self::As),
            "WITH" => Some(Self::With),
            "UNION" => Some(Self::Union),
            "DEFINING_WHERE" => Some(Self::DefiningWhere),
            "JOIN" => Some(Self::Join),
            "INNER" => Some(Self::Inner),
            "LEFT" => Some(Self::Left),
            "RIGHT" => Some(Self::Right),
            "OUTER" => Some(Self::Outer),
            "ON" => Some(Self::On),
            "AND" => Some(Self::And),
            "OR" => Some(Self::Or),
            "NOT" => Some(Self::Not),
            "IS" => Some(Self::Is),
            "NULL" => Some(Self::Null),
            "TRUE" => Some(Self::True),
            "FALSE" => Some(Self::False),
            "UNKNOWN" => Some(Self::Unknown),
            "IN" => Some(Self::In),
            "BETWEEN" => Some(Self::Between),
            "LIKE" => Some(Self::Like),
            "ESCAPE" => Some(Self::Escape),
            "HAS" => Some(Self::Has),
            "HAS_LIKE" => Some(Self::HasLike),
            "TEXT_MATCHES" => Some(Self::TextMatches),
            "CASE" => Some(Self::Case),
            "WHEN" => Some(Self::When),
            "THEN" => Some(Self::Then),
            "ELSE" => Some(Self::Else),
            "END" => Some(Self::End),
            "CAST" => Some(Self::Cast),
            "SEPARATOR" => Some(Self::Separator),
            "INTERVAL" => Some(Self::Interval),
            "DIV" => Some(Self::Div),
            _ => None,
        }
    }

    /// Returns the keyword as a string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Select => "SELECT",
            Self::Distinct => "DISTINCT",
            Self::All => "ALL",
            Self::From => "FROM",
            Self::Where => "WHERE",
            Self::Group => "GROUP",
            Self::Order => "ORDER",
            Self::By => "BY",
            Self::Asc => "ASC",
            Self::Desc => "DESC",
            Self::Limit => "LIMIT",
            Self::Offset => "OFFSET",
            Self::As => "AS",
            Self::With => "WITH",
            Self::Union => "UNION",
            Self::DefiningWhere => "DEFINING_WHERE",
            Self::Join => "JOIN",
            Self::Inner => "INNER",
            Self::Left => "LEFT",
            Self::Right => "RIGHT",
            Self::Outer => "OUTER",
            Self::On => "ON",
            Self::And => "AND",
            Self::Or => "OR",
            Self::Not => "NOT",
            Self::Is => "IS",
            Self::Null => "NULL",
            Self::True => "TRUE",
            Self::False => "FALSE",
            Self::Unknown => "UNKNOWN",
            Self::In => "IN",
            Self::Between => "BETWEEN",
            Self::Like => "LIKE",
            Self::Escape => "ESCAPE",
            Self::Has => "HAS",
            Self::HasLike => "HAS_LIKE",
            Self::TextMatches => "TEXT_MATCHES",
            Self::Case => "CASE",
            Self::When => "WHEN",
            Self::Then => "THEN",
            Self::Else => "ELSE",
            Self::End => "END",
            Self::Cast => "CAST",
            Self::Separator => "SEPARATOR",
            Self::Interval => "INTERVAL",
            Self::Div => "DIV",
        }
    }
}

/// The kind of token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    // Literals
    /// Exact numeric literal, raw text (e.g., `42`, `1.5`, `.5`, `3.`)
    ExactNumeric(String),
    /// Approximate numeric literal, raw text (e.g., `1.2e-3`)
    ApproximateNumeric(String),
    /// Single-quoted string literal, unescaped (e.g., 'it''s' -> it's)
    String(String),

    // Identifiers and keywords
    /// Bare identifier (e.g., column_name)
    Identifier(String),
    /// Double-quoted identifier, unescaped
    DoubleQuoted(String),
    /// Backtick-quoted identifier, unescaped
    Backticked(String),
    /// Entity id, raw text (e.g., `syn123`, `SYN123.4`)
    EntityId(String),
    /// Reserved word
    Keyword(Keyword),

    // Operators
    /// +
    Plus,
    /// -
    Minus,
    /// *
    Star,
    /// /
    Slash,
    /// %
    Percent,
    /// =
    Eq,
    /// != or <>
    NotEq,
    /// <
    Lt,
    /// <=
    LtEq,
    /// >
    Gt,
    /// >=
    GtEq,

    // Delimiters
    /// (
    LeftParen,
    /// )
    RightParen,
    /// ,
    Comma,
    /// .
    Dot,

    // Special
    /// End of input
    Eof,
    /// Unrecognised or malformed input
    Error(String),
}

impl TokenKind {
    /// Returns a short human readable description, used in error messages.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::ExactNumeric(text) | Self::ApproximateNumeric(text) => format!("number {text}"),
            Self::String(value) => format!("string '{value}'"),
            Self::Identifier(name) => format!("identifier {name}"),
            Self::DoubleQuoted(name) => format!("identifier \"{name}\""),
            Self::Backticked(name) => format!("identifier `{name}`"),
            Self::EntityId(text) => format!("entity id {text}"),
            Self::Keyword(keyword) => format!("keyword {}", keyword.as_str()),
            Self::Plus => String::from("'+'"),
            Self::Minus => String::from("'-'"),
            Self::Star => String::from("'*'"),
            Self::Slash => String::from("'/'"),
            Self::Percent => String::from("'%'"),
            Self::Eq => String::from("'='"),
            Self::NotEq => String::from("'<>'"),
            Self::Lt => String::from("'<'"),
            Self::LtEq => String::from("'<='"),
            Self::Gt => String::from("'>'"),
            Self::GtEq => String::from("'>='"),
            Self::LeftParen => String::from("'('"),
            Self::RightParen => String::from("')'"),
            Self::Comma => String::from("','"),
            Self::Dot => String::from("'.'"),
            Self::Eof => String::from("end of input"),
            Self::Error(message) => message.clone(),
        }
    }
}

/// A token with its span in the source code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// The kind of token.
    pub kind: TokenKind,
    /// The location in the source code.
    pub span: Span,
}

impl Token {
    /// Creates a new token.
    #[must_use]
    pub const fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Returns true if this is an EOF token.
    #[must_use]
    pub const fn is_eof(&self) -> bool {
        matches!(self.kind, TokenKind::Eof)
    }

    /// Returns the keyword if this is a keyword token.
    #[must_use]
    pub const fn as_keyword(&self) -> Option<Keyword> {
        match &self.kind {
            TokenKind::Keyword(kw) => Some(*kw),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_from_str() {
        assert_eq!(Keyword::from_str("SELECT"), Some(Keyword::Select));
        assert_eq!(Keyword::from_str("has_like"), Some(Keyword::HasLike));
        assert_eq!(Keyword::from_str("Text_Matches"), Some(Keyword::TextMatches));
        assert_eq!(Keyword::from_str("div"), Some(Keyword::Div));
        assert_eq!(Keyword::from_str("defining_where"), Some(Keyword::DefiningWhere));
        assert_eq!(Keyword::from_str("count"), None);
        assert_eq!(Keyword::from_str("not_a_keyword"), None);
    }

    #[test]
    fn test_keyword_as_str_round_trips() {
        for keyword in [
            Keyword::Select,
            Keyword::HasLike,
            Keyword::TextMatches,
            Keyword::Separator,
            Keyword::Unknown,
            Keyword::DefiningWhere,
            Keyword::Div,
        ] {
            assert_eq!(Keyword::from_str(keyword.as_str()), Some(keyword));
        }
    }

    #[test]
    fn test_token_as_keyword() {
        let select = Token::new(TokenKind::Keyword(Keyword::Select), Span::new(0, 6));
        let plus = Token::new(TokenKind::Plus, Span::new(0, 1));
        assert_eq!(select.as_keyword(), Some(Keyword::Select));
        assert_eq!(plus.as_keyword(), None);
        assert!(Token::new(TokenKind::Eof, Span::new(6, 6)).is_eof());
    }

    #[test]
    fn test_describe() {
        assert_eq!(TokenKind::Eof.describe(), "end of input");
        assert_eq!(
            TokenKind::Keyword(Keyword::From).describe(),
            "keyword FROM"
        );
    }
}
