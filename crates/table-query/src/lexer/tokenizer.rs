//! Table query tokenizer implementation.

use super::{Keyword, Span, Token, TokenKind};

/// Case-insensitive prefix of an entity id (`syn123`).
const ENTITY_ID_PREFIX: &str = "syn";

/// A lexer that tokenizes table query input.
///
/// The lexer never fails: anything it does not recognise becomes a
/// [`TokenKind::Error`] token and scanning resumes after it.
pub struct Lexer<'a> {
    /// The input source code.
    input: &'a str,
    /// The current byte position.
    pos: usize,
    /// The byte position of the start of the current token.
    start: usize,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer for the given input.
    #[must_use]
    pub const fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            start: 0,
        }
    }

    /// Returns the current character without advancing.
    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    /// Returns the character `n` positions ahead without advancing.
    fn peek_nth(&self, n: usize) -> Option<char> {
        self.input[self.pos..].chars().nth(n)
    }

    /// Returns the next character without advancing.
    fn peek_next(&self) -> Option<char> {
        self.peek_nth(1)
    }

    /// Advances to the next character and returns it.
    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    /// Skips whitespace and `/* ... */` comments. `--` is two minus signs,
    /// so `a--1` is `a - -1`.
    fn skip_whitespace_and_comments(&mut self) {
        loop {
            while self.peek().is_some_and(char::is_whitespace) {
                self.advance();
            }

            // Multi-line comments (/* ... */)
            if self.peek() == Some('/') && self.peek_next() == Some('*') {
                self.advance();
                self.advance();
                loop {
                    match self.advance() {
                        Some('*') if self.peek() == Some('/') => {
                            self.advance();
                            break;
                        }
                        None => break,
                        _ => {}
                    }
                }
                continue;
            }

            break;
        }
    }

    /// Creates a span from start to current position.
    const fn make_span(&self) -> Span {
        Span::new(self.start, self.pos)
    }

    /// Creates a token with the current span.
    const fn make_token(&self, kind: TokenKind) -> Token {
        Token::new(kind, self.make_span())
    }

    /// Scans an identifier, a keyword or an entity id.
    fn scan_word(&mut self) -> Token {
        while self.peek().is_some_and(|c| c.is_alphanumeric() || c == '_') {
            self.advance();
        }

        let text = &self.input[self.start..self.pos];

        if is_entity_id(text) {
            // Only a dot followed by digits belongs to the entity id. A bare
            // trailing dot is left for the parser.
            if self.peek() == Some('.') && self.peek_next().is_some_and(|c| c.is_ascii_digit()) {
                self.advance();
                while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                    self.advance();
                }
            }
            let text = &self.input[self.start..self.pos];
            return self.make_token(TokenKind::EntityId(String::from(text)));
        }

        if let Some(keyword) = Keyword::from_str(text) {
            self.make_token(TokenKind::Keyword(keyword))
        } else {
            self.make_token(TokenKind::Identifier(String::from(text)))
        }
    }

    /// Scans text enclosed by `quote`, collapsing doubled quotes.
    ///
    /// Returns `None` when the closing quote is missing.
    fn scan_quoted(&mut self, quote: char) -> Option<String> {
        self.advance(); // consume opening quote
        let mut value = String::new();

        loop {
            match self.peek() {
                Some(c) if c == quote => {
                    if self.peek_next() == Some(quote) {
                        value.push(quote);
                        self.advance();
                        self.advance();
                    } else {
                        break;
                    }
                }
                Some(c) => {
                    value.push(c);
                    self.advance();
                }
                None => return None,
            }
        }

        self.advance(); // consume closing quote
        Some(value)
    }

    /// Scans a quoted identifier ("column name" or `column name`).
    fn scan_quoted_identifier(&mut self, quote: char) -> Token {
        match self.scan_quoted(quote) {
            Some(value) if quote == '`' => self.make_token(TokenKind::Backticked(value)),
            Some(value) => self.make_token(TokenKind::DoubleQuoted(value)),
            None => self.make_token(TokenKind::Error(String::from(
                "Unterminated quoted identifier",
            ))),
        }
    }

    /// Scans a single-quoted string literal.
    fn scan_string(&mut self) -> Token {
        match self.scan_quoted('\'') {
            Some(value) => self.make_token(TokenKind::String(value)),
            None => self.make_token(TokenKind::Error(String::from(
                "Unterminated string literal",
            ))),
        }
    }

    /// Scans an exact (`12`, `1.5`, `.5`, `3.`) or approximate (`1.5e-3`) number.
    fn scan_number(&mut self) -> Token {
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }

        if self.peek() == Some('.') {
            self.advance();
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.advance();
            }
        }

        // The exponent is only taken when digits follow, so `1e` stays `1` `e`.
        let has_exponent = match (self.peek(), self.peek_next(), self.peek_nth(2)) {
            (Some('e' | 'E'), Some(d), _) if d.is_ascii_digit() => true,
            (Some('e' | 'E'), Some('+' | '-'), Some(d)) if d.is_ascii_digit() => true,
            _ => false,
        };

        if has_exponent {
            self.advance(); // consume e/E
            if self.peek().is_some_and(|c| c == '+' || c == '-') {
                self.advance();
            }
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.advance();
            }
        }

        let text = String::from(&self.input[self.start..self.pos]);
        if has_exponent {
            self.make_token(TokenKind::ApproximateNumeric(text))
        } else {
            self.make_token(TokenKind::ExactNumeric(text))
        }
    }

    /// Scans the next token.
    #[must_use]
    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace_and_comments();
        self.start = self.pos;

        let Some(c) = self.advance() else {
            return self.make_token(TokenKind::Eof);
        };

        match c {
            // Single-character tokens
            '(' => self.make_token(TokenKind::LeftParen),
            ')' => self.make_token(TokenKind::RightParen),
            ',' => self.make_token(TokenKind::Comma),
            '+' => self.make_token(TokenKind::Plus),
            '-' => self.make_token(TokenKind::Minus),
            '*' => self.make_token(TokenKind::Star),
            '/' => self.make_token(TokenKind::Slash),
            '%' => self.make_token(TokenKind::Percent),
            '=' => self.make_token(TokenKind::Eq),

            // A dot starts a number when digits follow (`.5`).
            '.' if self.peek().is_some_and(|c| c.is_ascii_digit()) => {
                self.pos = self.start;
                self.scan_number()
            }
            '.' => self.make_token(TokenKind::Dot),

            // Potentially multi-character tokens
            '<' => {
                if self.peek() == Some('=') {
                    self.advance();
                    self.make_token(TokenKind::LtEq)
                } else if self.peek() == Some('>') {
                    self.advance();
                    self.make_token(TokenKind::NotEq)
                } else {
                    self.make_token(TokenKind::Lt)
                }
            }
            '>' => {
                if self.peek() == Some('=') {
                    self.advance();
                    self.make_token(TokenKind::GtEq)
                } else {
                    self.make_token(TokenKind::Gt)
                }
            }
            '!' => {
                if self.peek() == Some('=') {
                    self.advance();
                    self.make_token(TokenKind::NotEq)
                } else {
                    self.make_token(TokenKind::Error(String::from("Unexpected character: !")))
                }
            }

            // String literals
            '\'' => {
                self.pos = self.start;
                self.scan_string()
            }

            // Quoted identifiers
            '"' | '`' => {
                self.pos = self.start;
                self.scan_quoted_identifier(c)
            }

            // Numbers
            c if c.is_ascii_digit() => {
                self.pos = self.start;
                self.scan_number()
            }

            // Identifiers, keywords and entity ids
            c if c.is_alphabetic() || c == '_' => {
                self.pos = self.start;
                self.scan_word()
            }

            _ => self.make_token(TokenKind::Error(format!(
                "Unexpected character: {c:?}"
            ))),
        }
    }

    /// Tokenizes the entire input and returns all tokens, ending with `Eof`.
    #[must_use]
    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let is_eof = token.is_eof();
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        tokens
    }
}

/// Returns true for `syn` (any case) followed by one or more digits.
fn is_entity_id(text: &str) -> bool {
    let Some(prefix) = text.get(..ENTITY_ID_PREFIX.len()) else {
        return false;
    };
    let digits = &text[ENTITY_ID_PREFIX.len()..];
    prefix.eq_ignore_ascii_case(ENTITY_ID_PREFIX)
        && !digits.is_empty()
        && digits.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenize(input: &str) -> Vec<Token> {
        Lexer::new(input).tokenize()
    }

    fn token_kinds(input: &str) -> Vec<TokenKind> {
        tokenize(input).into_iter().map(|t| t.kind).collect()
    }

    fn ident(name: &str) -> TokenKind {
        TokenKind::Identifier(String::from(name))
    }

    fn exact(text: &str) -> TokenKind {
        TokenKind::ExactNumeric(String::from(text))
    }

    #[test]
    fn test_empty_input() {
        let tokens = tokenize("");
        assert_eq!(tokens.len(), 1);
        assert!(tokens[0].is_eof());
    }

    #[test]
    fn test_comments_are_skipped() {
        assert_eq!(
            token_kinds("SELECT /* one */\n* /* two\n */ FROM"),
            vec![
                TokenKind::Keyword(Keyword::Select),
                TokenKind::Star,
                TokenKind::Keyword(Keyword::From),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_double_minus_is_not_a_comment() {
        assert_eq!(
            token_kinds("a--1 FROM"),
            vec![
                ident("a"),
                TokenKind::Minus,
                TokenKind::Minus,
                exact("1"),
                TokenKind::Keyword(Keyword::From),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_keywords_case_insensitive() {
        assert_eq!(
            token_kinds("select FROM wHeRe has_like"),
            vec![
                TokenKind::Keyword(Keyword::Select),
                TokenKind::Keyword(Keyword::From),
                TokenKind::Keyword(Keyword::Where),
                TokenKind::Keyword(Keyword::HasLike),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_identifiers_keep_case() {
        assert_eq!(
            token_kinds("Foo bar_baz _qux e123 count"),
            vec![
                ident("Foo"),
                ident("bar_baz"),
                ident("_qux"),
                ident("e123"),
                ident("count"),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_quoted_identifiers() {
        assert_eq!(
            token_kinds("\"has \"\"quote\" `back``tick`"),
            vec![
                TokenKind::DoubleQuoted(String::from("has \"quote")),
                TokenKind::Backticked(String::from("back`tick")),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_strings() {
        assert_eq!(
            token_kinds("'hello' 'it''s'"),
            vec![
                TokenKind::String(String::from("hello")),
                TokenKind::String(String::from("it's")),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_unterminated_string_is_error_token() {
        let kinds = token_kinds("'open");
        assert!(matches!(kinds[0], TokenKind::Error(_)));
        assert_eq!(kinds[1], TokenKind::Eof);
    }

    #[test]
    fn test_numbers() {
        assert_eq!(
            token_kinds("42 1.5 .5 3. 1.2e-3 4E+5 6e7"),
            vec![
                exact("42"),
                exact("1.5"),
                exact(".5"),
                exact("3."),
                TokenKind::ApproximateNumeric(String::from("1.2e-3")),
                TokenKind::ApproximateNumeric(String::from("4E+5")),
                TokenKind::ApproximateNumeric(String::from("6e7")),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_exponent_requires_digits() {
        assert_eq!(
            token_kinds("1e 2ex"),
            vec![exact("1"), ident("e"), exact("2"), ident("ex"), TokenKind::Eof]
        );
    }

    #[test]
    fn test_entity_ids() {
        assert_eq!(
            token_kinds("syn123 SYN4.5 SyN6. synapse syn7a"),
            vec![
                TokenKind::EntityId(String::from("syn123")),
                TokenKind::EntityId(String::from("SYN4.5")),
                TokenKind::EntityId(String::from("SyN6")),
                TokenKind::Dot,
                ident("synapse"),
                ident("syn7a"),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_entity_id_with_two_versions() {
        assert_eq!(
            token_kinds("syn1.2.3"),
            vec![
                TokenKind::EntityId(String::from("syn1.2")),
                exact(".3"),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_qualified_column() {
        assert_eq!(
            token_kinds("syn1.foo"),
            vec![
                TokenKind::EntityId(String::from("syn1")),
                TokenKind::Dot,
                ident("foo"),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_operators() {
        assert_eq!(
            token_kinds("+ - * / % = != <> < <= > >="),
            vec![
                TokenKind::Plus,
                TokenKind::Minus,
                TokenKind::Star,
                TokenKind::Slash,
                TokenKind::Percent,
                TokenKind::Eq,
                TokenKind::NotEq,
                TokenKind::NotEq,
                TokenKind::Lt,
                TokenKind::LtEq,
                TokenKind::Gt,
                TokenKind::GtEq,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_unexpected_characters_do_not_stop_the_lexer() {
        let kinds = token_kinds("a # b");
        assert_eq!(kinds.len(), 4);
        assert_eq!(kinds[0], ident("a"));
        assert!(matches!(kinds[1], TokenKind::Error(_)));
        assert_eq!(kinds[2], ident("b"));
    }

    #[test]
    fn test_every_byte_value_is_tolerated() {
        for byte in 0..=u8::MAX {
            let input = format!("select {} from syn1", char::from(byte));
            let tokens = tokenize(&input);
            assert!(tokens.last().is_some_and(Token::is_eof), "byte {byte}");
        }
    }

    #[test]
    fn test_span_tracking() {
        let tokens = tokenize("SELECT id");
        assert_eq!(tokens[0].span, Span::new(0, 6));
        assert_eq!(tokens[1].span, Span::new(7, 9));
    }
}
