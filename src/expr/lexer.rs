//! Logos-based lexer for the expression/predicate mini-language.
//!
//! Mirrors the teacher crate's lexer wrapper shape: a thin `Iterator` over
//! `logos`-generated tokens that stitches byte offsets back on.

use logos::Logos;

use super::token::{Token, TokenKind};

/// Lexer wrapping the logos-generated tokenizer, tracking byte offsets.
pub struct Lexer<'a> {
    inner: logos::Lexer<'a, TokenKind>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            inner: TokenKind::lexer(input),
        }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let result = self.inner.next()?;
        let text = self.inner.slice();
        let offset = self.inner.span().start as u32;
        let kind = result.unwrap_or(TokenKind::Error);
        Some(Token { kind, text, offset })
    }
}

/// Tokenize an entire string into a `Vec`. Used by tests and by the parser's
/// lookahead buffer.
pub fn tokenize(input: &str) -> Vec<Token<'_>> {
    Lexer::new(input).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenizes_arithmetic() {
        let tokens = tokenize("1 + 2 * 3");
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Number,
                TokenKind::Plus,
                TokenKind::Number,
                TokenKind::Star,
                TokenKind::Number,
            ]
        );
    }

    #[test]
    fn tokenizes_string_with_escapes() {
        let tokens = tokenize(r#""a\"b""#);
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, TokenKind::String);
    }

    #[test]
    fn tracks_byte_offsets() {
        let tokens = tokenize("a == 1");
        assert_eq!(tokens[0].offset, 0);
        assert_eq!(tokens[1].offset, 2);
        assert_eq!(tokens[2].offset, 5);
    }

    #[test]
    fn unrecognized_input_yields_error_token() {
        let tokens = tokenize("@");
        assert_eq!(tokens[0].kind, TokenKind::Error);
    }
}
