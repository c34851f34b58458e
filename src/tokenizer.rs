// Splits a documentation comment into primitive tokens.
// Runs of letters become one `String` token; every other character is a token of its own, so
// that the screener can recognize comment markers and tag names by looking at neighbours.
use nom::{
    branch::alt,
    bytes::complete::{tag, take_while1},
    character::complete::anychar,
    combinator::{consumed, map},
};

use crate::token::{Token, TokenKind};
use crate::{ParseInput, ParseResult};

/// Lazily tokenizes a comment. Tokens are produced on demand and remembered, so the cursor can
/// be moved back to any earlier token index.
pub struct Tokenizer<'a> {
    // The not yet tokenized rest of the input.
    remaining: ParseInput<'a>,

    // Every token produced so far. The last one is `EndOfInput` once `finished` is set.
    tokens: Vec<Token>,

    // Index of the current token in `tokens`.
    position: usize,

    finished: bool,
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a str) -> Tokenizer<'a> {
        Tokenizer {
            remaining: ParseInput::new(input),
            tokens: Vec::new(),
            position: 0,
            finished: false,
        }
    }

    /// Returns the current token, or `None` once the cursor is past `EndOfInput`.
    pub fn get_token(&mut self) -> Option<&Token> {
        self.fill(self.position);
        self.tokens.get(self.position)
    }

    /// Advances the cursor. Does nothing when already past the end.
    pub fn move_next(&mut self) {
        if self.fill(self.position) {
            self.position += 1;
        }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    /// Moves the cursor to an arbitrary token index. Indices past the end simply yield `None`.
    pub fn reset_position(&mut self, position: usize) {
        self.position = position;
    }

    pub fn reset(&mut self) {
        self.position = 0;
    }

    // Makes sure `tokens[index]` exists if the input has that many tokens.
    fn fill(&mut self, index: usize) -> bool {
        while self.tokens.len() <= index {
            if self.finished {
                return false;
            }
            let token = self.scan_next();
            self.tokens.push(token);
        }
        true
    }

    fn scan_next(&mut self) -> Token {
        let offset = self.remaining.location_offset();
        if self.remaining.fragment().is_empty() {
            self.finished = true;
            return Token::new(TokenKind::EndOfInput, "", offset);
        }
        match scan_token(self.remaining) {
            Ok((rest, token)) => {
                self.remaining = rest;
                token
            }
            // `anychar` accepts every non-empty input, so this is only reachable on a bug.
            Err(_) => {
                self.finished = true;
                Token::new(TokenKind::EndOfInput, "", offset)
            }
        }
    }
}

impl Iterator for Tokenizer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        let token = self.get_token().cloned();
        self.move_next();
        token
    }
}

pub fn create_tokenizer(input: &str) -> Tokenizer<'_> {
    Tokenizer::new(input)
}

/// Matches one line break: `\n`, `\r\n` or `\n\r`. A lone `\r` is left to the whitespace rule.
fn scan_newline(input: ParseInput) -> ParseResult<ParseInput> {
    alt((tag("\r\n"), tag("\n\r"), tag("\n")))(input)
}

/// Matches a maximal run of Unicode letters.
fn scan_letters(input: ParseInput) -> ParseResult<ParseInput> {
    take_while1(|c: char| c.is_alphabetic())(input)
}

fn scan_token(input: ParseInput) -> ParseResult<Token> {
    fn spanned(kind: TokenKind, span: ParseInput) -> Token {
        Token::new(kind, *span.fragment(), span.location_offset())
    }

    alt((
        map(scan_newline, |s| spanned(TokenKind::Newline, s)),
        map(scan_letters, |s| spanned(TokenKind::String, s)),
        map(consumed(anychar), |(s, c)| spanned(TokenKind::from_char(c), s)),
    ))(input)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    use super::*;

    fn kinds_and_text(input: &str) -> Vec<(TokenKind, String)> {
        create_tokenizer(input).map(|t| (t.kind, t.text)).collect()
    }

    #[test]
    // Raw tokens of a small comment, before any screening.
    fn test_tokenize_comment() -> () {
        const INPUT: &str = "  /**\n * Some text.\n * A-b {@foo bar::baz()}\n */";
        use TokenKind::*;
        let expected = vec![
            (Whitespace, " "),
            (Whitespace, " "),
            (Slash, "/"),
            (Star, "*"),
            (Star, "*"),
            (Newline, "\n"),
            (Whitespace, " "),
            (Star, "*"),
            (Whitespace, " "),
            (String, "Some"),
            (Whitespace, " "),
            (String, "text"),
            (Dot, "."),
            (Newline, "\n"),
            (Whitespace, " "),
            (Star, "*"),
            (Whitespace, " "),
            (String, "A"),
            (Minus, "-"),
            (String, "b"),
            (Whitespace, " "),
            (OBrace, "{"),
            (At, "@"),
            (String, "foo"),
            (Whitespace, " "),
            (String, "bar"),
            (Colon, ":"),
            (Colon, ":"),
            (String, "baz"),
            (OParen, "("),
            (CParen, ")"),
            (CBrace, "}"),
            (Newline, "\n"),
            (Whitespace, " "),
            (Star, "*"),
            (Slash, "/"),
            (EndOfInput, ""),
        ];
        let expected: Vec<(TokenKind, std::string::String)> =
            expected.into_iter().map(|(k, t)| (k, t.to_string())).collect();
        assert_eq!(kinds_and_text(INPUT), expected);
    }

    #[test]
    fn test_reset_position() -> () {
        let mut tokenizer = create_tokenizer("a b");
        assert_eq!(tokenizer.get_token().map(|t| t.text.clone()), Some("a".to_string()));
        tokenizer.move_next();
        tokenizer.move_next();
        tokenizer.move_next();
        assert_eq!(tokenizer.get_token().map(|t| t.kind), Some(TokenKind::EndOfInput));
        tokenizer.move_next();
        assert_eq!(tokenizer.get_token(), None);
        // Moving past the end is idempotent.
        tokenizer.move_next();
        assert_eq!(tokenizer.position(), 4);

        tokenizer.reset_position(1);
        assert_eq!(tokenizer.get_token().map(|t| t.kind), Some(TokenKind::Whitespace));
        tokenizer.reset();
        assert_eq!(tokenizer.position(), 0);
        assert_eq!(tokenizer.get_token().map(|t| t.text.clone()), Some("a".to_string()));
    }

    #[test]
    fn test_newlines() -> () {
        use TokenKind::*;
        let tokens: Vec<TokenKind> = create_tokenizer("a\r\nb\n\rc\nd\re").map(|t| t.kind).collect();
        assert_eq!(
            tokens,
            vec![String, Newline, String, Newline, String, Newline, String, Whitespace, String, EndOfInput]
        );
    }

    #[test]
    fn test_unicode_letters_and_offsets() -> () {
        let tokens: Vec<Token> = create_tokenizer("Köcher 42").collect();
        assert_eq!(tokens[0], Token::new(TokenKind::String, "Köcher", 0));
        // Byte offsets: "ö" is two bytes long.
        assert_eq!(tokens[1], Token::new(TokenKind::Whitespace, " ", 7));
        assert_eq!(tokens[2], Token::new(TokenKind::String, "4", 8));
        assert_eq!(tokens[3], Token::new(TokenKind::String, "2", 9));
        assert_eq!(tokens[4], Token::new(TokenKind::EndOfInput, "", 10));
    }

    #[test]
    fn test_empty_input() -> () {
        let tokens: Vec<Token> = create_tokenizer("").collect();
        assert_eq!(tokens, vec![Token::new(TokenKind::EndOfInput, "", 0)]);
    }

    proptest! {
        // Tokenizing never fails and never loses text.
        #[test]
        fn test_tokens_cover_input(input in "\\PC*") {
            let tokens: Vec<Token> = create_tokenizer(&input).collect();
            let last = tokens.last().map(|t| t.kind);
            prop_assert_eq!(last, Some(TokenKind::EndOfInput));
            let text: std::string::String = tokens.iter().map(|t| t.text.as_str()).collect();
            prop_assert_eq!(text, input);
        }
    }
}
