// Normalizes the raw token stream and exposes a backtrackable cursor over it.
//
// Screened tokens are materialized into an append-only buffer, so moving the cursor back and
// forth (or peeking arbitrarily far ahead) never re-screens anything. While filling the buffer,
// a rule may pull raw tokens from the tokenizer to look ahead and then rewind the tokenizer past
// whatever it decided not to keep.
use tracing::trace;

use crate::error::ParseError;
use crate::token::{TagName, Token, TokenKind};
use crate::tokenizer::Tokenizer;

pub struct Screener<'a> {
    // Used for error messages only.
    comment: &'a str,
    tokenizer: Tokenizer<'a>,

    // Screened tokens. Never modified once pushed.
    tokens: Vec<Token>,

    // Index of the current token in `tokens`.
    position: usize,

    // Lookahead distance from `position`; reset whenever the cursor moves.
    peek: usize,

    // First malformed marker found. The raw tokens it consumed are gone, so every later attempt
    // to extend the buffer fails with the same error.
    failure: Option<ParseError>,
}

impl<'a> Screener<'a> {
    pub fn new(comment: &'a str) -> Screener<'a> {
        Screener {
            comment,
            tokenizer: Tokenizer::new(comment),
            tokens: Vec::new(),
            position: 0,
            peek: 0,
            failure: None,
        }
    }

    /// Returns the token under the cursor. `Ok(None)` means the cursor is past `EndOfInput`.
    pub fn get_token(&mut self) -> Result<Option<&Token>, ParseError> {
        self.fetch(self.position)
    }

    pub fn move_next(&mut self) {
        self.position += 1;
        self.peek = 0;
    }

    pub fn position(&self) -> usize {
        self.position
    }

    /// Jumps to any buffer index, e.g. back to a checkpoint after a failed attempt.
    pub fn set_position(&mut self, position: usize) {
        self.position = position;
        self.peek = 0;
    }

    /// Moves the lookahead cursor one token further and returns the token there.
    pub fn peek(&mut self) -> Result<Option<&Token>, ParseError> {
        self.peek += 1;
        self.fetch(self.position + self.peek)
    }

    pub fn reset_peek(&mut self) {
        self.peek = 0;
    }

    pub fn peek_position(&self) -> usize {
        self.peek
    }

    pub fn set_peek(&mut self, peek: usize) {
        self.peek = peek;
    }

    /// Advances the cursor over tokens of the given kind.
    pub fn skip_while(&mut self, kind: TokenKind) -> Result<(), ParseError> {
        while self.fetch_kind(self.position)? == Some(kind) {
            self.move_next();
        }
        Ok(())
    }

    /// Advances the cursor up to (not past) the next token of the given kind.
    pub fn skip_until(&mut self, kind: TokenKind) -> Result<(), ParseError> {
        loop {
            match self.fetch_kind(self.position)? {
                Some(k) if k != kind => self.move_next(),
                _ => return Ok(()),
            }
        }
    }

    /// Peeks past all tokens whose kind is in `kinds` and returns the first other token.
    pub fn peek_while_any(&mut self, kinds: &[TokenKind]) -> Result<Option<&Token>, ParseError> {
        loop {
            self.peek += 1;
            match self.fetch_kind(self.position + self.peek)? {
                Some(k) if kinds.contains(&k) => {}
                _ => break,
            }
        }
        self.fetch(self.position + self.peek)
    }

    /// Peeks up to the first token whose kind is in `kinds` and returns it.
    pub fn peek_until_any(&mut self, kinds: &[TokenKind]) -> Result<Option<&Token>, ParseError> {
        loop {
            self.peek += 1;
            match self.fetch_kind(self.position + self.peek)? {
                Some(k) if !kinds.contains(&k) => {}
                _ => break,
            }
        }
        self.fetch(self.position + self.peek)
    }

    pub fn is_token(&mut self, kind: TokenKind) -> Result<bool, ParseError> {
        Ok(self.fetch_kind(self.position)? == Some(kind))
    }

    pub fn is_token_any(&mut self, kinds: &[TokenKind]) -> Result<bool, ParseError> {
        Ok(self
            .fetch_kind(self.position)?
            .is_some_and(|k| kinds.contains(&k)))
    }

    fn fetch_kind(&mut self, index: usize) -> Result<Option<TokenKind>, ParseError> {
        Ok(self.fetch(index)?.map(|t| t.kind))
    }

    // Screens raw tokens until `tokens[index]` exists or the tokenizer is exhausted.
    fn fetch(&mut self, index: usize) -> Result<Option<&Token>, ParseError> {
        while self.tokens.len() <= index {
            if let Some(err) = &self.failure {
                return Err(err.clone());
            }
            let Some(token) = self.pull() else {
                return Ok(None);
            };
            match token.kind {
                TokenKind::Whitespace => self.merge(token),
                TokenKind::String => self.merge(token),
                TokenKind::Newline => {
                    if let Err(err) = self.fetch_newline(token) {
                        self.failure = Some(err.clone());
                        return Err(err);
                    }
                }
                TokenKind::At => self.fetch_tag(token),
                TokenKind::Slash => self.fetch_intro(token),
                TokenKind::Star => self.fetch_outro(token),
                _ => self.push(token),
            }
        }
        Ok(self.tokens.get(index))
    }

    fn push(&mut self, token: Token) {
        trace!(kind = ?token.kind, text = %token.text, offset = token.offset, "screened token");
        self.tokens.push(token);
    }

    // Takes the current raw token and advances the tokenizer past it.
    fn pull(&mut self) -> Option<Token> {
        let token = self.tokenizer.get_token().cloned();
        self.tokenizer.move_next();
        token
    }

    // Gives back the last `count` pulled tokens.
    fn unread(&mut self, count: usize) {
        let position = self.tokenizer.position().saturating_sub(count);
        self.tokenizer.reset_position(position);
    }

    // Joins a run of raw tokens of the same kind as `first` into one token.
    fn merge(&mut self, first: Token) {
        let mut text = first.text;
        loop {
            match self.pull() {
                Some(next) if next.kind == first.kind => text.push_str(&next.text),
                Some(_) => {
                    self.unread(1);
                    break;
                }
                None => break,
            }
        }
        self.push(Token::new(first.kind, text, first.offset));
    }

    // Handles the start of a line: drops the indentation and the `*` prefix, or recognizes a
    // comment marker standing at the beginning of the line.
    fn fetch_newline(&mut self, newline: Token) -> Result<(), ParseError> {
        let next = loop {
            match self.pull() {
                Some(t) if t.kind == TokenKind::Whitespace => continue,
                next => break next,
            }
        };
        let Some(next) = next else {
            return Ok(());
        };

        match next.kind {
            TokenKind::Slash => {
                let first = self.pull();
                self.expect_raw(first, TokenKind::Star)?;
                let second = self.pull();
                self.expect_raw(second, TokenKind::Star)?;
                self.skip_raw_stars();
                self.push(Token::new(TokenKind::Intro, "/**", next.offset));
            }
            TokenKind::Star => {
                let Some(after) = self.pull() else {
                    return Err(ParseError::unexpected_end(self.comment));
                };
                match after.kind {
                    // The single whitespace character after the prefix belongs to the prefix.
                    TokenKind::Whitespace => {
                        self.push(Token::new(TokenKind::Whitespace, "\n", newline.offset));
                    }
                    TokenKind::Slash | TokenKind::Star => {
                        let mut closing = Some(after);
                        while closing.as_ref().is_some_and(|t| t.kind == TokenKind::Star) {
                            closing = self.pull();
                        }
                        self.expect_raw(closing, TokenKind::Slash)?;
                        self.push(Token::new(TokenKind::Outro, "*/", next.offset));
                    }
                    _ => {
                        self.unread(1);
                        self.push(Token::new(TokenKind::Whitespace, "\n", newline.offset));
                    }
                }
            }
            TokenKind::EndOfInput => self.push(next),
            _ => {
                trace!(offset = next.offset, "line without prefix");
                self.unread(1);
                self.push(Token::new(TokenKind::Whitespace, "\n", newline.offset));
            }
        }
        Ok(())
    }

    // A `/` outside of a line start: either an intro marker or plain text.
    fn fetch_intro(&mut self, slash: Token) {
        let first = self.pull();
        let second = self.pull();
        let is_star = |t: &Option<Token>| t.as_ref().is_some_and(|t| t.kind == TokenKind::Star);
        if is_star(&first) && is_star(&second) {
            self.skip_raw_stars();
            self.push(Token::new(TokenKind::Intro, "/**", slash.offset));
            return;
        }
        let pulled = [first, second].iter().filter(|t| t.is_some()).count();
        self.unread(pulled);
        self.push(Token::new(TokenKind::String, slash.text, slash.offset));
    }

    // A `*` outside of a line start: either an outro marker or plain text.
    fn fetch_outro(&mut self, star: Token) {
        let mut count = 1;
        let mut next = self.pull();
        while next.as_ref().is_some_and(|t| t.kind == TokenKind::Star) {
            count += 1;
            next = self.pull();
        }
        match next {
            Some(t) if t.kind == TokenKind::Slash => {
                self.push(Token::new(TokenKind::Outro, "*/", star.offset));
            }
            Some(_) => {
                self.unread(1);
                self.push(Token::new(TokenKind::String, "*".repeat(count), star.offset));
            }
            None => self.push(Token::new(TokenKind::String, "*".repeat(count), star.offset)),
        }
    }

    // An `@` followed by a known tag name becomes a tag token. Anything else is plain text.
    fn fetch_tag(&mut self, at: Token) {
        let as_text = |at: &Token| Token::new(TokenKind::String, at.text.clone(), at.offset);
        let Some(word) = self.pull() else {
            self.push(as_text(&at));
            return;
        };
        let name = match word.kind {
            TokenKind::String => TagName::from_base_name(&word.text),
            _ => None,
        };
        let Some(name) = name else {
            self.unread(1);
            self.push(as_text(&at));
            return;
        };

        let token = match name {
            TagName::Property => self.fetch_property_suffix(at.offset),
            TagName::UsedBy => self.fetch_used_by_suffix(at.offset),
            _ => Token::new(TokenKind::Tag(name), name.token_text(), at.offset),
        };
        self.push(token);
    }

    // `@property` may continue with `-read` or `-write`.
    fn fetch_property_suffix(&mut self, offset: usize) -> Token {
        let mut name = TagName::Property;
        match self.pull() {
            Some(minus) if minus.kind == TokenKind::Minus => match self.pull() {
                Some(suffix) => match suffix.text.trim().to_lowercase().as_str() {
                    "read" => name = TagName::PropertyRead,
                    "write" => name = TagName::PropertyWrite,
                    _ => self.unread(2),
                },
                None => self.unread(1),
            },
            Some(_) => self.unread(1),
            None => {}
        }
        Token::new(TokenKind::Tag(name), name.token_text(), offset)
    }

    // `@used` only counts as a tag when followed by `-by`. A near miss keeps the consumed `-` in
    // the resulting text token.
    fn fetch_used_by_suffix(&mut self, offset: usize) -> Token {
        match self.pull() {
            Some(minus) if minus.kind == TokenKind::Minus => match self.pull() {
                Some(suffix) if suffix.text.trim().to_lowercase() == "by" => {
                    Token::new(TokenKind::Tag(TagName::UsedBy), TagName::UsedBy.token_text(), offset)
                }
                Some(_) => {
                    self.unread(1);
                    Token::new(TokenKind::String, "@used-", offset)
                }
                None => Token::new(TokenKind::String, "@used-", offset),
            },
            Some(_) => {
                self.unread(1);
                Token::new(TokenKind::String, "@used", offset)
            }
            None => Token::new(TokenKind::String, "@used", offset),
        }
    }

    // Discards any further raw `*` after an intro marker.
    fn skip_raw_stars(&mut self) {
        loop {
            match self.pull() {
                Some(t) if t.kind == TokenKind::Star => continue,
                Some(_) => self.unread(1),
                None => {}
            }
            return;
        }
    }

    fn expect_raw(&self, token: Option<Token>, kind: TokenKind) -> Result<(), ParseError> {
        match token {
            None => Err(ParseError::unexpected_end(self.comment)),
            Some(t) if t.kind != kind => Err(ParseError::unexpected_token(&t, self.comment)),
            Some(_) => Ok(()),
        }
    }
}
