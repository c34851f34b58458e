//! Errors raised while screening or parsing a documentation comment.
//!
//! Every variant carries the (trimmed) comment it was raised for, so messages stay useful when
//! they are logged far away from the parser.
use thiserror::Error;

use crate::token::Token;

#[derive(Error, Debug, PartialEq, Eq, Clone)]
pub enum ParseError {
    #[error("unexpected token \"{text}\" in \"{comment}\" on position {offset}")]
    UnexpectedToken {
        text: String,
        offset: usize,
        comment: String,
    },

    #[error("unexpected end in \"{comment}\"")]
    UnexpectedEnd { comment: String },

    #[error("invalid email \"{email}\" in \"{comment}\"")]
    InvalidEmail { email: String, comment: String },

    #[error("invalid link \"{link}\" in \"{comment}\"")]
    InvalidLink { link: String, comment: String },

    #[error("invalid type \"{name}\" in \"{comment}\"")]
    InvalidType { name: String, comment: String },

    #[error("invalid variable \"{name}\" in \"{comment}\"")]
    InvalidVariable { name: String, comment: String },

    #[error("invalid version \"{version}\" in \"{comment}\"")]
    InvalidVersion { version: String, comment: String },

    #[error("invalid method name \"{name}\" in \"{comment}\"")]
    InvalidMethod { name: String, comment: String },

    #[error("invalid element name \"{name}\" in \"{comment}\"")]
    InvalidElement { name: String, comment: String },

    #[error("invalid file name \"{name}\" in \"{comment}\"")]
    InvalidFile { name: String, comment: String },
}

impl ParseError {
    pub fn unexpected_token(token: &Token, comment: &str) -> ParseError {
        ParseError::UnexpectedToken {
            text: token.text.clone(),
            offset: token.offset,
            comment: comment.to_string(),
        }
    }

    pub fn unexpected_end(comment: &str) -> ParseError {
        ParseError::UnexpectedEnd {
            comment: comment.to_string(),
        }
    }

    /// The comment the error was raised for.
    pub fn comment(&self) -> &str {
        match self {
            ParseError::UnexpectedToken { comment, .. }
            | ParseError::UnexpectedEnd { comment }
            | ParseError::InvalidEmail { comment, .. }
            | ParseError::InvalidLink { comment, .. }
            | ParseError::InvalidType { comment, .. }
            | ParseError::InvalidVariable { comment, .. }
            | ParseError::InvalidVersion { comment, .. }
            | ParseError::InvalidMethod { comment, .. }
            | ParseError::InvalidElement { comment, .. }
            | ParseError::InvalidFile { comment, .. } => comment,
        }
    }
}
