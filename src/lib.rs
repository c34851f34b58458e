//! Parser for PHPDoc-style documentation comments.
//!
//! A comment such as
//!
//! ```text
//! /**
//!  * Adds two numbers. See {@link https://example.org the docs}.
//!  *
//!  * @param int $a First summand
//!  * @return int
//!  */
//! ```
//!
//! is turned into a `Document`: its description (with inline tags replaced by placeholders) and
//! the block tags sorted into typed slots.
//!
//! The work is split into three layers. The `Tokenizer` chops the text into raw tokens, the
//! `Screener` normalizes them (comment markers, line prefixes, tag names) behind a backtrackable
//! cursor, and the `Parser` descends over the screened tokens. Most callers only need `parse`.
pub mod ast;
pub mod declaration;
pub mod error;
pub mod grammar;
pub mod parser;
pub mod screener;
pub mod token;
pub mod tokenizer;

use nom::IResult;

pub use ast::{BlockTags, Described, Description, Direction, Document, RawTag, Tag};
pub use declaration::{
    parse_declaration, Declaration, DeclarationError, DeclarationKind, Filter, Visibility,
};
pub use error::ParseError;
pub use parser::Parser;
pub use screener::Screener;
pub use tokenizer::Tokenizer;

/// Input of the nom recognizers: the comment text with its position tracked.
pub type ParseInput<'a> = nom_locate::LocatedSpan<&'a str>;

/// Return type for most nom functions: takes in ParseInput and returns the `O` type or error.
pub type ParseResult<'a, O> = IResult<ParseInput<'a>, O, nom::error::Error<ParseInput<'a>>>;

/// Parses a whole documentation comment. Surrounding whitespace is ignored and an empty comment
/// gives an empty `Document`.
pub fn parse(comment: &str) -> Result<Document, ParseError> {
    Parser::new(comment).parse()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_parse_entry_point() -> () {
        assert_eq!(parse(""), Ok(Document::default()));

        let document = parse("  /** Adds. @api */  ").unwrap();
        assert_eq!(document.description, Description::from("Adds."));
        assert!(document.tags.api.is_some());

        parse("/** @param int $1bad */").expect_err("");
    }
}
